//! Platform descriptor files
//!
//! A descriptor tells [`HttpPlatform`](crate::HttpPlatform) how to turn a
//! locator into an HTTP request and where to find the tracks in the JSON
//! response. YAML and JSON are both accepted; keys of the hint and request
//! sections also accept their camelCase spelling (`importMusicSheet`).
//!
//! ```yaml
//! platform: Example Music
//! short_code: ex
//! hints:
//!   import_music_sheet:
//!     - "Paste the playlist URL, e.g. https://example.com/playlist/42"
//! import_music_sheet:
//!   url: "https://api.example.com/playlist/{id}"
//!   locator_patterns:
//!     - 'playlist/(?P<id>\d+)'
//!   items: /data/tracks
//!   fields:
//!     id: /id
//!     artist: /singer
//!     title: /name
//! ```

use crate::error::{PlatformError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File extensions recognised as descriptors
pub const DESCRIPTOR_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Placeholder replaced by the extracted playlist id
pub const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Display name, unique within a registry
    pub platform: String,
    #[serde(default, alias = "shortCode", skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    #[serde(default)]
    pub hints: DescriptorHints,
    #[serde(alias = "importMusicSheet")]
    pub import_music_sheet: SheetRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorHints {
    #[serde(default, alias = "importMusicSheet")]
    pub import_music_sheet: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
}

/// How to fetch a playlist and read its tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRequest {
    /// URL template, `{id}` is replaced by the playlist id percent-encoded as a path segment
    pub url: String,
    #[serde(default)]
    pub method: RequestMethod,
    /// Body template for POST requests, `{id}` is replaced verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Regexes tried in order on the locator; named group `id`, else group 1,
    /// else the whole match
    #[serde(default, alias = "locatorPatterns")]
    pub locator_patterns: Vec<String>,
    /// JSON pointer to the track array, empty for the document root
    #[serde(default)]
    pub items: String,
    #[serde(default)]
    pub fields: FieldPointers,
}

/// JSON pointers read inside each track object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPointers {
    pub id: String,
    pub songmid: String,
    pub artist: String,
    pub title: String,
}

impl Default for FieldPointers {
    fn default() -> Self {
        Self {
            id: "/id".to_string(),
            songmid: "/songmid".to_string(),
            artist: "/artist".to_string(),
            title: "/title".to_string(),
        }
    }
}

/// True if `path` has a descriptor extension (case-insensitive)
pub fn is_descriptor_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            DESCRIPTOR_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

impl PlatformDescriptor {
    /// Reads and validates a descriptor file
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let descriptor: Self = serde_yaml::from_str(text)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let descriptor: Self = serde_json::from_str(text)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Checks the presence of required values and the pointer syntax
    pub fn validate(&self) -> Result<()> {
        if self.platform.trim().is_empty() {
            return Err(PlatformError::InvalidDescriptor(
                "`platform` must not be empty".to_string(),
            ));
        }

        let request = &self.import_music_sheet;
        if request.url.trim().is_empty() {
            return Err(PlatformError::InvalidDescriptor(format!(
                "{}: `import_music_sheet.url` must not be empty",
                self.platform
            )));
        }
        if request.body.is_some() && request.method == RequestMethod::Get {
            return Err(PlatformError::InvalidDescriptor(format!(
                "{}: a request body requires method POST",
                self.platform
            )));
        }

        let pointers = [
            ("items", &request.items),
            ("fields.id", &request.fields.id),
            ("fields.songmid", &request.fields.songmid),
            ("fields.artist", &request.fields.artist),
            ("fields.title", &request.fields.title),
        ];
        for (name, pointer) in pointers {
            if !pointer.is_empty() && !pointer.starts_with('/') {
                return Err(PlatformError::InvalidDescriptor(format!(
                    "{}: `{}` must be a JSON pointer starting with '/' (got '{}')",
                    self.platform, name, pointer
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
platform: 小芸音乐
hints:
  importMusicSheet:
    - 第一条提示
    - second hint
import_music_sheet:
  url: "https://api.example.com/playlist/{id}"
  method: post
  body: '{"id": "{id}"}'
  headers:
    Referer: https://example.com
  items: /result/tracks
  fields:
    artist: /ar/0/name
"#;

    #[test]
    fn test_parse_yaml_with_aliases() {
        let d = PlatformDescriptor::from_yaml_str(YAML).unwrap();
        assert_eq!(d.platform, "小芸音乐");
        assert_eq!(d.hints.import_music_sheet, vec!["第一条提示", "second hint"]);
        assert_eq!(d.import_music_sheet.method, RequestMethod::Post);
        assert_eq!(d.import_music_sheet.headers["Referer"], "https://example.com");
        // Unspecified pointers keep their defaults
        assert_eq!(d.import_music_sheet.fields.artist, "/ar/0/name");
        assert_eq!(d.import_music_sheet.fields.title, "/title");
        assert_eq!(d.short_code, None);
    }

    #[test]
    fn test_parse_json() {
        let d = PlatformDescriptor::from_json_str(
            r#"{"platform": "J", "shortCode": "j", "importMusicSheet": {"url": "https://x/{id}"}}"#,
        )
        .unwrap();
        assert_eq!(d.short_code.as_deref(), Some("j"));
        assert!(d.hints.import_music_sheet.is_empty());
        assert_eq!(d.import_music_sheet.items, "");
    }

    #[test]
    fn test_missing_platform_name_is_rejected() {
        let err = PlatformDescriptor::from_yaml_str(
            "platform: ' '\nimport_music_sheet:\n  url: https://x/{id}\n",
        )
        .unwrap_err();
        assert!(matches!(err, PlatformError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_get_with_body_is_rejected() {
        let err = PlatformDescriptor::from_yaml_str(
            "platform: P\nimport_music_sheet:\n  url: https://x\n  body: '{}'\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("POST"));
    }

    #[test]
    fn test_bad_pointer_is_rejected() {
        let err = PlatformDescriptor::from_yaml_str(
            "platform: P\nimport_music_sheet:\n  url: https://x/{id}\n  items: data.tracks\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn test_is_descriptor_file() {
        assert!(is_descriptor_file(Path::new("a/b.yaml")));
        assert!(is_descriptor_file(Path::new("b.YML")));
        assert!(is_descriptor_file(Path::new("b.json")));
        assert!(!is_descriptor_file(Path::new("b.js")));
        assert!(!is_descriptor_file(Path::new("README")));
    }
}
