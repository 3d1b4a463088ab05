//! Descriptor driven HTTP platform
//!
//! [`HttpPlatform`] implements [`Platform`] from a [`PlatformDescriptor`]:
//! extract the playlist id from the locator, call the platform endpoint and
//! read the tracks out of the JSON response with JSON pointers.

use crate::descriptor::{ID_PLACEHOLDER, PlatformDescriptor, RequestMethod};
use crate::error::{PlatformError, Result};
use crate::{Platform, SheetItem};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Separator used when an artist field is a list
pub const ARTIST_SEPARATOR: &str = "/";

/// Characters escaped in a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone)]
pub struct HttpPlatform {
    descriptor: PlatformDescriptor,
    patterns: Vec<Regex>,
    client: Client,
}

impl HttpPlatform {
    /// Validates the descriptor and compiles its locator patterns
    pub fn new(descriptor: PlatformDescriptor, client: Client) -> Result<Self> {
        descriptor.validate()?;
        let patterns = descriptor
            .import_music_sheet
            .locator_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            descriptor,
            patterns,
            client,
        })
    }

    pub fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    /// Extracts the playlist id from a locator
    ///
    /// The first matching pattern wins. When no pattern matches, the trimmed
    /// locator is used as the id.
    pub fn extract_id(&self, locator: &str) -> Result<String> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(PlatformError::InvalidLocator(
                "the playlist locator is empty".to_string(),
            ));
        }

        for pattern in &self.patterns {
            if let Some(caps) = pattern.captures(locator) {
                let id = caps
                    .name("id")
                    .or_else(|| caps.get(1))
                    .or_else(|| caps.get(0))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                if !id.is_empty() {
                    return Ok(id.to_string());
                }
            }
        }

        Ok(locator.to_string())
    }

    /// Builds the request URL for an id, percent-encoded as a path segment
    pub fn request_url(&self, id: &str) -> String {
        let encoded = utf8_percent_encode(id, PATH_SEGMENT).to_string();
        self.descriptor
            .import_music_sheet
            .url
            .replace(ID_PLACEHOLDER, &encoded)
    }

    /// Reads the tracks out of a platform response
    pub fn parse_items(&self, document: &Value) -> Result<Vec<SheetItem>> {
        let request = &self.descriptor.import_music_sheet;
        let items = document
            .pointer(&request.items)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                PlatformError::UnexpectedResponse(format!(
                    "no track array at '{}' in the {} response",
                    request.items, self.descriptor.platform
                ))
            })?;

        let fields = &request.fields;
        Ok(items
            .iter()
            .map(|item| SheetItem {
                songmid: text_at(item, &fields.songmid),
                id: text_at(item, &fields.id),
                artist: text_at(item, &fields.artist).unwrap_or_default(),
                title: text_at(item, &fields.title).unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl Platform for HttpPlatform {
    fn name(&self) -> &str {
        &self.descriptor.platform
    }

    fn hints(&self) -> &[String] {
        &self.descriptor.hints.import_music_sheet
    }

    fn short_code(&self) -> Option<&str> {
        self.descriptor.short_code.as_deref()
    }

    async fn import_music_sheet(&self, locator: &str) -> Result<Vec<SheetItem>> {
        let request = &self.descriptor.import_music_sheet;
        let id = self.extract_id(locator)?;
        let url = self.request_url(&id);
        debug!(platform = %self.descriptor.platform, %url, "Fetching music sheet");

        let mut builder = match request.method {
            RequestMethod::Get => self.client.get(&url),
            RequestMethod::Post => {
                let body = request
                    .body
                    .as_deref()
                    .map(|b| b.replace(ID_PLACEHOLDER, &id))
                    .unwrap_or_default();
                self.client.post(&url).body(body)
            }
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let document: Value = serde_json::from_str(&body)?;
        let items = self.parse_items(&document)?;
        debug!(platform = %self.descriptor.platform, count = items.len(), "Music sheet fetched");
        Ok(items)
    }
}

/// Text value at `pointer`, `None` when absent or not representable
fn text_at(item: &Value, pointer: &str) -> Option<String> {
    item.pointer(pointer).and_then(value_to_text)
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(values) => {
            let parts: Vec<String> = values
                .iter()
                .filter_map(|v| match v {
                    Value::Object(map) => map.get("name").and_then(value_to_text),
                    other => value_to_text(other),
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(ARTIST_SEPARATOR))
            }
        }
        Value::Object(map) => map.get("name").and_then(value_to_text),
        Value::Null => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn platform(yaml: &str) -> HttpPlatform {
        let descriptor = PlatformDescriptor::from_yaml_str(yaml).unwrap();
        HttpPlatform::new(descriptor, Client::new()).unwrap()
    }

    const BASIC: &str = r#"
platform: Example
import_music_sheet:
  url: "https://api.example.com/playlist/{id}"
  locator_patterns:
    - 'playlist[/?](?:id=)?(?P<id>\d+)'
    - 'code=(\w+)'
  items: /data/tracks
  fields:
    id: /trackId
    artist: /singers
    title: /name
"#;

    #[test]
    fn test_extract_id_from_patterns() {
        let p = platform(BASIC);
        assert_eq!(p.extract_id("https://example.com/playlist/12345?x=1").unwrap(), "12345");
        assert_eq!(p.extract_id("https://example.com/playlist?id=777").unwrap(), "777");
        assert_eq!(p.extract_id("share?code=ABC").unwrap(), "ABC");
    }

    #[test]
    fn test_extract_id_falls_back_to_locator() {
        let p = platform(BASIC);
        assert_eq!(p.extract_id("  42 ").unwrap(), "42");
        assert!(matches!(
            p.extract_id("   "),
            Err(PlatformError::InvalidLocator(_))
        ));
    }

    #[test]
    fn test_request_url_encodes_id() {
        let p = platform(BASIC);
        assert_eq!(
            p.request_url("a b/c"),
            "https://api.example.com/playlist/a%20b%2Fc"
        );
        assert_eq!(
            p.request_url("a+b?x=1#y"),
            "https://api.example.com/playlist/a+b%3Fx=1%23y"
        );
        assert_eq!(
            p.request_url("歌单"),
            "https://api.example.com/playlist/%E6%AD%8C%E5%8D%95"
        );
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let descriptor = PlatformDescriptor::from_yaml_str(
            "platform: P\nimport_music_sheet:\n  url: https://x/{id}\n  locator_patterns: ['(']\n",
        )
        .unwrap();
        assert!(matches!(
            HttpPlatform::new(descriptor, Client::new()),
            Err(PlatformError::Pattern(_))
        ));
    }

    #[test]
    fn test_parse_items_with_pointers() {
        let p = platform(BASIC);
        let doc = json!({
            "data": {
                "tracks": [
                    {"trackId": 1, "singers": [{"name": "A"}, {"name": "B"}], "name": "Song 1"},
                    {"trackId": "x2", "singers": "C", "name": "Song 2"},
                    {"name": "No artist"}
                ]
            }
        });

        let items = p.parse_items(&doc).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id.as_deref(), Some("1"));
        assert_eq!(items[0].artist, "A/B");
        assert_eq!(items[1].artist, "C");
        assert_eq!(items[1].track_id(), Some("x2"));
        assert_eq!(items[2].artist, "");
        assert_eq!(items[2].track_id(), None);
    }

    #[test]
    fn test_parse_items_missing_array() {
        let p = platform(BASIC);
        let err = p.parse_items(&json!({"data": {}})).unwrap_err();
        assert!(matches!(err, PlatformError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_root_array() {
        let p = platform("platform: R\nimport_music_sheet:\n  url: https://x/{id}\n");
        let items = p
            .parse_items(&json!([{"songmid": "m1", "artist": "A", "title": "T"}]))
            .unwrap();
        assert_eq!(items, vec![SheetItem::new("A", "T").with_songmid("m1")]);
    }
}
