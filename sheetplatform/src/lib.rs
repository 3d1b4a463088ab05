//! # sheetplatform
//!
//! Platform plugins and the platform registry for SheetPort.
//!
//! A *platform* resolves a user supplied locator (playlist URL, numeric id,
//! share code) into the list of tracks of that playlist. Every platform
//! implements the [`Platform`] trait; the registry only knows that contract.
//!
//! ## Features
//!
//! - **Explicit contract**: [`Platform::name`] identifies, [`Platform::import_music_sheet`] resolves.
//! - **Descriptor plugins**: [`HttpPlatform`] is built from a YAML/JSON file
//!   describing an HTTP endpoint and where the tracks live in its response.
//! - **Partial loading**: [`PlatformLoader::load_all`] keeps going when a file
//!   is broken and reports it in a [`LoadReport`].
//! - **Atomic reload**: [`SharedRegistry::reload`] swaps the whole registry.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sheetplatform::{PlatformLoader, SharedRegistry};
//!
//! # async fn example() -> sheetplatform::Result<()> {
//! let loader = PlatformLoader::builder().directory("plugins").build()?;
//! let (registry, report) = SharedRegistry::load(loader);
//! println!("{} platform(s), {} failure(s)", report.loaded.len(), report.failures.len());
//!
//! if let Some(platform) = registry.find("Example Music").await {
//!     let items = platform.import_music_sheet("https://example.com/playlist/42").await?;
//!     println!("{} tracks", items.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod descriptor;
pub mod error;
pub mod http;
pub mod registry;

#[cfg(feature = "sheetconfig")]
mod config_ext;

pub use descriptor::PlatformDescriptor;
pub use error::{PlatformError, Result};
pub use http::HttpPlatform;
pub use registry::{
    LoadFailure, LoadReport, PlatformLoader, PlatformLoaderBuilder, PlatformRegistry, SharedRegistry,
};

#[cfg(feature = "sheetconfig")]
pub use config_ext::PlatformConfigExt;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;

/// One track as returned by a platform
///
/// `songmid` and `id` may come as JSON strings or numbers; both are kept as
/// strings. Exporters use [`SheetItem::track_id`] to pick one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetItem {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub songmid: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub title: String,
}

impl SheetItem {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_songmid(mut self, songmid: impl Into<String>) -> Self {
        self.songmid = Some(songmid.into());
        self
    }

    /// Identifier used in playback URLs: `songmid` when non-empty, else `id`
    pub fn track_id(&self) -> Option<&str> {
        self.songmid
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_deref().filter(|s| !s.is_empty()))
    }
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Contract every music platform implements
///
/// # Thread Safety
///
/// Implementations are shared between request handlers and must be
/// `Send + Sync`.
///
/// # Examples
///
/// ```rust
/// use sheetplatform::{Platform, SheetItem, Result};
///
/// #[derive(Debug)]
/// struct Fixed;
///
/// #[async_trait::async_trait]
/// impl Platform for Fixed {
///     fn name(&self) -> &str {
///         "Fixed"
///     }
///
///     async fn import_music_sheet(&self, _locator: &str) -> Result<Vec<SheetItem>> {
///         Ok(vec![SheetItem::new("Miles Davis", "So What").with_id("1")])
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Platform: Debug + Send + Sync {
    /// Display name, unique within a registry
    fn name(&self) -> &str;

    /// Ordered usage hints shown next to the locator input
    fn hints(&self) -> &[String] {
        &[]
    }

    /// Short code used when synthesizing playback URLs, if the platform knows it
    fn short_code(&self) -> Option<&str> {
        None
    }

    /// Resolves a locator into the tracks of the playlist
    async fn import_music_sheet(&self, locator: &str) -> Result<Vec<SheetItem>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_id_prefers_songmid() {
        let item = SheetItem::new("a", "b").with_id("1").with_songmid("mid");
        assert_eq!(item.track_id(), Some("mid"));

        let item = SheetItem::new("a", "b").with_id("1").with_songmid("");
        assert_eq!(item.track_id(), Some("1"));

        assert_eq!(SheetItem::new("a", "b").track_id(), None);
    }

    #[test]
    fn test_numeric_ids_are_stringified() {
        let item: SheetItem =
            serde_json::from_str(r#"{"id": 1234, "songmid": null, "artist": "A", "title": "T"}"#)
                .unwrap();
        assert_eq!(item.id.as_deref(), Some("1234"));
        assert_eq!(item.songmid, None);
        assert_eq!(item.track_id(), Some("1234"));
    }
}
