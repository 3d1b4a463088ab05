//! Mise en forme des pistes exportées
//!
//! Chaque [`SheetItem`] retourné par une plateforme devient un
//! [`TrackRecord`] `{name, url, headers}`. L'URL de lecture est synthétisée à
//! partir d'un modèle contenant `{code}` (code court de la plateforme) et
//! `{id}` (identifiant de la piste).

use serde::{Deserialize, Serialize};
use sheetconfig::{Config, DEFAULT_STREAM_URL_TEMPLATE};
use sheetplatform::{Platform, SheetItem};
use std::collections::BTreeMap;
use tracing::warn;

/// Valeur utilisée quand un code court ou un identifiant manque
pub const UNDEFINED: &str = "undefined";

/// Codes courts connus par défaut
pub const DEFAULT_SHORT_CODES: &[(&str, &str)] = &[
    ("小枸音乐", "kg"),
    ("小蜜音乐", "migu"),
    ("小秋音乐", "tx"),
    ("小蜗音乐", "kw"),
    ("小芸音乐", "wy"),
];

/// En-têtes ajoutés par défaut à chaque piste
pub const DEFAULT_STREAM_HEADERS: &[(&str, &str)] = &[("X-Request-Key", "share-v2")];

/// Une piste du fichier exporté
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TrackRecord {
    /// `"<artist>-<title>"`
    pub name: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

/// Le fichier exporté
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExportedSheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub musics: Vec<TrackRecord>,
}

/// Paramètres de synthèse des URLs de lecture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    pub url_template: String,
    pub headers: BTreeMap<String, String>,
    pub short_codes: BTreeMap<String, String>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_STREAM_URL_TEMPLATE.to_string(),
            headers: to_map(DEFAULT_STREAM_HEADERS),
            short_codes: to_map(DEFAULT_SHORT_CODES),
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl StreamSettings {
    /// Lit `export.stream` et `export.short_codes` dans la configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let headers = config
            .get_stream_headers()?
            .into_iter()
            .map(|h| (h.name, h.value))
            .collect();
        let short_codes = config
            .get_short_codes()?
            .into_iter()
            .map(|c| (c.platform, c.code))
            .collect();

        Ok(Self {
            url_template: config.get_stream_url_template(),
            headers,
            short_codes,
        })
    }

    /// Code court d'une plateforme
    ///
    /// La table configurée prime sur le code déclaré par la plateforme. Sans
    /// code connu, `undefined` est utilisé tel quel dans l'URL.
    pub fn short_code_for(&self, platform: &dyn Platform) -> String {
        if let Some(code) = self.short_codes.get(platform.name()) {
            return code.clone();
        }
        if let Some(code) = platform.short_code().filter(|c| !c.is_empty()) {
            return code.to_string();
        }
        warn!(
            platform = %platform.name(),
            "No short code for platform, stream URLs will contain '{}'",
            UNDEFINED
        );
        UNDEFINED.to_string()
    }

    /// Un artiste ou un titre vide devient `undefined` dans le nom
    pub fn to_track(&self, item: &SheetItem, code: &str) -> TrackRecord {
        let id = item.track_id().unwrap_or(UNDEFINED);
        TrackRecord {
            name: format!("{}-{}", or_undefined(&item.artist), or_undefined(&item.title)),
            url: self
                .url_template
                .replace("{code}", code)
                .replace("{id}", id),
            headers: self.headers.clone(),
        }
    }

    /// Construit le fichier exporté pour les pistes d'une plateforme
    pub fn build_sheet(
        &self,
        platform: &dyn Platform,
        name: Option<String>,
        items: &[SheetItem],
    ) -> ExportedSheet {
        let code = self.short_code_for(platform);
        ExportedSheet {
            name,
            musics: items.iter().map(|item| self.to_track(item, &code)).collect(),
        }
    }
}

fn or_undefined(text: &str) -> &str {
    if text.is_empty() { UNDEFINED } else { text }
}
