//! Gestion des erreurs des plugins de plateforme

use thiserror::Error;

/// Type Result personnalisé pour sheetplatform
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Erreurs possibles lors du chargement ou de l'appel d'une plateforme
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Erreur de parsing d'un fichier descripteur YAML
    #[error("Descriptor parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Erreur d'entrée/sortie
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Expression régulière de localisateur invalide
    #[error("Invalid locator pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Descripteur incomplet ou incohérent
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Localisateur vide ou inutilisable
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// Réponse HTTP non 2xx de la plateforme
    #[error("Platform API error (status {status}) for {url}")]
    Status { status: u16, url: String },

    /// Réponse bien formée mais sans la liste attendue
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Erreur générique, pour les plateformes implémentées en Rust
    #[error("{0}")]
    Other(String),
}
