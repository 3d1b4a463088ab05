//! Erreurs de fusion de playlists

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MergeError>;

#[derive(Error, Debug)]
pub enum MergeError {
    /// Le nom du fichier ne se termine pas par `.json`
    #[error("{0} is not a JSON file")]
    NotJsonFile(String),

    /// Contenu illisible
    #[error("{file} is not valid JSON: {source}")]
    InvalidJson {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// Échec de sérialisation du résultat
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
