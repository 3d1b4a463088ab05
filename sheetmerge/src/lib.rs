//! # sheetmerge
//!
//! Fusion de fichiers de playlists JSON exportés par SheetPort.
//!
//! Un *lot* est l'ensemble des fichiers d'un même envoi. Chaque fichier doit
//! porter l'extension `.json` et contenir du JSON valide ; le premier fichier
//! fautif annule le lot entier. La fusion aplatit les tableaux, enveloppe un
//! objet isolé et ignore les autres valeurs.
//!
//! ```rust
//! use serde_json::json;
//!
//! let batch = sheetmerge::load_batch([
//!     ("a.json", r#"[{"a": 1}]"#),
//!     ("b.json", r#"{"b": 2}"#),
//! ]).unwrap();
//! let merged = sheetmerge::merge_uploads(&batch);
//! assert_eq!(merged, vec![json!({"a": 1}), json!({"b": 2})]);
//! ```

pub mod error;
pub mod session;

pub use error::{MergeError, Result};
pub use session::MergeSession;

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Nom proposé pour le fichier fusionné
pub const DEFAULT_MERGED_FILE_NAME: &str = "merged-playlists.json";

/// Un fichier accepté dans un lot
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistUpload {
    pub name: String,
    pub data: Value,
}

/// Vérifie le nom et parse le contenu d'un fichier
pub fn parse_upload(name: &str, text: &str) -> Result<PlaylistUpload> {
    if !name.ends_with(".json") {
        return Err(MergeError::NotJsonFile(name.to_string()));
    }
    let data = serde_json::from_str(text).map_err(|source| MergeError::InvalidJson {
        file: name.to_string(),
        source,
    })?;
    Ok(PlaylistUpload {
        name: name.to_string(),
        data,
    })
}

/// Parse un lot `(nom, contenu)` ; tout ou rien
pub fn load_batch<I, N, T>(files: I) -> Result<Vec<PlaylistUpload>>
where
    I: IntoIterator<Item = (N, T)>,
    N: AsRef<str>,
    T: AsRef<str>,
{
    files
        .into_iter()
        .map(|(name, text)| parse_upload(name.as_ref(), text.as_ref()))
        .collect()
}

/// Lit un lot depuis le disque
///
/// Les noms de fichier sont vérifiés avant toute lecture.
pub fn read_batch<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PlaylistUpload>> {
    for path in paths {
        let name = display_name(path.as_ref());
        if !name.ends_with(".json") {
            return Err(MergeError::NotJsonFile(name));
        }
    }

    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let name = display_name(path);
            let text = fs::read_to_string(path).map_err(|source| MergeError::Io {
                file: name.clone(),
                source,
            })?;
            debug!(file = %path.display(), "Read playlist file");
            parse_upload(&name, &text)
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Fusionne les fichiers dans l'ordre donné
pub fn merge_uploads(uploads: &[PlaylistUpload]) -> Vec<Value> {
    let mut merged = Vec::new();
    for upload in uploads {
        match &upload.data {
            Value::Array(items) => merged.extend(items.iter().cloned()),
            Value::Object(_) => merged.push(upload.data.clone()),
            _ => debug!(file = %upload.name, "Skipping non playlist value"),
        }
    }
    merged
}

/// JSON indenté de deux espaces
pub fn to_pretty_json(merged: &[Value]) -> Result<String> {
    Ok(serde_json::to_string_pretty(merged)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_flattens_and_wraps() {
        let batch = load_batch([("a.json", r#"[{"a":1}]"#), ("b.json", r#"{"b":2}"#)]).unwrap();
        assert_eq!(merge_uploads(&batch), vec![json!({"a":1}), json!({"b":2})]);
    }

    #[test]
    fn test_scalars_and_null_are_skipped() {
        let batch = load_batch([
            ("n.json", "null"),
            ("s.json", "\"text\""),
            ("x.json", "[1, {\"c\": 3}]"),
        ])
        .unwrap();
        // Scalars nested inside arrays are kept as they are
        assert_eq!(merge_uploads(&batch), vec![json!(1), json!({"c": 3})]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let batch = load_batch([("a.json", r#"{"a":1}"#), ("b.json", r#"{"a":1}"#)]).unwrap();
        assert_eq!(merge_uploads(&batch).len(), 2);
    }

    #[test]
    fn test_non_json_name_rejects_batch() {
        let err = load_batch([("a.json", "[]"), ("notes.txt", "[]")]).unwrap_err();
        assert!(matches!(err, MergeError::NotJsonFile(ref n) if n == "notes.txt"));
        // The extension check is case sensitive
        assert!(parse_upload("A.JSON", "[]").is_err());
    }

    #[test]
    fn test_invalid_json_names_the_file() {
        let err = load_batch([("ok.json", "[]"), ("bad.json", "{oops")]).unwrap_err();
        match err {
            MergeError::InvalidJson { file, .. } => assert_eq!(file, "bad.json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_pretty_output() {
        let text = to_pretty_json(&[json!({"a": 1})]).unwrap();
        assert_eq!(text, "[\n  {\n    \"a\": 1\n  }\n]");
        assert_eq!(to_pretty_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_read_batch_checks_names_first() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        fs::write(&good, r#"[{"a":1}]"#).unwrap();
        let missing_txt = dir.path().join("missing.txt");

        // The .txt file does not exist: the name check fails before any read
        let err = read_batch(&[good.clone(), missing_txt]).unwrap_err();
        assert!(matches!(err, MergeError::NotJsonFile(_)));

        let batch = read_batch(&[good]).unwrap();
        assert_eq!(batch[0].name, "good.json");
    }
}
