//! Session de fusion : lots successifs, retrait de fichiers, fusion

use crate::{PlaylistUpload, Result, load_batch, merge_uploads, to_pretty_json};
use serde_json::Value;

/// Fichiers accumulés au fil des envois
#[derive(Debug, Default, Clone)]
pub struct MergeSession {
    files: Vec<PlaylistUpload>,
}

impl MergeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute un lot à la suite des précédents
    ///
    /// En cas d'erreur la session reste inchangée. Retourne le nombre de
    /// fichiers ajoutés.
    pub fn add_batch<I, N, T>(&mut self, files: I) -> Result<usize>
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let batch = load_batch(files)?;
        let added = batch.len();
        self.files.extend(batch);
        Ok(added)
    }

    /// Ajoute des fichiers déjà parsés
    pub fn extend(&mut self, uploads: Vec<PlaylistUpload>) {
        self.files.extend(uploads);
    }

    /// Retire le fichier à la position `index`
    pub fn remove(&mut self, index: usize) -> Option<PlaylistUpload> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn files(&self) -> &[PlaylistUpload] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn merge(&self) -> Vec<Value> {
        merge_uploads(&self.files)
    }

    pub fn merge_pretty(&self) -> Result<String> {
        to_pretty_json(&self.merge())
    }
}
