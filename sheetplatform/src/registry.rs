//! # Platform Registry
//!
//! Ce module charge les plateformes et les rend accessibles par nom.
//!
//! ## Fonctionnalités
//!
//! - **Chargement partiel** : un fichier descripteur invalide est signalé dans
//!   le [`LoadReport`] sans empêcher le chargement des autres
//! - **Recherche par nom** : correspondance exacte, sensible à la casse
//! - **Rechargement atomique** : [`SharedRegistry::reload`] construit un
//!   registre complet puis le substitue à l'ancien

use crate::descriptor::{PlatformDescriptor, is_descriptor_file};
use crate::error::{PlatformError, Result};
use crate::http::HttpPlatform;
use crate::Platform;
use reqwest::Client;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Timeout par défaut des requêtes HTTP des plugins
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ensemble immuable de plateformes, uniques par nom
#[derive(Debug, Default, Clone)]
pub struct PlatformRegistry {
    platforms: Vec<Arc<dyn Platform>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre une plateforme
    ///
    /// Une plateforme de même nom est remplacée (à sa position) et retournée.
    pub fn register(&mut self, platform: Arc<dyn Platform>) -> Option<Arc<dyn Platform>> {
        match self
            .platforms
            .iter_mut()
            .find(|p| p.name() == platform.name())
        {
            Some(slot) => Some(std::mem::replace(slot, platform)),
            None => {
                self.platforms.push(platform);
                None
            }
        }
    }

    /// Recherche une plateforme par nom exact
    pub fn find(&self, name: &str) -> Option<Arc<dyn Platform>> {
        self.platforms.iter().find(|p| p.name() == name).cloned()
    }

    pub fn platforms(&self) -> &[Arc<dyn Platform>] {
        &self.platforms
    }

    pub fn names(&self) -> Vec<String> {
        self.platforms.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

/// Fichier descripteur qui n'a pas pu être chargé
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub file: String,
    pub error: String,
}

/// Résultat d'un chargement : plateformes chargées et échecs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failures: Vec<LoadFailure>,
}

/// Construit des [`PlatformRegistry`] depuis les plateformes intégrées et un
/// répertoire de descripteurs
#[derive(Debug)]
pub struct PlatformLoader {
    directory: Option<PathBuf>,
    builtins: Vec<Arc<dyn Platform>>,
    client: Client,
}

impl PlatformLoader {
    pub fn builder() -> PlatformLoaderBuilder {
        PlatformLoaderBuilder::default()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Charge toutes les plateformes
    ///
    /// Les plateformes intégrées sont enregistrées en premier, puis les
    /// fichiers du répertoire dans l'ordre alphabétique.
    pub fn load_all(&self) -> (PlatformRegistry, LoadReport) {
        let mut registry = PlatformRegistry::new();
        let mut report = LoadReport::default();

        for builtin in &self.builtins {
            registry.register(builtin.clone());
        }

        if let Some(dir) = &self.directory {
            match descriptor_files(dir) {
                Ok(files) => {
                    for file in files {
                        match self.load_file(&file) {
                            Ok(platform) => {
                                info!(
                                    platform = %platform.name(),
                                    file = %file.display(),
                                    "Loaded platform"
                                );
                                if registry.register(Arc::new(platform)).is_some() {
                                    debug!(file = %file.display(), "Platform replaced an earlier one");
                                }
                            }
                            Err(e) => {
                                warn!(file = %file.display(), error = %e, "Failed to load platform");
                                report.failures.push(LoadFailure {
                                    file: file.display().to_string(),
                                    error: e.to_string(),
                                });
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        directory = %dir.display(),
                        error = %e,
                        "Plugin directory unavailable, no descriptor loaded"
                    );
                }
            }
        }

        report.loaded = registry.names();
        (registry, report)
    }

    fn load_file(&self, path: &Path) -> Result<HttpPlatform> {
        let descriptor = PlatformDescriptor::from_path(path)?;
        HttpPlatform::new(descriptor, self.client.clone())
    }
}

fn descriptor_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_descriptor_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[derive(Debug, Default)]
pub struct PlatformLoaderBuilder {
    directory: Option<PathBuf>,
    timeout: Option<Duration>,
    builtins: Vec<Arc<dyn Platform>>,
    client: Option<Client>,
}

impl PlatformLoaderBuilder {
    /// Répertoire des fichiers descripteurs
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    /// Timeout des requêtes HTTP (ignoré si un client est fourni)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ajoute une plateforme implémentée en Rust
    pub fn builtin(mut self, platform: Arc<dyn Platform>) -> Self {
        self.builtins.push(platform);
        self
    }

    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<PlatformLoader> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .build()?,
        };

        Ok(PlatformLoader {
            directory: self.directory,
            builtins: self.builtins,
            client,
        })
    }
}

/// Registre partagé entre les handlers, remplaçable en bloc
///
/// # Thread Safety
///
/// Les lecteurs clonent l'`Arc` interne et relâchent le verrou avant
/// d'appeler une plateforme. Un rechargement ne bloque donc jamais un export
/// en cours.
#[derive(Debug, Clone)]
pub struct SharedRegistry {
    current: Arc<RwLock<Arc<PlatformRegistry>>>,
    loader: Arc<PlatformLoader>,
}

impl SharedRegistry {
    /// Charge un premier registre avec `loader`
    pub fn load(loader: PlatformLoader) -> (Self, LoadReport) {
        let (registry, report) = loader.load_all();
        let shared = Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
            loader: Arc::new(loader),
        };
        (shared, report)
    }

    /// Registre courant
    pub async fn snapshot(&self) -> Arc<PlatformRegistry> {
        self.current.read().await.clone()
    }

    pub async fn find(&self, name: &str) -> Option<Arc<dyn Platform>> {
        self.snapshot().await.find(name)
    }

    /// Reconstruit le registre et le substitue à l'ancien
    pub async fn reload(&self) -> Result<LoadReport> {
        let loader = self.loader.clone();
        let (registry, report) = tokio::task::spawn_blocking(move || loader.load_all())
            .await
            .map_err(|e| PlatformError::Other(format!("platform reload task failed: {}", e)))?;

        self.replace(registry).await;
        info!(
            loaded = report.loaded.len(),
            failures = report.failures.len(),
            "Platform registry reloaded"
        );
        Ok(report)
    }

    /// Remplace le registre courant
    pub async fn replace(&self, registry: PlatformRegistry) {
        *self.current.write().await = Arc::new(registry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SheetItem;

    #[derive(Debug)]
    struct Named(&'static str, &'static str);

    #[async_trait::async_trait]
    impl Platform for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn import_music_sheet(&self, _locator: &str) -> Result<Vec<SheetItem>> {
            Ok(vec![SheetItem::new(self.1, "t")])
        }
    }

    #[tokio::test]
    async fn test_register_replaces_same_name() {
        let mut registry = PlatformRegistry::new();
        assert!(registry.register(Arc::new(Named("A", "first"))).is_none());
        registry.register(Arc::new(Named("B", "b")));
        let old = registry.register(Arc::new(Named("A", "second")));

        assert!(old.is_some());
        assert_eq!(registry.names(), vec!["A", "B"]);
        let items = registry
            .find("A")
            .unwrap()
            .import_music_sheet("")
            .await
            .unwrap();
        assert_eq!(items[0].artist, "second");
    }

    #[test]
    fn test_find_is_exact() {
        let mut registry = PlatformRegistry::new();
        registry.register(Arc::new(Named("Music", "m")));
        assert!(registry.find("Music").is_some());
        assert!(registry.find("music").is_none());
        assert!(registry.find("Music ").is_none());
    }

    #[test]
    fn test_missing_directory_gives_builtins_only() {
        let loader = PlatformLoader::builder()
            .directory("/nonexistent/sheetport/plugins")
            .builtin(Arc::new(Named("Builtin", "x")))
            .build()
            .unwrap();
        let (registry, report) = loader.load_all();
        assert_eq!(registry.names(), vec!["Builtin"]);
        assert_eq!(report.loaded, vec!["Builtin"]);
        assert!(report.failures.is_empty());
    }
}
