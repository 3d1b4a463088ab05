//! Extension pour construire le chargeur de plateformes depuis sheetconfig
//!
//! Ce module fournit le trait `PlatformConfigExt` qui ajoute à
//! `sheetconfig::Config` la création d'un [`PlatformLoader`] configuré.

use crate::registry::PlatformLoader;
use anyhow::Result;
use sheetconfig::Config;
use std::time::Duration;

/// Trait d'extension pour le chargement des plateformes
///
/// # Exemple
///
/// ```rust,ignore
/// use sheetconfig::get_config;
/// use sheetplatform::{PlatformConfigExt, SharedRegistry};
///
/// let loader = get_config().create_platform_loader()?;
/// let (registry, report) = SharedRegistry::load(loader);
/// ```
pub trait PlatformConfigExt {
    /// Crée un chargeur lisant `platforms.directory` avec le timeout
    /// `platforms.timeout_secs`
    fn create_platform_loader(&self) -> Result<PlatformLoader>;
}

impl PlatformConfigExt for Config {
    fn create_platform_loader(&self) -> Result<PlatformLoader> {
        let dir = self.get_plugin_dir()?;
        let timeout = self.get_plugin_timeout_secs()?;
        let loader = PlatformLoader::builder()
            .directory(dir)
            .timeout(Duration::from_secs(timeout as u64))
            .build()?;
        Ok(loader)
    }
}
