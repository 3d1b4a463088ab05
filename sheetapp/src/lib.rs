//! # sheetapp - Interface web de SheetPort
//!
//! Cette crate embarque l'interface web servie par `sheetserver` :
//!
//! - **Export** (`#/`) : choix de la plateforme, affichage de ses indications,
//!   saisie du lien de playlist et du nom de fichier, téléchargement du JSON
//!   renvoyé par `POST /export`
//! - **Fusion** (`#/merge`) : dépôt de plusieurs fichiers `.json`, retrait
//!   individuel, fusion, aperçu coloré, téléchargement
//!   (`merged-playlists.json`) et copie dans le presse-papier
//!
//! La fusion se fait entièrement dans le navigateur et suit les règles de
//! `sheetmerge`.
//!
//! Les fichiers sont de simples HTML/JS/CSS sans étape de build, inclus dans
//! le binaire par `RustEmbed` depuis `webapp/`.
//!
//! ```rust,ignore
//! use sheetapp::{Webapp, WebAppExt};
//! use sheetserver::ServerBuilder;
//!
//! let mut server = ServerBuilder::new_configured().build();
//! server.add_webapp::<Webapp>("/").await;
//! ```

use rust_embed::RustEmbed;

/// Fichiers de l'interface web
#[derive(RustEmbed, Clone)]
#[folder = "webapp"]
pub struct Webapp;

/// Extension d'un serveur HTTP avec une webapp embarquée
///
/// `sheetapp` ajoute ces méthodes à `sheetserver::Server` sans que
/// `sheetserver` ne dépende de `sheetapp`.
#[cfg(feature = "sheetserver")]
#[async_trait::async_trait]
pub trait WebAppExt {
    /// Monte la webapp `W` sous `path` ; les chemins inconnus servent `index.html`
    async fn add_webapp<W>(&mut self, path: &str)
    where
        W: RustEmbed + Clone + Send + Sync + 'static;
}

#[cfg(feature = "sheetserver")]
mod sheetserver_impl;
