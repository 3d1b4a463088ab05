//! # Export Extension Trait
//!
//! Ajoute les routes `/platforms` et `/export` à un `sheetserver::Server`
//! sans que `sheetserver` ne connaisse `sheetexport`.
//!
//! ```rust,ignore
//! use sheetexport::PlaylistExportExt;
//! use sheetplatform::{PlatformConfigExt, SharedRegistry};
//! use sheetserver::ServerBuilder;
//!
//! let mut server = ServerBuilder::new_configured().build();
//! let (registry, _report) = SharedRegistry::load(get_config().create_platform_loader()?);
//! server.init_playlist_export(registry).await?;
//! server.start().await?;
//! ```

use crate::api::{ExportApiDoc, ExportState, create_export_router};
use crate::track::StreamSettings;
use anyhow::Result;
use sheetconfig::get_config;
use sheetplatform::SharedRegistry;
use sheetserver::Server;
use utoipa::OpenApi;

#[async_trait::async_trait]
pub trait PlaylistExportExt {
    /// Monte l'API d'export à la racine avec les réglages de la configuration
    ///
    /// La documentation est publiée sous `/swagger-ui/export`.
    async fn init_playlist_export(&mut self, registry: SharedRegistry) -> Result<ExportState>;

    /// Variante avec des réglages explicites
    async fn add_playlist_export(&mut self, state: ExportState);
}

#[async_trait::async_trait]
impl PlaylistExportExt for Server {
    async fn init_playlist_export(&mut self, registry: SharedRegistry) -> Result<ExportState> {
        let settings = StreamSettings::from_config(&get_config())?;
        let state = ExportState::new(registry, settings);
        self.add_playlist_export(state.clone()).await;
        Ok(state)
    }

    async fn add_playlist_export(&mut self, state: ExportState) {
        self.add_router("/", create_export_router(state)).await;
        self.add_swagger(ExportApiDoc::openapi(), "export").await;
    }
}
