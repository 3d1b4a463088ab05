//! # sheetserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit le serveur HTTP de SheetPort : un `Router` Axum
//! partagé, enrichi au démarrage par les autres crates via des traits
//! d'extension (`ConfigExt` ici, `PlaylistExportExt` dans `sheetexport`,
//! `WebAppExt` dans `sheetapp`).
//!
//! ## Architecture
//!
//! - [`server`] : serveur principal et builder
//! - [`logs`] : initialisation de `tracing` et API de niveau de log
//! - `config_ext` : API REST de configuration
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use sheetserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new("MyServer", "localhost", 8080).build();
//!     server.init_logging().await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;
mod config_ext;

pub use config_ext::ConfigExt;
pub use logs::{LogState, init_logging};
pub use server::{Server, ServerBuilder, ServerInfo};
