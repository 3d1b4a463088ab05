//! # sheetexport
//!
//! Export des playlists de SheetPort : une plateforme du registre résout le
//! localisateur, chaque piste est convertie en `{name, url, headers}` et le
//! résultat est renvoyé comme fichier `playlist.json`.
//!
//! - [`track`] : conversion des pistes et table des codes courts
//! - [`api`] : handlers Axum de `/platforms` et `/export`
//! - `PlaylistExportExt` (feature `server`) : montage sur un `sheetserver::Server`

pub mod api;
pub mod track;

#[cfg(feature = "server")]
mod server_ext;

pub use api::{
    ErrorResponse, ExportApiDoc, ExportRequest, ExportState, PlatformInfo, create_export_router,
};
pub use track::{ExportedSheet, StreamSettings, TrackRecord, UNDEFINED};

#[cfg(feature = "server")]
pub use server_ext::PlaylistExportExt;
