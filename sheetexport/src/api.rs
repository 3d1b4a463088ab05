//! # Export API
//!
//! ## Routes
//!
//! - `GET /platforms` - Plateformes chargées avec leurs indications
//! - `POST /platforms/reload` - Recharge le registre des plateformes
//! - `POST /export` - Exporte une playlist au format JSON normalisé

use crate::track::{ExportedSheet, StreamSettings};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sheetplatform::{LoadReport, SharedRegistry};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Nom du fichier proposé au téléchargement
pub const EXPORT_FILE_NAME: &str = "playlist.json";

/// État partagé des handlers d'export
#[derive(Clone)]
pub struct ExportState {
    pub registry: SharedRegistry,
    pub settings: Arc<StreamSettings>,
}

impl ExportState {
    pub fn new(registry: SharedRegistry, settings: StreamSettings) -> Self {
        Self {
            registry,
            settings: Arc::new(settings),
        }
    }
}

/// Plateforme telle que présentée à l'interface
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PlatformInfo {
    pub name: String,
    pub hints: Vec<String>,
}

/// Message d'erreur
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Corps de `POST /export`
///
/// Tous les champs sont optionnels. Un corps illisible ou qui n'est pas un
/// objet vaut un objet vide ; un champ d'un autre type est ignoré seul.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct ExportRequest {
    pub platform: Option<String>,
    /// Lien, identifiant numérique ou code de partage
    #[serde(rename = "urlLike")]
    pub url_like: Option<String>,
    pub name: Option<String>,
}

impl ExportRequest {
    /// Parse le corps sans jamais échouer
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self {
                platform: field_text(&map, "platform"),
                url_like: field_text(&map, "urlLike"),
                name: field_text(&map, "name"),
            },
            _ => Self::default(),
        }
    }
}

/// Chaînes telles quelles, nombres convertis, le reste absent
fn field_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Liste les plateformes chargées
///
/// Un registre vide est rechargé avant de répondre.
#[utoipa::path(
    get,
    path = "/platforms",
    responses(
        (status = 200, description = "Loaded platforms", body = Vec<PlatformInfo>)
    ),
    tag = "export"
)]
pub async fn list_platforms(State(state): State<ExportState>) -> Json<Vec<PlatformInfo>> {
    let mut registry = state.registry.snapshot().await;
    if registry.is_empty() {
        match state.registry.reload().await {
            Ok(_) => registry = state.registry.snapshot().await,
            Err(e) => warn!("Failed to reload empty platform registry: {}", e),
        }
    }

    Json(
        registry
            .platforms()
            .iter()
            .map(|p| PlatformInfo {
                name: p.name().to_string(),
                hints: p.hints().to_vec(),
            })
            .collect(),
    )
}

/// Recharge le registre des plateformes
#[utoipa::path(
    post,
    path = "/platforms/reload",
    responses(
        (status = 200, description = "Registry reloaded"),
        (status = 500, description = "Reload failed", body = ErrorResponse)
    ),
    tag = "export"
)]
pub async fn reload_platforms(State(state): State<ExportState>) -> Response {
    match state.registry.reload().await {
        Ok(report) => Json::<LoadReport>(report).into_response(),
        Err(e) => {
            error!("Platform reload failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_detail("reload failed", e.to_string())),
            )
                .into_response()
        }
    }
}

/// Exporte une playlist
#[utoipa::path(
    post,
    path = "/export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "Exported playlist file", body = ExportedSheet),
        (status = 400, description = "Unknown platform", body = ErrorResponse),
        (status = 500, description = "Platform call failed", body = ErrorResponse)
    ),
    tag = "export"
)]
pub async fn export_sheet(State(state): State<ExportState>, body: Bytes) -> Response {
    let request = ExportRequest::from_body(&body);
    let platform_name = request.platform.unwrap_or_default();

    let Some(platform) = state.registry.find(&platform_name).await else {
        warn!(platform = %platform_name, "Export requested for unknown platform");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("platform not found")),
        )
            .into_response();
    };

    let locator = request.url_like.unwrap_or_default();
    let items = match platform.import_music_sheet(&locator).await {
        Ok(items) => items,
        Err(e) => {
            error!(platform = %platform_name, "Export failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_detail("export failed", e.to_string())),
            )
                .into_response();
        }
    };

    let sheet = state
        .settings
        .build_sheet(platform.as_ref(), request.name, &items);

    match serde_json::to_string_pretty(&sheet) {
        Ok(body) => {
            info!(
                platform = %platform_name,
                tracks = sheet.musics.len(),
                "Playlist exported"
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={}", EXPORT_FILE_NAME),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_detail("export failed", e.to_string())),
        )
            .into_response(),
    }
}

/// Crée le router de l'API d'export, à monter à la racine
pub fn create_export_router(state: ExportState) -> Router {
    Router::new()
        .route("/platforms", get(list_platforms))
        .route("/platforms/reload", post(reload_platforms))
        .route("/export", post(export_sheet))
        .with_state(state)
}

/// Documentation OpenAPI de l'API d'export
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(list_platforms, reload_platforms, export_sheet),
    components(schemas(
        PlatformInfo,
        ErrorResponse,
        ExportRequest,
        ExportedSheet,
        crate::track::TrackRecord
    )),
    tags(
        (name = "export", description = "Platform listing and playlist export")
    )
)]
pub struct ExportApiDoc;
