//! Integration tests for the export API

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use sheetexport::{ExportState, StreamSettings, create_export_router};
use sheetplatform::{
    Platform, PlatformError, PlatformLoader, PlatformRegistry, Result, SharedRegistry, SheetItem,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

/// Plateforme de test qui compte ses appels
#[derive(Debug)]
struct CountingPlatform {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait::async_trait]
impl Platform for CountingPlatform {
    fn name(&self) -> &str {
        self.name
    }

    fn hints(&self) -> &[String] {
        static HINTS: std::sync::OnceLock<Vec<String>> = std::sync::OnceLock::new();
        HINTS.get_or_init(|| vec!["Paste a playlist URL".to_string()])
    }

    async fn import_music_sheet(&self, locator: &str) -> Result<Vec<SheetItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PlatformError::Other(format!("upstream refused {}", locator)));
        }
        Ok(vec![
            SheetItem::new("Miles Davis", "So What").with_songmid("mid001"),
            SheetItem::new("John Coltrane", "Giant Steps").with_id("2002"),
        ])
    }
}

fn app(name: &'static str, fail: bool) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = PlatformLoader::builder()
        .builtin(Arc::new(CountingPlatform {
            name,
            calls: calls.clone(),
            fail,
        }))
        .build()
        .unwrap();
    let (registry, _) = SharedRegistry::load(loader);
    let router = create_export_router(ExportState::new(registry, StreamSettings::default()));
    (router, calls)
}

fn export_request(body: &str) -> Request<Body> {
    Request::post("/export")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_list_platforms() {
    let (router, _) = app("小秋音乐", false);
    let response = router
        .oneshot(Request::get("/platforms").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([{"name": "小秋音乐", "hints": ["Paste a playlist URL"]}])
    );
}

#[tokio::test]
async fn test_unknown_platform_is_rejected_without_plugin_call() {
    let (router, calls) = app("小秋音乐", false);
    let response = router
        .oneshot(export_request(r#"{"platform": "Nope", "urlLike": "123"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "platform not found"}));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_body_is_treated_as_empty() {
    let (router, calls) = app("小秋音乐", false);
    let response = router.oneshot(export_request("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_plugin_failure_returns_detail() {
    let (router, calls) = app("小秋音乐", true);
    let response = router
        .oneshot(export_request(r#"{"platform": "小秋音乐", "urlLike": "42"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "export failed");
    assert_eq!(body["detail"], "upstream refused 42");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_successful_export() {
    let (router, _) = app("小秋音乐", false);
    let response = router
        .oneshot(export_request(
            r#"{"platform": "小秋音乐", "urlLike": "https://y.qq.com/n/ryqq/playlist/1", "name": "Jazz"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=playlist.json"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("{\n  \"name\": \"Jazz\""));

    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "Jazz",
            "musics": [
                {
                    "name": "Miles Davis-So What",
                    "url": "https://lxmusicapi.onrender.com/url/tx/mid001/320k",
                    "headers": {"X-Request-Key": "share-v2"}
                },
                {
                    "name": "John Coltrane-Giant Steps",
                    "url": "https://lxmusicapi.onrender.com/url/tx/2002/320k",
                    "headers": {"X-Request-Key": "share-v2"}
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_export_without_name_or_short_code() {
    let (router, _) = app("Unlisted", false);
    let response = router
        .oneshot(export_request(r#"{"platform": "Unlisted"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let value = body_json(response).await;
    assert!(value.get("name").is_none());
    assert_eq!(
        value["musics"][0]["url"],
        "https://lxmusicapi.onrender.com/url/undefined/mid001/320k"
    );
}

#[tokio::test]
async fn test_export_output_is_a_merge_batch() {
    let (router, _) = app("小蜗音乐", false);
    let response = router
        .oneshot(export_request(r#"{"platform": "小蜗音乐", "urlLike": "1", "name": "A"}"#))
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    let batch = sheetmerge::load_batch([("playlist.json", text.as_str())]).unwrap();
    let merged = sheetmerge::merge_uploads(&batch);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0], serde_json::from_str::<Value>(&text).unwrap());
}

#[tokio::test]
async fn test_reload_endpoint_replaces_registry() {
    let (registry, _) = SharedRegistry::load(PlatformLoader::builder().build().unwrap());
    let mut stale = PlatformRegistry::new();
    stale.register(Arc::new(CountingPlatform {
        name: "Stale",
        calls: Arc::new(AtomicUsize::new(0)),
        fail: false,
    }));
    registry.replace(stale).await;
    let router = create_export_router(ExportState::new(registry.clone(), StreamSettings::default()));

    let response = router
        .oneshot(Request::post("/platforms/reload").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"loaded": [], "failures": []}));
    assert!(registry.find("Stale").await.is_none());
}

#[tokio::test]
async fn test_numeric_locator_reaches_platform() {
    let (router, calls) = app("小秋音乐", true);
    let response = router
        .oneshot(export_request(
            r#"{"platform": "小秋音乐", "urlLike": 12345, "name": "Jazz"}"#,
        ))
        .await
        .unwrap();

    // The failing platform echoes the locator it received
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["detail"], "upstream refused 12345");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_list_platforms_reloads_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    let loader = PlatformLoader::builder()
        .directory(dir.path())
        .build()
        .unwrap();
    let (registry, report) = SharedRegistry::load(loader);
    assert!(report.loaded.is_empty());

    std::fs::write(
        dir.path().join("late.yaml"),
        "platform: Late Music\nhints:\n  import_music_sheet:\n    - Paste the URL\nimport_music_sheet:\n  url: \"http://localhost/{id}\"\n",
    )
    .unwrap();

    let router = create_export_router(ExportState::new(registry.clone(), StreamSettings::default()));
    let response = router
        .oneshot(Request::get("/platforms").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([{"name": "Late Music", "hints": ["Paste the URL"]}])
    );
    assert!(registry.find("Late Music").await.is_some());
}
