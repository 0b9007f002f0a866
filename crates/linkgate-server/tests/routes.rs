//! End-to-end route tests against an in-memory server.
//!
//! The router is driven directly via `tower::ServiceExt::oneshot` — no
//! network listener involved.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::middleware as axum_mw;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tower::ServiceExt;

use linkgate_core::auth::{CredentialVerifier, SessionStore, StaticCredentials};
use linkgate_core::codec;
use linkgate_core::config::ConfigRecord;
use linkgate_core::settings::SettingsStore;
use linkgate_server::middleware::admin_auth;
use linkgate_server::routes;
use linkgate_server::state::AppState;
use linkgate_storage::MemoryBackend;

const ANDROID_WEBVIEW_UA: &str =
    "Mozilla/5.0 (Linux; Android 13; wv) AppleWebKit/537.36 Chrome/120.0 Mobile Safari/537.36";
const IOS_INSTAGRAM_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Instagram 300.0.0.0";
const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";

fn test_app() -> Router {
    let storage = Arc::new(MemoryBackend::new());
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(StaticCredentials::new("admin", "s3cret"));

    let state = Arc::new(AppState {
        settings: Arc::new(SettingsStore::new(storage.clone())),
        sessions: Arc::new(SessionStore::new(storage)),
        verifier: Some(verifier),
        public_url: "http://gate.test".to_owned(),
        session_ttl: chrono::Duration::hours(24),
    });

    let admin_routes = routes::admin::router()
        .route_layer(axum_mw::from_fn_with_state(Arc::clone(&state), admin_auth));

    Router::new()
        .merge(routes::pages::router())
        .merge(routes::launch::router())
        .merge(routes::health_router())
        .nest("/v1/admin", routes::admin::login_router().merge(admin_routes))
        .fallback(routes::not_found)
        .with_state(state)
}

fn test_app_without_admin() -> Router {
    let storage = Arc::new(MemoryBackend::new());

    let state = Arc::new(AppState {
        settings: Arc::new(SettingsStore::new(storage.clone())),
        sessions: Arc::new(SessionStore::new(storage)),
        verifier: None,
        public_url: "http://gate.test".to_owned(),
        session_ttl: chrono::Duration::hours(24),
    });

    Router::new()
        .merge(routes::pages::router())
        .nest("/v1/admin", routes::admin::login_router())
        .with_state(state)
}

fn sample_record() -> ConfigRecord {
    ConfigRecord {
        channel_id: "UC1".to_owned(),
        channel_name: "Test Channel".to_owned(),
        subscribe_url: "https://www.youtube.com/channel/UC1?sub_confirmation=1".to_owned(),
        download_url: "https://example.com/a.pdf".to_owned(),
    }
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str, user_agent: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::USER_AGENT, user_agent)
        .body(Body::empty())
        .unwrap()
}

// ── Public pages ─────────────────────────────────────────────────────

#[tokio::test]
async fn healthz_reports_ok() {
    let response = test_app().oneshot(get("/healthz", DESKTOP_UA)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("\"status\":\"ok\""));
}

#[tokio::test]
async fn landing_page_is_locked() {
    let response = test_app().oneshot(get("/", DESKTOP_UA)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Access Required"));
}

#[tokio::test]
async fn gated_page_renders_decoded_token() {
    let token = codec::encode(&sample_record()).unwrap();
    let response = test_app()
        .oneshot(get(&format!("/c/{token}"), DESKTOP_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Test Channel"));
    assert!(body.contains("/r?u="));
    assert!(!body.contains("Invalid or corrupted link"));
}

#[tokio::test]
async fn gated_page_falls_back_on_bad_token() {
    let response = test_app()
        .oneshot(get("/c/definitely-not-a-valid-token", DESKTOP_UA))
        .await
        .unwrap();
    // Never a hard failure — the page stays interactive.
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Invalid or corrupted link"));
}

#[tokio::test]
async fn unknown_path_gets_a_json_404() {
    let response = test_app()
        .oneshot(get("/no/such/page", DESKTOP_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_string(response).await;
    assert!(body.contains("\"error\":\"not_found\""));
}

// ── Redirect launcher ────────────────────────────────────────────────

#[tokio::test]
async fn launcher_redirects_normal_browsers() {
    let u = BASE64.encode("https://example.com/a.pdf");
    let response = test_app()
        .oneshot(get(&format!("/r?u={u}"), DESKTOP_UA))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/a.pdf"
    );
}

#[tokio::test]
async fn launcher_serves_intent_page_to_android_webviews() {
    let u = BASE64.encode("https://example.com/a.pdf");
    let response = test_app()
        .oneshot(get(&format!("/r?u={u}"), ANDROID_WEBVIEW_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("intent://open#Intent;scheme=https"));
    assert!(body.contains("https://example.com/a.pdf"));
}

#[tokio::test]
async fn launcher_serves_manual_page_to_embedded_ios() {
    let u = BASE64.encode("https://example.com/a.pdf");
    let response = test_app()
        .oneshot(get(&format!("/r?u={u}"), IOS_INSTAGRAM_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("https://example.com/a.pdf"));
    assert!(!body.contains("intent://"));
}

#[tokio::test]
async fn launcher_rejects_missing_destination() {
    let response = test_app().oneshot(get("/r", DESKTOP_UA)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ── Admin API ────────────────────────────────────────────────────────

async fn login(app: &Router) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"username":"admin","password":"s3cret"}"#,
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    body["token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username":"admin","password":"wrong"}"#))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_unavailable_when_admin_disabled() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username":"admin","password":"s3cret"}"#))
        .unwrap();
    let response = test_app_without_admin().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn settings_require_a_session() {
    let response = test_app()
        .oneshot(get("/v1/admin/settings", DESKTOP_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn settings_roundtrip_through_the_api() {
    let app = test_app();
    let token = login(&app).await;

    let record = sample_record();
    let request = Request::builder()
        .method("PUT")
        .uri("/v1/admin/settings")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Admin-Token", &token)
        .body(Body::from(serde_json::to_vec(&record).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = Request::builder()
        .uri("/v1/admin/settings")
        .header("X-Admin-Token", &token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stored: ConfigRecord =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(stored, record);
}

#[tokio::test]
async fn issued_link_decodes_back_to_its_record() {
    let app = test_app();
    let token = login(&app).await;

    let record = sample_record();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/admin/links")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Admin-Token", &token)
        .body(Body::from(serde_json::to_vec(&record).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    let share_token = body["token"].as_str().unwrap();
    assert!(body["share_url"]
        .as_str()
        .unwrap()
        .starts_with("http://gate.test/c/"));
    assert_eq!(codec::decode(share_token).unwrap(), record);

    // And it shows up in the issued list.
    let request = Request::builder()
        .uri("/v1/admin/links")
        .header("X-Admin-Token", &token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let body: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["links"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn issuing_without_a_body_uses_the_stored_default() {
    let app = test_app();
    let token = login(&app).await;

    let record = sample_record();
    let request = Request::builder()
        .method("PUT")
        .uri("/v1/admin/settings")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Admin-Token", &token)
        .body(Body::from(serde_json::to_vec(&record).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/admin/links")
        .header("X-Admin-Token", &token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    let share_token = body["token"].as_str().unwrap();
    assert_eq!(codec::decode(share_token).unwrap(), record);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let app = test_app();
    let token = login(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/admin/logout")
        .header("X-Admin-Token", &token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = Request::builder()
        .uri("/v1/admin/settings")
        .header("X-Admin-Token", &token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
