//! Admin API routes under `/v1/admin`.
//!
//! `login` is the only unauthenticated route; everything else sits behind
//! the session middleware. The admin API is the sole writer of the default
//! configuration — public pages only ever read it.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use linkgate_core::codec;
use linkgate_core::config::ConfigRecord;
use linkgate_core::settings::IssuedLink;

use crate::error::AppError;
use crate::middleware::AdminContext;
use crate::state::AppState;

/// Build the unauthenticated login router.
pub fn login_router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

/// Build the session-protected admin router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/logout", post(logout))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/links", get(list_links).post(issue_link))
}

// ── Request/response types ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct IssueLinkResponse {
    token: String,
    share_url: String,
    issued_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct LinksResponse {
    links: Vec<IssuedLink>,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// Verify credentials and mint a session token.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let verifier = state.verifier.as_ref().ok_or(AppError::AdminDisabled)?;

    if !verifier.verify(&body.username, &body.password) {
        info!(username = %body.username, "admin login rejected");
        return Err(AppError::Unauthorized(
            "invalid username or password".to_owned(),
        ));
    }

    let token = state.sessions.create(state.session_ttl).await?;
    info!(username = %body.username, "admin logged in");

    Ok(Json(LoginResponse {
        token,
        expires_at: Utc::now() + state.session_ttl,
    }))
}

/// Revoke the presented session.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AdminContext>,
) -> Result<StatusCode, AppError> {
    state.sessions.revoke(&ctx.session_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read the current default configuration (stored or built-in).
async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConfigRecord>, AppError> {
    let record = state.settings.load().await?.unwrap_or_default();
    Ok(Json(record))
}

/// Replace the default configuration.
async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(record): Json<ConfigRecord>,
) -> Result<StatusCode, AppError> {
    state.settings.save(&record).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Issue a share token.
///
/// The body carries the configuration to embed; a request without a JSON
/// body means "use the stored default".
async fn issue_link(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ConfigRecord>>,
) -> Result<Json<IssueLinkResponse>, AppError> {
    let record = match body {
        Some(Json(record)) => record,
        None => state.settings.load().await?.unwrap_or_default(),
    };

    let token = codec::encode(&record)?;
    let link = state.settings.record_issued(&token, &record).await?;

    let share_url = format!("{}/c/{}", state.public_url.trim_end_matches('/'), token);
    info!(channel = %record.channel_name, "share link issued");

    Ok(Json(IssueLinkResponse {
        token: link.token,
        share_url,
        issued_at: link.issued_at,
    }))
}

/// List previously issued links, newest first.
async fn list_links(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LinksResponse>, AppError> {
    let links = state.settings.list_issued().await?;
    Ok(Json(LinksResponse { links }))
}
