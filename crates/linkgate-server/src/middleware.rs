//! Admin authentication middleware.
//!
//! Extracts the `X-Admin-Token` header, validates it against the session
//! store, and injects an [`AdminContext`] into the request extensions for
//! downstream handlers (logout needs the presented token to revoke it).

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

/// Authentication context injected into request extensions.
#[derive(Debug, Clone)]
pub struct AdminContext {
    /// The session token as presented (needed for revocation).
    pub session_token: String,
}

/// Middleware that validates the `X-Admin-Token` header.
pub async fn admin_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let Some(token) = token else {
        return AppError::Unauthorized("missing X-Admin-Token header".to_owned()).into_response();
    };

    match state.sessions.lookup(&token).await {
        Ok(_) => {
            req.extensions_mut().insert(AdminContext {
                session_token: token,
            });
            next.run(req).await
        }
        Err(err) => AppError::from(err).into_response(),
    }
}
