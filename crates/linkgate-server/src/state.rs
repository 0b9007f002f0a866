//! Shared application state for the LinkGate server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the settings and session stores, the
//! credential verifier, and the public base URL for share links.

use std::sync::Arc;

use linkgate_core::auth::{CredentialVerifier, SessionStore};
use linkgate_core::settings::SettingsStore;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Default configuration and issued-links list.
    pub settings: Arc<SettingsStore>,
    /// Admin session lifecycle.
    pub sessions: Arc<SessionStore>,
    /// Credential verifier (None when the admin API is disabled).
    pub verifier: Option<Arc<dyn CredentialVerifier>>,
    /// Public base URL used when composing share links.
    pub public_url: String,
    /// Admin session lifetime.
    pub session_ttl: chrono::Duration,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
