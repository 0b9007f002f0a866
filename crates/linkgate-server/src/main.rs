//! LinkGate server entry point.
//!
//! Bootstraps the storage backend and stores, then starts the Axum HTTP
//! server with graceful shutdown. A background session sweeper runs
//! alongside the server and is cancelled on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::http::HeaderValue;
use axum::middleware as axum_mw;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use linkgate_core::auth::{CredentialVerifier, SessionStore, StaticCredentials};
use linkgate_core::settings::SettingsStore;
use linkgate_storage::{JsonFileBackend, MemoryBackend, StorageBackend};

use linkgate_server::config::{ServerConfig, StorageBackendType};
use linkgate_server::middleware::admin_auth;
use linkgate_server::routes;
use linkgate_server::state::AppState;

use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "LinkGate starting");

    let state = build_app_state(&config)?;

    // Shutdown signal channel.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn the expired-session sweeper.
    let sweeper_handle = {
        let sessions = Arc::clone(&state.sessions);
        let mut rx = shutdown_rx.clone();
        let interval_secs = config.session_sweep_interval_secs;
        tokio::spawn(async move {
            session_sweep_worker(sessions, &mut rx, interval_secs).await;
        })
    };

    let app = build_router(Arc::clone(&state));

    // Bind and serve.
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, public_url = %config.public_url, "LinkGate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    // Wait for the sweeper to finish (with timeout).
    info!("waiting for background workers to stop");
    let _ = tokio::time::timeout(Duration::from_secs(10), sweeper_handle).await;

    info!("LinkGate server stopped");
    Ok(())
}

/// Build the shared application state.
fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    // Bootstrap storage backend.
    let storage: Arc<dyn StorageBackend> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory storage (data will not persist)");
            Arc::new(MemoryBackend::new())
        }
        StorageBackendType::File { path } => {
            info!(path = %path, "using JSON file storage");
            Arc::new(JsonFileBackend::open(path).context("failed to open JSON file storage")?)
        }
    };

    let settings = Arc::new(SettingsStore::new(Arc::clone(&storage)));
    let sessions = Arc::new(SessionStore::new(storage));

    let verifier: Option<Arc<dyn CredentialVerifier>> = match &config.admin_credentials {
        Some(creds) => Some(Arc::new(StaticCredentials::new(
            &creds.username,
            &creds.password,
        ))),
        None => {
            warn!(
                "LINKGATE_ADMIN_USER / LINKGATE_ADMIN_PASSWORD not set — admin API is disabled"
            );
            None
        }
    };

    Ok(Arc::new(AppState {
        settings,
        sessions,
        verifier,
        public_url: config.public_url.clone(),
        session_ttl: chrono::Duration::hours(config.session_ttl_hours),
    }))
}

/// Build the Axum router with all routes and middleware.
fn build_router(state: Arc<AppState>) -> Router {
    // Session-protected admin routes go through the auth middleware layer.
    let admin_routes = routes::admin::router().route_layer(axum_mw::from_fn_with_state(
        Arc::clone(&state),
        admin_auth,
    ));

    // Concurrency-limit the login surface against credential stuffing.
    let login_routes = routes::admin::login_router()
        .layer(tower::limit::ConcurrencyLimitLayer::new(4));

    // CORS — the admin API may be driven from a separate dashboard origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static("x-admin-token"),
        ]);

    Router::new()
        .merge(routes::pages::router())
        .merge(routes::launch::router())
        .merge(routes::health_router())
        .nest("/v1/admin", login_routes.merge(admin_routes))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

/// Background worker that periodically deletes expired admin sessions.
async fn session_sweep_worker(
    sessions: Arc<SessionStore>,
    shutdown: &mut watch::Receiver<bool>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    info!(interval_secs, "session sweeper started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match sessions.purge_expired().await {
                    Ok(0) => {}
                    Ok(purged) => info!(purged, "expired sessions removed"),
                    Err(e) => warn!(error = %e, "session sweep failed, will retry next tick"),
                }
            }
            _ = shutdown.changed() => {
                info!("session sweeper shutting down");
                return;
            }
        }
    }
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
