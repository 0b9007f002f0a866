//! Server configuration for LinkGate.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `LINKGATE_*` environment variables.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Public base URL used when composing share links.
    pub public_url: String,
    /// Admin credentials (None disables the admin API).
    pub admin_credentials: Option<AdminCredentials>,
    /// Admin session lifetime in hours.
    pub session_ttl_hours: i64,
    /// Expired-session sweep interval in seconds.
    pub session_sweep_interval_secs: u64,
}

/// Username/password pair for the admin API.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// JSON file on disk.
    File { path: String },
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (binds to `0.0.0.0`)
    /// - `LINKGATE_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8080`)
    /// - `LINKGATE_STORAGE` — `memory` or `file` (default: `memory`)
    /// - `LINKGATE_STORAGE_PATH` — path for the file backend (default: `./data/linkgate.json`)
    /// - `LINKGATE_LOG_LEVEL` — log filter (default: `info`)
    /// - `LINKGATE_PUBLIC_URL` — base URL for share links (default: derived from bind address)
    /// - `LINKGATE_ADMIN_USER` / `LINKGATE_ADMIN_PASSWORD` — admin credentials;
    ///   the admin API is disabled unless both are set
    /// - `LINKGATE_SESSION_TTL_HOURS` — admin session lifetime (default: `24`)
    /// - `LINKGATE_SESSION_SWEEP_INTERVAL` — seconds between expired-session sweeps (default: `300`)
    #[must_use]
    pub fn from_env() -> Self {
        // Priority: LINKGATE_BIND_ADDR > PORT > default 127.0.0.1:8080
        let bind_addr = if let Ok(addr) = std::env::var("LINKGATE_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8080)))
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(8080);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 8080))
        };

        let storage_path = std::env::var("LINKGATE_STORAGE_PATH")
            .unwrap_or_else(|_| "./data/linkgate.json".to_owned());

        let storage_backend = match std::env::var("LINKGATE_STORAGE")
            .unwrap_or_else(|_| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "file" | "json" => StorageBackendType::File { path: storage_path },
            _ => StorageBackendType::Memory,
        };

        let log_level =
            std::env::var("LINKGATE_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        let public_url = std::env::var("LINKGATE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{bind_addr}"));

        let admin_credentials = match (
            std::env::var("LINKGATE_ADMIN_USER"),
            std::env::var("LINKGATE_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) if !password.is_empty() => {
                Some(AdminCredentials { username, password })
            }
            _ => None,
        };

        let session_ttl_hours = std::env::var("LINKGATE_SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);

        let session_sweep_interval_secs = std::env::var("LINKGATE_SESSION_SWEEP_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        Self {
            bind_addr,
            storage_backend,
            log_level,
            public_url,
            admin_credentials,
            session_ttl_hours,
            session_sweep_interval_secs,
        }
    }
}
