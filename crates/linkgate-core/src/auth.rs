//! Admin credentials and sessions.
//!
//! Credential checking is a capability behind the [`CredentialVerifier`]
//! trait: callers hold a verifier, not the credentials themselves. The
//! constant-time static implementation is fed from deployment configuration,
//! so nothing secret lives in source.
//!
//! Admin sessions follow the show-once pattern: [`SessionStore::create`]
//! returns a plaintext token exactly once and persists only its SHA-256
//! hash together with an expiry. Lookup hashes the presented token and
//! validates expiry.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::info;

use linkgate_storage::StorageBackend;

use crate::error::SessionError;

/// Storage prefix for session entries.
const SESSION_PREFIX: &str = "sys/sessions/";

/// A credential-verification capability.
///
/// Implementations must not leak timing information about how close a guess
/// came to the real credentials.
pub trait CredentialVerifier: Send + Sync {
    /// Check a username/password pair.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Static credentials from deployment configuration.
///
/// Comparison is constant time over SHA-256 digests, which also keeps the
/// lengths of the configured values out of the timing signal.
pub struct StaticCredentials {
    username_hash: [u8; 32],
    password_hash: [u8; 32],
}

impl StaticCredentials {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username_hash: Sha256::digest(username.as_bytes()).into(),
            password_hash: Sha256::digest(password.as_bytes()).into(),
        }
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        let user_digest: [u8; 32] = Sha256::digest(username.as_bytes()).into();
        let pass_digest: [u8; 32] = Sha256::digest(password.as_bytes()).into();

        // Evaluate both comparisons unconditionally.
        let user_ok = user_digest.ct_eq(&self.username_hash);
        let pass_ok = pass_digest.ct_eq(&self.password_hash);
        bool::from(user_ok & pass_ok)
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials").finish_non_exhaustive()
    }
}

/// A stored admin session (persisted hashed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    /// SHA-256 hash of the session token (hex-encoded). Storage key suffix.
    pub token_hash: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

/// Manages admin session creation, lookup, revocation, and expiry sweeps.
pub struct SessionStore {
    storage: Arc<dyn StorageBackend>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Create a session valid for `ttl` and return the plaintext token.
    ///
    /// The plaintext is shown once and never stored.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if persisting fails.
    pub async fn create(&self, ttl: Duration) -> Result<String, SessionError> {
        let plaintext = uuid::Uuid::new_v4().to_string();
        let token_hash = hash_session_token(&plaintext);
        let now = Utc::now();

        let entry = SessionEntry {
            token_hash: token_hash.clone(),
            created_at: now,
            expires_at: now + ttl,
        };

        let bytes = serde_json::to_vec(&entry).map_err(|e| SessionError::Serialization {
            reason: e.to_string(),
        })?;
        self.storage
            .put(&format!("{SESSION_PREFIX}{token_hash}"), &bytes)
            .await?;

        info!(expires_at = %entry.expires_at, "admin session created");

        Ok(plaintext)
    }

    /// Look up a session by its plaintext token, validating expiry.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotFound`] if no such session exists.
    /// - [`SessionError::Expired`] if the session's TTL has passed.
    /// - [`SessionError::Storage`] if storage fails.
    pub async fn lookup(&self, plaintext: &str) -> Result<SessionEntry, SessionError> {
        let token_hash = hash_session_token(plaintext);
        let key = format!("{SESSION_PREFIX}{token_hash}");

        let data = self.storage.get(&key).await?.ok_or(SessionError::NotFound)?;

        let entry: SessionEntry =
            serde_json::from_slice(&data).map_err(|e| SessionError::Serialization {
                reason: e.to_string(),
            })?;

        if Utc::now() > entry.expires_at {
            return Err(SessionError::Expired {
                expired_at: entry.expires_at.to_rfc3339(),
            });
        }

        Ok(entry)
    }

    /// Revoke a session. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if storage fails.
    pub async fn revoke(&self, plaintext: &str) -> Result<(), SessionError> {
        let token_hash = hash_session_token(plaintext);
        self.storage
            .delete(&format!("{SESSION_PREFIX}{token_hash}"))
            .await?;
        Ok(())
    }

    /// Delete all expired sessions, returning how many were removed.
    ///
    /// Entries that fail to deserialize are removed as well — they can never
    /// authenticate anyone again.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if storage fails.
    pub async fn purge_expired(&self) -> Result<usize, SessionError> {
        let now = Utc::now();
        let mut purged = 0;

        for key in self.storage.list(SESSION_PREFIX).await? {
            let Some(data) = self.storage.get(&key).await? else {
                continue;
            };

            let stale = match serde_json::from_slice::<SessionEntry>(&data) {
                Ok(entry) => now > entry.expires_at,
                Err(_) => true,
            };

            if stale {
                self.storage.delete(&key).await?;
                purged += 1;
            }
        }

        Ok(purged)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

/// Hash a plaintext session token with SHA-256, returning hex.
#[must_use]
fn hash_session_token(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}
