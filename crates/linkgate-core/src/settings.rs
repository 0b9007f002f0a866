//! Settings and issued-links store.
//!
//! Holds the admin's current default configuration and the issuer's own
//! reference list of previously issued share links. Neither is authoritative
//! for a shared link — the token itself carries the configuration — but the
//! default is what public pages fall back to when a link fails to decode.
//!
//! The public surface only ever reads from this store; all writes come
//! through the admin API.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use linkgate_storage::StorageBackend;

use crate::config::ConfigRecord;
use crate::error::SettingsError;

/// Storage key of the default configuration.
const SETTINGS_KEY: &str = "sys/settings";

/// Storage prefix for issued-link entries.
const LINKS_PREFIX: &str = "sys/links/";

/// A previously issued share link, kept for the issuer's reference UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedLink {
    /// The share token exactly as issued.
    pub token: String,
    /// The configuration the token embeds.
    pub record: ConfigRecord,
    /// When the link was issued.
    pub issued_at: DateTime<Utc>,
}

/// Read/write access to the default configuration and the issued-links list.
pub struct SettingsStore {
    storage: Arc<dyn StorageBackend>,
}

impl SettingsStore {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Load the stored default configuration, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Storage`] or [`SettingsError::Serialization`]
    /// if the stored record cannot be read back.
    pub async fn load(&self) -> Result<Option<ConfigRecord>, SettingsError> {
        let Some(data) = self.storage.get(SETTINGS_KEY).await? else {
            return Ok(None);
        };
        let record = serde_json::from_slice(&data).map_err(|e| SettingsError::Serialization {
            reason: e.to_string(),
        })?;
        Ok(Some(record))
    }

    /// Validate and persist a new default configuration.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Invalid`] if the record fails validation.
    /// - [`SettingsError::Storage`] if persisting fails.
    pub async fn save(&self, record: &ConfigRecord) -> Result<(), SettingsError> {
        record.validate()?;

        let bytes = serde_json::to_vec(record).map_err(|e| SettingsError::Serialization {
            reason: e.to_string(),
        })?;
        self.storage.put(SETTINGS_KEY, &bytes).await?;

        info!(channel = %record.channel_name, "default settings saved");
        Ok(())
    }

    /// Record an issued share link in the reference list.
    ///
    /// No uniqueness check is made — the token is stored as issued.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Storage`] if persisting fails.
    pub async fn record_issued(
        &self,
        token: &str,
        record: &ConfigRecord,
    ) -> Result<IssuedLink, SettingsError> {
        let link = IssuedLink {
            token: token.to_owned(),
            record: record.clone(),
            issued_at: Utc::now(),
        };

        let bytes = serde_json::to_vec(&link).map_err(|e| SettingsError::Serialization {
            reason: e.to_string(),
        })?;

        // Zero-padded nanosecond timestamps sort lexicographically, so
        // listing the prefix returns links in issue order; a UUID suffix
        // keeps keys unique.
        let nanos = link.issued_at.timestamp_nanos_opt().unwrap_or(i64::MAX);
        let key = format!("{LINKS_PREFIX}{nanos:020}/{}", uuid::Uuid::new_v4());
        self.storage.put(&key, &bytes).await?;

        Ok(link)
    }

    /// List previously issued links, newest first.
    ///
    /// Entries that fail to deserialize are skipped rather than failing the
    /// whole listing.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Storage`] if storage fails.
    pub async fn list_issued(&self) -> Result<Vec<IssuedLink>, SettingsError> {
        let mut links = Vec::new();
        for key in self.storage.list(LINKS_PREFIX).await? {
            let Some(data) = self.storage.get(&key).await? else {
                continue;
            };
            if let Ok(link) = serde_json::from_slice::<IssuedLink>(&data) {
                links.push(link);
            }
        }
        links.reverse();
        Ok(links)
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore").finish_non_exhaustive()
    }
}
