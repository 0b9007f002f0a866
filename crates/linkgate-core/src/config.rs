//! Configuration records.
//!
//! A [`ConfigRecord`] is the unit of configuration a share token embeds: a
//! channel to subscribe to and a resource to unlock. Validation is marker
//! based — the subscribe URL must point at the video platform and the
//! download URL must carry a URL scheme — matching what the encoder is
//! willing to put inside a token.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Substring the subscribe URL must contain to be considered a platform link.
pub const PLATFORM_MARKER: &str = "youtube.com";

/// Substring the download URL must contain to be considered a fetchable URL.
pub const SCHEME_MARKER: &str = "http";

/// A subscribe-gate configuration: which channel to push and what to unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Opaque external channel identifier.
    pub channel_id: String,
    /// Channel display name.
    pub channel_name: String,
    /// Link to the channel's subscribe page.
    pub subscribe_url: String,
    /// Link to the gated resource.
    pub download_url: String,
}

impl ConfigRecord {
    /// Check the record against the encode-time validity rules.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyField`] if the channel id or name is blank.
    /// - [`ValidationError::MissingPlatformMarker`] if the subscribe URL does
    ///   not contain [`PLATFORM_MARKER`].
    /// - [`ValidationError::MissingSchemeMarker`] if the download URL does
    ///   not contain [`SCHEME_MARKER`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.channel_id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "channel_id" });
        }
        if self.channel_name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "channel_name",
            });
        }
        if !self.subscribe_url.contains(PLATFORM_MARKER) {
            return Err(ValidationError::MissingPlatformMarker {
                marker: PLATFORM_MARKER,
            });
        }
        if !self.download_url.contains(SCHEME_MARKER) {
            return Err(ValidationError::MissingSchemeMarker {
                marker: SCHEME_MARKER,
            });
        }
        Ok(())
    }
}

impl Default for ConfigRecord {
    /// The built-in fallback configuration, shown when a page is reached with
    /// an invalid or corrupted link and no stored default exists.
    fn default() -> Self {
        Self {
            channel_id: "UC0000000000000000000000".to_owned(),
            channel_name: "Example Channel".to_owned(),
            subscribe_url: "https://www.youtube.com/@example?sub_confirmation=1".to_owned(),
            download_url: "https://example.com/resource.pdf".to_owned(),
        }
    }
}
