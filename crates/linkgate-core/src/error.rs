//! Error types for `linkgate-core`.
//!
//! Each error variant carries enough context to diagnose the problem without
//! a debugger. Session errors never include token material — only expiry
//! timestamps or operation descriptions.

use linkgate_storage::StorageError;

/// Errors from validating a configuration record at encode time.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// The subscribe URL does not contain the video platform's domain.
    #[error("subscribe URL does not look like a '{marker}' link")]
    MissingPlatformMarker { marker: &'static str },

    /// The download URL does not carry a recognizable URL scheme.
    #[error("download URL does not carry a '{marker}' scheme")]
    MissingSchemeMarker { marker: &'static str },

    /// The record could not be serialized into a token payload.
    #[error("record cannot be encoded: {reason}")]
    Unencodable { reason: String },
}

/// Errors from decoding a share token.
///
/// Decode failures are always recoverable: the caller falls back to a default
/// configuration and surfaces an "invalid link" notice.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The token is shorter than the minimum viable length.
    #[error("token too short: expected at least {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    /// The token does not split into the expected segments.
    #[error("malformed token: {reason}")]
    Malformed { reason: &'static str },

    /// The version tag is not one this codec understands.
    #[error("unsupported token version '{found}'")]
    UnsupportedVersion { found: String },

    /// The payload segment is not valid base64 or not a valid compact record.
    #[error("invalid token payload: {reason}")]
    Payload { reason: String },
}

/// Errors from admin session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session token was not found in storage.
    #[error("session not found")]
    NotFound,

    /// The session has expired.
    #[error("session expired at {expired_at}")]
    Expired { expired_at: String },

    /// A session entry could not be serialized or deserialized.
    #[error("session serialization failed: {reason}")]
    Serialization { reason: String },

    /// The underlying storage backend returned an error.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the settings and issued-links store.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The record being saved failed validation.
    #[error("invalid settings: {0}")]
    Invalid(#[from] ValidationError),

    /// A stored entry could not be serialized or deserialized.
    #[error("settings serialization failed: {reason}")]
    Serialization { reason: String },

    /// The underlying storage backend returned an error.
    #[error("settings storage error: {0}")]
    Storage(#[from] StorageError),
}
