//! Share-token codec.
//!
//! A share token packs a [`ConfigRecord`] into a compact, URL-embeddable
//! opaque string. Tokens are self-describing: four dot-separated segments
//! with an explicit version tag, so the decoder never relies on magic
//! offsets.
//!
//! ```text
//! v1.<prefix>.<payload>.<stamp>
//! ```
//!
//! - `v1` — version tag.
//! - `prefix` — 6 random alphanumeric characters. Collision avoidance for
//!   issuers generating many links; carries no semantic payload.
//! - `payload` — URL-safe base64 (no padding) of the JSON compact form
//!   (`{"c": …, "n": …, "s": …, "p": …}`).
//! - `stamp` — base-36 issue timestamp; carries no semantic payload.
//!
//! Round-trip law: for every valid record `r`, `decode(&encode(&r)?)? == r`
//! on all four fields.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::config::ConfigRecord;
use crate::error::{DecodeError, ValidationError};

/// Version tag of the current token format.
pub const TOKEN_VERSION: &str = "v1";

/// Length of the random prefix segment.
const PREFIX_LEN: usize = 6;

/// Shortest string that could possibly be a token: version, three dots, a
/// full prefix, and at least one character each of payload and stamp.
pub const MIN_TOKEN_LEN: usize = TOKEN_VERSION.len() + 3 + PREFIX_LEN + 2;

/// Compact wire form of a [`ConfigRecord`]: single-letter keys, fixed order.
#[derive(Serialize, Deserialize)]
struct CompactRecord {
    /// Channel id.
    c: String,
    /// Channel name.
    n: String,
    /// Subscribe URL.
    s: String,
    /// Download (PDF/resource) URL.
    p: String,
}

impl From<&ConfigRecord> for CompactRecord {
    fn from(record: &ConfigRecord) -> Self {
        Self {
            c: record.channel_id.clone(),
            n: record.channel_name.clone(),
            s: record.subscribe_url.clone(),
            p: record.download_url.clone(),
        }
    }
}

impl From<CompactRecord> for ConfigRecord {
    fn from(compact: CompactRecord) -> Self {
        Self {
            channel_id: compact.c,
            channel_name: compact.n,
            subscribe_url: compact.s,
            download_url: compact.p,
        }
    }
}

/// Encode a configuration record into a share token.
///
/// Pure aside from drawing randomness for the prefix and reading the clock
/// for the stamp.
///
/// # Errors
///
/// Returns [`ValidationError`] if the record fails the marker checks, or if
/// it cannot be represented as a token payload.
pub fn encode(record: &ConfigRecord) -> Result<String, ValidationError> {
    record.validate()?;

    let json = serde_json::to_vec(&CompactRecord::from(record)).map_err(|e| {
        ValidationError::Unencodable {
            reason: e.to_string(),
        }
    })?;
    let payload = URL_SAFE_NO_PAD.encode(&json);

    let prefix = random_prefix();
    let stamp = base36(chrono::Utc::now().timestamp());

    Ok(format!("{TOKEN_VERSION}.{prefix}.{payload}.{stamp}"))
}

/// Decode a share token back into a configuration record.
///
/// Never panics and never returns partial data.
///
/// # Errors
///
/// - [`DecodeError::TooShort`] if the input is below [`MIN_TOKEN_LEN`].
/// - [`DecodeError::Malformed`] if the input does not frame into four
///   segments of the expected shape.
/// - [`DecodeError::UnsupportedVersion`] if the version tag is unknown.
/// - [`DecodeError::Payload`] if the payload is not valid base64 or not a
///   valid compact record (including missing keys).
pub fn decode(token: &str) -> Result<ConfigRecord, DecodeError> {
    if token.len() < MIN_TOKEN_LEN {
        return Err(DecodeError::TooShort {
            min: MIN_TOKEN_LEN,
            actual: token.len(),
        });
    }

    let segments: Vec<&str> = token.split('.').collect();
    let [version, prefix, payload, stamp] = segments.as_slice() else {
        return Err(DecodeError::Malformed {
            reason: "expected four dot-separated segments",
        });
    };

    if *version != TOKEN_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            found: (*version).to_owned(),
        });
    }
    if prefix.len() != PREFIX_LEN {
        return Err(DecodeError::Malformed {
            reason: "prefix segment has wrong length",
        });
    }
    if stamp.is_empty() {
        return Err(DecodeError::Malformed {
            reason: "stamp segment is empty",
        });
    }

    let json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| DecodeError::Payload {
            reason: format!("invalid base64: {e}"),
        })?;

    let compact: CompactRecord =
        serde_json::from_slice(&json).map_err(|e| DecodeError::Payload {
            reason: format!("invalid compact record: {e}"),
        })?;

    Ok(compact.into())
}

/// Alphanumeric alphabet for the random prefix.
const PREFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draw a 6-character alphanumeric prefix from the OS CSPRNG (via UUID v4).
///
/// Collision avoidance only — not cryptographically meaningful, so the
/// slight modulo bias is acceptable.
fn random_prefix() -> String {
    let raw = uuid::Uuid::new_v4();
    raw.as_bytes()
        .iter()
        .take(PREFIX_LEN)
        .map(|b| PREFIX_ALPHABET[usize::from(*b) % PREFIX_ALPHABET.len()] as char)
        .collect()
}

/// Encode a non-negative timestamp in lowercase base-36.
fn base36(mut value: i64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value <= 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
