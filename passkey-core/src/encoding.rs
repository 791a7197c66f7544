//! Base64url helpers for WebAuthn wire fields.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::{PasskeyError, Result};

/// Encode bytes as unpadded base64url.
pub fn base64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode base64url. Padding and the standard `+`/`/` alphabet are tolerated
/// because some clients send them.
pub fn base64url_decode(value: &str) -> Result<Vec<u8>> {
    let trimmed = value.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| PasskeyError::Encoding(format!("invalid base64url: {e}")))
}
