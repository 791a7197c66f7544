//! `clientDataJSON` parsing.

use serde::Deserialize;

use crate::error::{PasskeyError, Result};

/// Ceremony a client data blob was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyType {
    /// `navigator.credentials.create`
    Create,
    /// `navigator.credentials.get`
    Get,
}

impl CeremonyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "webauthn.create",
            Self::Get => "webauthn.get",
        }
    }
}

/// Collected client data (WebAuthn §5.8.1). Unknown members are ignored;
/// missing `type` or `challenge` members parse as empty and never match.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedClientData {
    #[serde(rename = "type", default)]
    pub ceremony: String,
    /// Base64url challenge exactly as the browser echoed it.
    #[serde(default)]
    pub challenge: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub cross_origin: Option<bool>,
}

impl CollectedClientData {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| PasskeyError::ClientData(e.to_string()))
    }

    /// True when the ceremony type matches and the challenge is byte-for-byte
    /// equal to the one that was issued.
    pub fn matches(&self, ceremony: CeremonyType, expected_challenge: &str) -> bool {
        !expected_challenge.is_empty()
            && self.ceremony == ceremony.as_str()
            && self.challenge == expected_challenge
    }
}
