//! Attestation object decoding.
//!
//! The attestation object is a CBOR map `{ "fmt": text, "attStmt": map,
//! "authData": bytes }`. Only `authData` is needed to register a credential;
//! the statement is kept opaque because trust chains are not evaluated.

use crate::authenticator_data::AuthenticatorData;
use crate::cbor::{self, CborValue};
use crate::error::{PasskeyError, Result};

#[derive(Debug, Clone)]
pub struct AttestationObject {
    /// Attestation statement format ("none", "packed", ...). Empty when absent.
    pub fmt: String,
    pub auth_data: Vec<u8>,
    pub att_stmt: Option<CborValue>,
}

impl AttestationObject {
    /// Decode an attestation object. Trailing bytes after the map are rejected.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let value = cbor::decode_exact(bytes)?;
        if value.as_map().is_none() {
            return Err(PasskeyError::AttestationObject(
                "expected a CBOR map".into(),
            ));
        }

        let auth_data = value
            .get_text("authData")
            .ok_or_else(|| PasskeyError::AttestationObject("missing authData".into()))?
            .as_bytes()
            .ok_or_else(|| {
                PasskeyError::AttestationObject("authData is not a byte string".into())
            })?
            .to_vec();

        let fmt = value
            .get_text("fmt")
            .and_then(CborValue::as_text)
            .unwrap_or_default()
            .to_owned();

        Ok(Self {
            fmt,
            auth_data,
            att_stmt: value.get_text("attStmt").cloned(),
        })
    }

    pub fn authenticator_data(&self) -> Result<AuthenticatorData> {
        AuthenticatorData::parse(&self.auth_data)
    }
}
