//! Authenticator data parsing.
//!
//! Layout (WebAuthn §6.1):
//!
//! ```text
//! rpIdHash (32) | flags (1) | signCount (4, BE)
//!   [ aaguid (16) | credIdLen (2, BE) | credId (L) | credentialPublicKey (COSE) ]
//! ```
//!
//! The bracketed trailer is only present when the AT flag (0x40) is set.

use crate::error::{PasskeyError, Result};

const RP_ID_HASH_LEN: usize = 32;
const HEADER_LEN: usize = RP_ID_HASH_LEN + 1 + 4;
const AAGUID_LEN: usize = 16;

/// Authenticator flags byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatorFlags(pub u8);

impl AuthenticatorFlags {
    pub const USER_PRESENT: u8 = 0x01;
    pub const USER_VERIFIED: u8 = 0x04;
    pub const ATTESTED_CREDENTIAL_DATA: u8 = 0x40;
    pub const EXTENSION_DATA: u8 = 0x80;

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn user_present(self) -> bool {
        self.0 & Self::USER_PRESENT != 0
    }

    pub fn user_verified(self) -> bool {
        self.0 & Self::USER_VERIFIED != 0
    }

    pub fn has_attested_credential_data(self) -> bool {
        self.0 & Self::ATTESTED_CREDENTIAL_DATA != 0
    }

    pub fn has_extension_data(self) -> bool {
        self.0 & Self::EXTENSION_DATA != 0
    }
}

/// Credential material carried by registration-time authenticator data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredentialData {
    pub aaguid: [u8; AAGUID_LEN],
    pub credential_id: Vec<u8>,
    /// Everything after the credential id: the COSE key, possibly followed
    /// by an extensions map when the ED flag is set.
    pub credential_public_key: Vec<u8>,
}

/// Parsed authenticator data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; RP_ID_HASH_LEN],
    pub flags: AuthenticatorFlags,
    pub sign_count: u32,
    pub attested_credential: Option<AttestedCredentialData>,
}

impl AuthenticatorData {
    /// Parse authenticator data from raw bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(PasskeyError::AuthenticatorData(format!(
                "expected at least {} bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }

        let mut rp_id_hash = [0u8; RP_ID_HASH_LEN];
        rp_id_hash.copy_from_slice(&bytes[..RP_ID_HASH_LEN]);
        let flags = AuthenticatorFlags(bytes[RP_ID_HASH_LEN]);
        let sign_count = u32::from_be_bytes([bytes[33], bytes[34], bytes[35], bytes[36]]);

        let attested_credential = if flags.has_attested_credential_data() {
            Some(parse_attested_credential(&bytes[HEADER_LEN..])?)
        } else {
            None
        };

        Ok(Self {
            rp_id_hash,
            flags,
            sign_count,
            attested_credential,
        })
    }

    pub fn credential_id(&self) -> Option<&[u8]> {
        self.attested_credential
            .as_ref()
            .map(|data| data.credential_id.as_slice())
    }

    pub fn credential_public_key(&self) -> Option<&[u8]> {
        self.attested_credential
            .as_ref()
            .map(|data| data.credential_public_key.as_slice())
    }
}

fn parse_attested_credential(trailer: &[u8]) -> Result<AttestedCredentialData> {
    let min_len = AAGUID_LEN + 2;
    if trailer.len() < min_len {
        return Err(PasskeyError::AuthenticatorData(format!(
            "attested credential data truncated: expected at least {} bytes, got {}",
            min_len,
            trailer.len()
        )));
    }

    let mut aaguid = [0u8; AAGUID_LEN];
    aaguid.copy_from_slice(&trailer[..AAGUID_LEN]);
    let id_len = u16::from_be_bytes([trailer[AAGUID_LEN], trailer[AAGUID_LEN + 1]]) as usize;

    let rest = &trailer[min_len..];
    if rest.len() < id_len {
        return Err(PasskeyError::AuthenticatorData(format!(
            "credential id length {} exceeds remaining {} bytes",
            id_len,
            rest.len()
        )));
    }
    let (credential_id, credential_public_key) = rest.split_at(id_len);

    if credential_public_key.is_empty() {
        return Err(PasskeyError::AuthenticatorData(
            "credential public key missing".into(),
        ));
    }

    Ok(AttestedCredentialData {
        aaguid,
        credential_id: credential_id.to_vec(),
        credential_public_key: credential_public_key.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(flags: u8, sign_count: u32) -> Vec<u8> {
        let mut data = vec![0xab; 32];
        data.push(flags);
        data.extend_from_slice(&sign_count.to_be_bytes());
        data
    }

    #[test]
    fn test_parse_assertion_data_without_credential() {
        let data = header(0x05, 7);
        assert_eq!(data.len(), 37);

        let parsed = AuthenticatorData::parse(&data).unwrap();
        assert_eq!(parsed.rp_id_hash, [0xab; 32]);
        assert_eq!(parsed.sign_count, 7);
        assert!(parsed.flags.user_present());
        assert!(parsed.flags.user_verified());
        assert!(parsed.credential_id().is_none());
        assert!(parsed.credential_public_key().is_none());
    }

    #[test]
    fn test_parse_attested_credential() {
        let mut data = header(0x41, 0x0102_0304);
        data.extend_from_slice(&[0x11; 16]);
        data.extend_from_slice(&3u16.to_be_bytes());
        data.extend_from_slice(&[0xc1, 0xc2, 0xc3]);
        data.extend_from_slice(&[0xa0]); // empty map stands in for the COSE key

        let parsed = AuthenticatorData::parse(&data).unwrap();
        assert_eq!(parsed.sign_count, 0x0102_0304);
        assert!(parsed.flags.has_attested_credential_data());

        let attested = parsed.attested_credential.as_ref().unwrap();
        assert_eq!(attested.aaguid, [0x11; 16]);
        assert_eq!(parsed.credential_id(), Some(&[0xc1, 0xc2, 0xc3][..]));
        assert_eq!(parsed.credential_public_key(), Some(&[0xa0][..]));
    }

    #[test]
    fn test_short_header_fails() {
        let data = vec![0u8; 36];
        assert!(matches!(
            AuthenticatorData::parse(&data),
            Err(PasskeyError::AuthenticatorData(_))
        ));
    }

    #[test]
    fn test_flag_set_without_trailer_fails() {
        let data = header(0x41, 0);
        assert!(AuthenticatorData::parse(&data).is_err());
    }

    #[test]
    fn test_credential_id_overrun_fails() {
        let mut data = header(0x40, 0);
        data.extend_from_slice(&[0; 16]);
        data.extend_from_slice(&64u16.to_be_bytes());
        data.extend_from_slice(&[0; 10]);
        assert!(AuthenticatorData::parse(&data).is_err());
    }

    #[test]
    fn test_missing_public_key_fails() {
        let mut data = header(0x40, 0);
        data.extend_from_slice(&[0; 16]);
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(&[0xaa, 0xbb]);
        assert!(AuthenticatorData::parse(&data).is_err());
    }
}
