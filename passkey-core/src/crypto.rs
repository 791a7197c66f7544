//! Cryptographic provider: entropy, SHA-256 and ECDSA P-256 verification.

use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::cose::RAW_EC_KEY_LEN;
use crate::encoding::base64url_encode;
use crate::error::{PasskeyError, Result};

/// Challenge size in bytes.
pub const CHALLENGE_LEN: usize = 32;

/// Session token size in bytes (128 bits).
pub const SESSION_TOKEN_LEN: usize = 16;

/// Source of secure random bytes.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait EntropySource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        rand::rngs::OsRng
            .try_fill_bytes(dest)
            .map_err(|e| PasskeyError::Entropy(e.to_string()))
    }
}

/// Fresh 32-byte challenge, base64url-encoded.
pub fn new_challenge(entropy: &dyn EntropySource) -> Result<String> {
    let mut bytes = [0u8; CHALLENGE_LEN];
    entropy.fill_bytes(&mut bytes)?;
    Ok(base64url_encode(&bytes))
}

/// Fresh 128-bit session token as 32 lowercase hex characters.
pub fn new_session_token(entropy: &dyn EntropySource) -> Result<String> {
    let mut bytes = [0u8; SESSION_TOKEN_LEN];
    entropy.fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Import an uncompressed SEC1 point as a P-256 verification key.
pub fn import_verifying_key(raw: &[u8]) -> Result<VerifyingKey> {
    if raw.len() != RAW_EC_KEY_LEN || raw[0] != 0x04 {
        return Err(PasskeyError::InvalidPublicKey(format!(
            "expected {} byte uncompressed point, got {} bytes",
            RAW_EC_KEY_LEN,
            raw.len()
        )));
    }
    VerifyingKey::from_sec1_bytes(raw)
        .map_err(|_| PasskeyError::InvalidPublicKey("point is not on P-256".into()))
}

/// Verify an assertion signature.
///
/// The signed message is `authenticatorData || SHA-256(clientDataJSON)`,
/// verified with ECDSA/SHA-256. Authenticators emit DER signatures; a raw
/// 64-byte `r || s` form is also accepted.
pub fn verify_assertion(
    public_key: &[u8],
    authenticator_data: &[u8],
    client_data_json: &[u8],
    signature: &[u8],
) -> Result<()> {
    let key = import_verifying_key(public_key)?;

    let signature = Signature::from_der(signature)
        .or_else(|der_err| {
            if signature.len() == 64 {
                tracing::debug!("signature is not DER, trying raw r || s");
                Signature::from_slice(signature)
            } else {
                Err(der_err)
            }
        })
        .map_err(|_| PasskeyError::VerificationFailed("malformed signature".into()))?;

    let client_data_hash = sha256(client_data_json);
    let mut message = Vec::with_capacity(authenticator_data.len() + client_data_hash.len());
    message.extend_from_slice(authenticator_data);
    message.extend_from_slice(&client_data_hash);

    key.verify(&message, &signature)
        .map_err(|_| PasskeyError::VerificationFailed("signature mismatch".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::signature::Signer;
    use p256::ecdsa::SigningKey;
    use rand::rngs::OsRng;

    fn raw_public_key(signing_key: &SigningKey) -> Vec<u8> {
        signing_key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    fn sign(signing_key: &SigningKey, auth_data: &[u8], client_data: &[u8]) -> Signature {
        let mut message = auth_data.to_vec();
        message.extend_from_slice(&sha256(client_data));
        signing_key.sign(&message)
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_der_and_raw_signatures() {
        let signing_key = SigningKey::random(&mut OsRng);
        let public_key = raw_public_key(&signing_key);
        let auth_data = [7u8; 37];
        let client_data = br#"{"type":"webauthn.get"}"#;
        let signature = sign(&signing_key, &auth_data, client_data);

        let der = signature.to_der();
        verify_assertion(&public_key, &auth_data, client_data, der.as_bytes()).unwrap();
        verify_assertion(&public_key, &auth_data, client_data, &signature.to_bytes()).unwrap();
    }

    #[test]
    fn test_tampered_inputs_fail() {
        let signing_key = SigningKey::random(&mut OsRng);
        let public_key = raw_public_key(&signing_key);
        let auth_data = [7u8; 37];
        let client_data = br#"{"type":"webauthn.get"}"#;
        let der = sign(&signing_key, &auth_data, client_data).to_der().as_bytes().to_vec();

        let mut other_auth = auth_data;
        other_auth[36] ^= 0x01;
        assert!(matches!(
            verify_assertion(&public_key, &other_auth, client_data, &der),
            Err(PasskeyError::VerificationFailed(_))
        ));

        assert!(verify_assertion(&public_key, &auth_data, b"{}", &der).is_err());
        assert!(verify_assertion(&public_key, &auth_data, client_data, &[]).is_err());
    }

    #[test]
    fn test_import_rejects_bad_points() {
        assert!(import_verifying_key(&[0x04; 10]).is_err());
        let mut off_curve = [0u8; 65];
        off_curve[0] = 0x04;
        off_curve[64] = 0x01;
        assert!(matches!(
            import_verifying_key(&off_curve),
            Err(PasskeyError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_tokens_and_challenges() {
        let challenge = new_challenge(&OsEntropy).unwrap();
        // 32 bytes -> 43 unpadded base64url chars
        assert_eq!(challenge.len(), 43);

        let a = new_session_token(&OsEntropy).unwrap();
        let b = new_session_token(&OsEntropy).unwrap();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
