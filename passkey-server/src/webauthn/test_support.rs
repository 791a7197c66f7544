//! Software authenticator for flow tests

use ciborium::value::{Integer, Value};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use passkey_core::base64url_encode;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use super::types::{
    AssertionCredential, AssertionResponse, AttestationResponse, RegistrationCredential,
};

fn cbor(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).unwrap();
    buf
}

fn int(value: i64) -> Value {
    Value::Integer(Integer::from(value))
}

pub struct SoftAuthenticator {
    pub key: SigningKey,
    pub credential_id: Vec<u8>,
    pub sign_count: u32,
}

impl SoftAuthenticator {
    pub fn new() -> Self {
        Self {
            key: SigningKey::random(&mut OsRng),
            credential_id: b"soft-authenticator-credential".to_vec(),
            sign_count: 0,
        }
    }

    pub fn credential_id_b64(&self) -> String {
        base64url_encode(&self.credential_id)
    }

    pub fn raw_public_key(&self) -> Vec<u8> {
        self.key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    fn cose_key(&self) -> Vec<u8> {
        let point = self.key.verifying_key().to_encoded_point(false);
        cbor(&Value::Map(vec![
            (int(1), int(2)),
            (int(3), int(-7)),
            (int(-1), int(1)),
            (int(-2), Value::Bytes(point.x().unwrap().to_vec())),
            (int(-3), Value::Bytes(point.y().unwrap().to_vec())),
        ]))
    }

    fn auth_data_header(flags: u8, sign_count: u32) -> Vec<u8> {
        let mut data = Sha256::digest(b"example.com").to_vec();
        data.push(flags);
        data.extend_from_slice(&sign_count.to_be_bytes());
        data
    }

    pub fn client_data(ceremony: &str, challenge: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "type": ceremony,
            "challenge": challenge,
            "origin": "https://example.com",
            "crossOrigin": false,
        }))
        .unwrap()
    }

    pub fn attestation_object(&self) -> Vec<u8> {
        let mut auth_data = Self::auth_data_header(0x45, self.sign_count);
        auth_data.extend_from_slice(&[0u8; 16]);
        auth_data.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes());
        auth_data.extend_from_slice(&self.credential_id);
        auth_data.extend_from_slice(&self.cose_key());

        cbor(&Value::Map(vec![
            (Value::Text("fmt".into()), Value::Text("none".into())),
            (Value::Text("attStmt".into()), Value::Map(vec![])),
            (Value::Text("authData".into()), Value::Bytes(auth_data)),
        ]))
    }

    /// `create()` response answering `challenge`
    pub fn register(&self, challenge: &str) -> RegistrationCredential {
        let client_data = Self::client_data("webauthn.create", challenge);
        RegistrationCredential {
            id: Some(self.credential_id_b64()),
            credential_type: Some("public-key".into()),
            response: Some(AttestationResponse {
                attestation_object: Some(base64url_encode(&self.attestation_object())),
                client_data_json: Some(base64url_encode(&client_data)),
            }),
        }
    }

    /// `get()` response answering `challenge`; bumps the signature counter
    pub fn assert(&mut self, challenge: &str) -> AssertionCredential {
        self.sign_count += 1;
        let client_data = Self::client_data("webauthn.get", challenge);
        let auth_data = Self::auth_data_header(0x05, self.sign_count);

        let mut message = auth_data.clone();
        message.extend_from_slice(&Sha256::digest(&client_data));
        let signature: Signature = self.key.sign(&message);

        AssertionCredential {
            id: Some(self.credential_id_b64()),
            credential_type: Some("public-key".into()),
            response: Some(AssertionResponse {
                client_data_json: Some(base64url_encode(&client_data)),
                authenticator_data: Some(base64url_encode(&auth_data)),
                signature: Some(base64url_encode(signature.to_der().as_bytes())),
            }),
        }
    }
}
