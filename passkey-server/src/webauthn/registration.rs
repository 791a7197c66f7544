//! Registration ceremony
//!
//! `start_registration` issues the register challenge. `verify_registration`
//! checks the browser's attestation against it, stores the credential and
//! opens a session.

use passkey_core::crypto::{import_verifying_key, new_challenge};
use passkey_core::{
    base64url_encode, to_raw_ec_key, AttestationObject, CeremonyType, CollectedClientData,
    COSE_ALG_ES256,
};

use super::service::{decode_field, PasskeyService};
use super::storage::{ChallengePurpose, CredentialRecord};
use super::types::{
    PubKeyCredParam, RegistrationCredential, RegistrationOptions, RelyingPartyEntity,
    SessionResponse, UserEntity, PUBLIC_KEY_CREDENTIAL_TYPE,
};
use crate::error::ApiError;

/// Registration payload with every required member present
struct RegistrationPayload {
    id: String,
    attestation_object: String,
    client_data_json: String,
}

impl TryFrom<RegistrationCredential> for RegistrationPayload {
    type Error = ApiError;

    fn try_from(credential: RegistrationCredential) -> Result<Self, Self::Error> {
        let malformed = || ApiError::bad_request("Malformed registration payload");

        if credential.credential_type.as_deref() != Some(PUBLIC_KEY_CREDENTIAL_TYPE) {
            return Err(malformed());
        }
        let id = credential.id.filter(|id| !id.is_empty()).ok_or_else(malformed)?;
        let response = credential.response.ok_or_else(malformed)?;

        Ok(Self {
            id,
            attestation_object: response
                .attestation_object
                .filter(|v| !v.is_empty())
                .ok_or_else(malformed)?,
            client_data_json: response
                .client_data_json
                .filter(|v| !v.is_empty())
                .ok_or_else(malformed)?,
        })
    }
}

impl PasskeyService {
    /// Issue a register challenge and build `create()` options.
    ///
    /// Any earlier register challenge stops being redeemable.
    pub async fn start_registration(
        &self,
        host: Option<&str>,
    ) -> Result<RegistrationOptions, ApiError> {
        let rp_id = self.rp_id(host)?;
        let challenge = new_challenge(self.entropy.as_ref())?;
        self.challenges
            .issue(ChallengePurpose::Register, &challenge)
            .await?;

        tracing::info!(rp_id = %rp_id, "Passkey registration started");

        Ok(RegistrationOptions {
            rp: RelyingPartyEntity {
                id: rp_id,
                name: self.config.rp_name.clone(),
            },
            user: UserEntity {
                id: base64url_encode(self.config.user_id.as_bytes()),
                name: self.config.user_name.clone(),
                display_name: self.config.user_name.clone(),
            },
            challenge,
            pub_key_cred_params: vec![PubKeyCredParam {
                credential_type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
                alg: COSE_ALG_ES256,
            }],
            timeout: self.config.timeout_ms,
            attestation: "none".to_string(),
        })
    }

    /// Verify a `create()` response and register its credential.
    ///
    /// Replaces any previously registered credential. On success the register
    /// challenge is consumed and a new session token is returned.
    pub async fn verify_registration(
        &self,
        credential: RegistrationCredential,
    ) -> Result<SessionResponse, ApiError> {
        let payload = RegistrationPayload::try_from(credential)?;

        let expected = self
            .challenges
            .current(ChallengePurpose::Register)
            .await?
            .ok_or_else(|| ApiError::unauthorized("challenge expired"))?;

        let client_data_json = decode_field(&payload.client_data_json, "clientDataJSON")?;
        let client_data = CollectedClientData::from_json(&client_data_json)
            .map_err(|_| ApiError::bad_request("clientDataJSON is not valid JSON"))?;
        if !client_data.matches(CeremonyType::Create, &expected) {
            return Err(ApiError::unauthorized("Invalid registration response"));
        }

        let attestation_bytes = decode_field(&payload.attestation_object, "attestationObject")?;
        let attestation = AttestationObject::from_cbor(&attestation_bytes)?;
        let auth_data = attestation.authenticator_data()?;
        let cose_key = auth_data
            .credential_public_key()
            .ok_or_else(|| ApiError::bad_request("Attested credential data missing"))?;
        let public_key = to_raw_ec_key(cose_key)?;
        import_verifying_key(&public_key)?;

        if let Some(attested_id) = auth_data.credential_id() {
            if base64url_encode(attested_id) != payload.id.trim_end_matches('=') {
                tracing::warn!(
                    credential_id = %payload.id,
                    "Payload id differs from attested credential id"
                );
            }
        }

        let record = CredentialRecord {
            id: payload.id,
            public_key,
            sign_count: auth_data.sign_count,
        };
        self.credentials.save(&record).await?;
        self.challenges.clear(ChallengePurpose::Register).await?;

        let token = self.mint_session(&record.id).await?;

        tracing::info!(
            credential_id = %record.id,
            fmt = %attestation.fmt,
            sign_count = record.sign_count,
            "Passkey registered"
        );

        Ok(SessionResponse { ok: true, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::webauthn::config::RelyingPartyConfig;
    use crate::webauthn::storage::REGISTER_CHALLENGE_KEY;
    use crate::webauthn::test_support::SoftAuthenticator;
    use crate::webauthn::types::AttestationResponse;
    use axum::http::StatusCode;

    fn service() -> PasskeyService {
        PasskeyService::in_memory(RelyingPartyConfig::default())
    }

    #[tokio::test]
    async fn test_start_registration_options() {
        let service = service();
        let options = service
            .start_registration(Some("example.com:8443"))
            .await
            .unwrap();

        assert_eq!(options.rp.id, "example.com");
        assert_eq!(options.rp.name, "Passkey Admin");
        assert_eq!(options.user.id, "YWRtaW4");
        assert_eq!(options.challenge.len(), 43);
        assert_eq!(options.pub_key_cred_params[0].alg, -7);
        assert_eq!(options.timeout, 60_000);
        assert_eq!(options.attestation, "none");

        let stored = service.store().get(REGISTER_CHALLENGE_KEY).await.unwrap();
        assert_eq!(stored, Some(options.challenge.into_bytes()));
    }

    #[tokio::test]
    async fn test_start_registration_without_rp_id() {
        let err = service().start_registration(None).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_stores_credential_and_consumes_challenge() {
        let service = service();
        let authenticator = SoftAuthenticator::new();
        let options = service.start_registration(Some("example.com")).await.unwrap();

        let session = service
            .verify_registration(authenticator.register(&options.challenge))
            .await
            .unwrap();
        assert!(session.ok);
        assert_eq!(session.token.len(), 32);

        let record = service.credentials.load().await.unwrap().unwrap();
        assert_eq!(record.id, authenticator.credential_id_b64());
        assert_eq!(record.public_key.to_vec(), authenticator.raw_public_key());

        assert_eq!(
            service.resolve_session(&session.token).await.unwrap(),
            Some(record.id)
        );

        // Replay of the same response finds no challenge
        let err = service
            .verify_registration(authenticator.register(&options.challenge))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "challenge expired"));
    }

    #[tokio::test]
    async fn test_superseded_challenge_is_rejected() {
        let service = service();
        let authenticator = SoftAuthenticator::new();
        let first = service.start_registration(Some("example.com")).await.unwrap();
        let second = service.start_registration(Some("example.com")).await.unwrap();
        assert_ne!(first.challenge, second.challenge);

        let err = service
            .verify_registration(authenticator.register(&first.challenge))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        // A mismatch leaves the live challenge in place
        service
            .verify_registration(authenticator.register(&second.challenge))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wrong_ceremony_type_is_unauthorized() {
        let service = service();
        let authenticator = SoftAuthenticator::new();
        let options = service.start_registration(Some("example.com")).await.unwrap();

        let mut credential = authenticator.register(&options.challenge);
        let client_data = SoftAuthenticator::client_data("webauthn.get", &options.challenge);
        credential.response.as_mut().unwrap().client_data_json =
            Some(base64url_encode(&client_data));

        let err = service.verify_registration(credential).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_payloads_are_bad_requests() {
        let service = service();
        let authenticator = SoftAuthenticator::new();
        let options = service.start_registration(Some("example.com")).await.unwrap();

        let mut wrong_type = authenticator.register(&options.challenge);
        wrong_type.credential_type = Some("password".into());

        let mut missing_attestation = authenticator.register(&options.challenge);
        missing_attestation.response = Some(AttestationResponse {
            attestation_object: None,
            ..missing_attestation.response.unwrap()
        });

        let mut missing_id = authenticator.register(&options.challenge);
        missing_id.id = None;

        for credential in [wrong_type, missing_attestation, missing_id] {
            let err = service.verify_registration(credential).await.unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_missing_challenge_checked_before_contents() {
        let service = service();
        let authenticator = SoftAuthenticator::new();
        let err = service
            .verify_registration(authenticator.register("never-issued"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "challenge expired"));
    }

    #[tokio::test]
    async fn test_attestation_without_credential_is_bad_request() {
        let service = service();
        let authenticator = SoftAuthenticator::new();
        let options = service.start_registration(Some("example.com")).await.unwrap();

        // authData header only, AT flag clear
        let mut auth_data = vec![0u8; 32];
        auth_data.push(0x01);
        auth_data.extend_from_slice(&0u32.to_be_bytes());
        let mut attestation = Vec::new();
        ciborium::into_writer(
            &ciborium::value::Value::Map(vec![
                ("fmt".into(), "none".into()),
                (
                    "attStmt".into(),
                    ciborium::value::Value::Map(vec![]),
                ),
                ("authData".into(), ciborium::value::Value::Bytes(auth_data)),
            ]),
            &mut attestation,
        )
        .unwrap();

        let mut credential = authenticator.register(&options.challenge);
        credential.response.as_mut().unwrap().attestation_object =
            Some(base64url_encode(&attestation));

        let err = service.verify_registration(credential).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(service.credentials.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_garbage_attestation_is_bad_request() {
        let service = service();
        let authenticator = SoftAuthenticator::new();
        let options = service.start_registration(Some("example.com")).await.unwrap();

        let mut credential = authenticator.register(&options.challenge);
        credential.response.as_mut().unwrap().attestation_object =
            Some(base64url_encode(&[0xa1, 0x63, b'f', b'm']));

        let err = service.verify_registration(credential).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
