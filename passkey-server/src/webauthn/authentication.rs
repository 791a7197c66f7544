//! Authentication ceremony
//!
//! `start_authentication` issues the auth challenge for the registered
//! credential. `verify_authentication` checks an assertion signature with the
//! stored public key and opens a session.

use passkey_core::crypto::{new_challenge, verify_assertion};
use passkey_core::{AuthenticatorData, CeremonyType, CollectedClientData};

use super::service::{decode_field, PasskeyService};
use super::storage::{ChallengePurpose, CredentialRecord};
use super::types::{
    AllowCredential, AssertionCredential, AuthenticationOptions, SessionResponse,
    PUBLIC_KEY_CREDENTIAL_TYPE,
};
use crate::error::ApiError;

/// Assertion payload with every required member present
struct AssertionPayload {
    id: Option<String>,
    client_data_json: String,
    authenticator_data: String,
    signature: String,
}

impl TryFrom<AssertionCredential> for AssertionPayload {
    type Error = ApiError;

    fn try_from(credential: AssertionCredential) -> Result<Self, Self::Error> {
        let malformed = || ApiError::bad_request("Malformed assertion payload");

        if credential.credential_type.as_deref() != Some(PUBLIC_KEY_CREDENTIAL_TYPE) {
            return Err(malformed());
        }
        let response = credential.response.ok_or_else(malformed)?;
        let required = |value: Option<String>| value.filter(|v| !v.is_empty()).ok_or_else(malformed);

        Ok(Self {
            id: credential.id,
            client_data_json: required(response.client_data_json)?,
            authenticator_data: required(response.authenticator_data)?,
            signature: required(response.signature)?,
        })
    }
}

impl PasskeyService {
    /// Issue an auth challenge and build `get()` options for the stored credential
    pub async fn start_authentication(
        &self,
        host: Option<&str>,
    ) -> Result<AuthenticationOptions, ApiError> {
        let credential = self
            .credentials
            .load()
            .await?
            .ok_or_else(|| ApiError::not_found("No passkey registered"))?;
        let rp_id = self.rp_id(host)?;

        let challenge = new_challenge(self.entropy.as_ref())?;
        self.challenges.issue(ChallengePurpose::Auth, &challenge).await?;

        tracing::info!(credential_id = %credential.id, "Passkey authentication started");

        Ok(AuthenticationOptions {
            challenge,
            timeout: self.config.timeout_ms,
            rp_id,
            allow_credentials: vec![AllowCredential {
                id: credential.id,
                credential_type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            }],
            user_verification: "preferred".to_string(),
        })
    }

    /// Verify a `get()` assertion against the stored credential.
    ///
    /// The auth challenge is invalidated once the signature has been checked,
    /// whatever the outcome. A client data mismatch leaves it in place.
    pub async fn verify_authentication(
        &self,
        assertion: AssertionCredential,
    ) -> Result<SessionResponse, ApiError> {
        let credential = self
            .credentials
            .load()
            .await?
            .ok_or_else(|| ApiError::unauthorized("Credential missing"))?;

        let payload = AssertionPayload::try_from(assertion)?;

        let expected = self
            .challenges
            .current(ChallengePurpose::Auth)
            .await?
            .ok_or_else(|| ApiError::unauthorized("challenge expired"))?;

        let client_data_json = decode_field(&payload.client_data_json, "clientDataJSON")?;
        let client_data = CollectedClientData::from_json(&client_data_json)
            .map_err(|_| ApiError::bad_request("clientDataJSON is not valid JSON"))?;
        if !client_data.matches(CeremonyType::Get, &expected) {
            return Err(ApiError::unauthorized("Invalid authentication response"));
        }

        let authenticator_data = decode_field(&payload.authenticator_data, "authenticatorData")?;
        let signature = decode_field(&payload.signature, "signature")?;

        if payload.id.as_deref() != Some(credential.id.as_str()) {
            tracing::warn!(
                credential_id = %credential.id,
                presented_id = ?payload.id,
                "Assertion id differs from stored credential"
            );
        }

        let outcome = verify_assertion(
            &credential.public_key,
            &authenticator_data,
            &client_data_json,
            &signature,
        );
        self.challenges.clear(ChallengePurpose::Auth).await?;

        if let Err(e) = outcome {
            tracing::warn!(credential_id = %credential.id, error = %e, "Assertion rejected");
            return Err(ApiError::unauthorized("signature verification failed"));
        }

        self.record_sign_count(&credential, &authenticator_data).await?;

        let token = self.mint_session(&credential.id).await?;
        tracing::info!(credential_id = %credential.id, "Passkey authentication succeeded");

        Ok(SessionResponse { ok: true, token })
    }

    /// Store the counter reported by a verified assertion. Not checked for monotonicity.
    async fn record_sign_count(
        &self,
        credential: &CredentialRecord,
        authenticator_data: &[u8],
    ) -> Result<(), ApiError> {
        let sign_count = match AuthenticatorData::parse(authenticator_data) {
            Ok(parsed) => parsed.sign_count,
            Err(e) => {
                tracing::warn!(error = %e, "Verified assertion has unparseable authenticator data");
                return Ok(());
            }
        };

        if sign_count != credential.sign_count {
            tracing::debug!(
                credential_id = %credential.id,
                previous = credential.sign_count,
                current = sign_count,
                "Updating sign count"
            );
            self.credentials
                .save(&CredentialRecord {
                    sign_count,
                    ..credential.clone()
                })
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webauthn::config::RelyingPartyConfig;
    use crate::webauthn::storage::AUTH_CHALLENGE_KEY;
    use crate::webauthn::test_support::SoftAuthenticator;
    use axum::http::StatusCode;
    use passkey_core::{base64url_decode, base64url_encode};

    async fn registered() -> (PasskeyService, SoftAuthenticator) {
        let service = PasskeyService::in_memory(RelyingPartyConfig::default());
        let authenticator = SoftAuthenticator::new();
        let options = service.start_registration(Some("example.com")).await.unwrap();
        service
            .verify_registration(authenticator.register(&options.challenge))
            .await
            .unwrap();
        (service, authenticator)
    }

    fn flip_signature_bit(assertion: &mut AssertionCredential) {
        let response = assertion.response.as_mut().unwrap();
        let mut signature = base64url_decode(response.signature.as_ref().unwrap()).unwrap();
        let last = signature.len() - 1;
        signature[last] ^= 0x01;
        response.signature = Some(base64url_encode(&signature));
    }

    #[tokio::test]
    async fn test_start_authentication_requires_credential() {
        let service = PasskeyService::in_memory(RelyingPartyConfig::default());
        let err = service
            .start_authentication(Some("example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(service.store().get(AUTH_CHALLENGE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_start_authentication_options() {
        let (service, authenticator) = registered().await;
        let options = service
            .start_authentication(Some("example.com"))
            .await
            .unwrap();

        assert_eq!(options.rp_id, "example.com");
        assert_eq!(options.allow_credentials.len(), 1);
        assert_eq!(options.allow_credentials[0].id, authenticator.credential_id_b64());
        assert_eq!(options.user_verification, "preferred");
        assert_eq!(options.challenge.len(), 43);
    }

    #[tokio::test]
    async fn test_authenticate_issues_session_and_updates_counter() {
        let (service, mut authenticator) = registered().await;
        let options = service.start_authentication(None).await;
        // No host and no configured RP id
        assert!(options.is_err());

        let options = service
            .start_authentication(Some("example.com"))
            .await
            .unwrap();
        let session = service
            .verify_authentication(authenticator.assert(&options.challenge))
            .await
            .unwrap();

        assert!(session.ok);
        assert_eq!(
            service.resolve_session(&session.token).await.unwrap(),
            Some(authenticator.credential_id_b64())
        );
        let record = service.credentials.load().await.unwrap().unwrap();
        assert_eq!(record.sign_count, authenticator.sign_count);

        // The challenge was consumed
        let err = service
            .verify_authentication(authenticator.assert(&options.challenge))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "challenge expired"));
    }

    #[tokio::test]
    async fn test_flipped_signature_bit_is_rejected_and_consumes_challenge() {
        let (service, mut authenticator) = registered().await;
        let options = service
            .start_authentication(Some("example.com"))
            .await
            .unwrap();

        let mut assertion = authenticator.assert(&options.challenge);
        flip_signature_bit(&mut assertion);

        let err = service.verify_authentication(assertion).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "signature verification failed"));
        assert!(service.store().get(AUTH_CHALLENGE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_client_data_mismatch_keeps_challenge() {
        let (service, mut authenticator) = registered().await;
        let options = service
            .start_authentication(Some("example.com"))
            .await
            .unwrap();

        let err = service
            .verify_authentication(authenticator.assert("some-other-challenge"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        service
            .verify_authentication(authenticator.assert(&options.challenge))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_verify_without_credential_is_unauthorized() {
        let service = PasskeyService::in_memory(RelyingPartyConfig::default());
        let mut authenticator = SoftAuthenticator::new();
        let err = service
            .verify_authentication(authenticator.assert("c"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_assertion_is_bad_request() {
        let (service, mut authenticator) = registered().await;
        let options = service
            .start_authentication(Some("example.com"))
            .await
            .unwrap();

        let mut assertion = authenticator.assert(&options.challenge);
        assertion.response.as_mut().unwrap().signature = None;
        let err = service.verify_authentication(assertion).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let mut assertion = authenticator.assert(&options.challenge);
        assertion.credential_type = None;
        let err = service.verify_authentication(assertion).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_key_cannot_authenticate() {
        let (service, _) = registered().await;
        let mut impostor = SoftAuthenticator::new();
        let options = service
            .start_authentication(Some("example.com"))
            .await
            .unwrap();

        let err = service
            .verify_authentication(impostor.assert(&options.challenge))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "signature verification failed"));
    }
}
