//! Passkey request/response types
//!
//! Wire shapes for the four ceremony endpoints. Binary fields are base64url
//! strings. Request members are all optional so that a missing member is
//! reported as a malformed payload instead of a JSON rejection.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credential type accepted and advertised by the relying party
pub const PUBLIC_KEY_CREDENTIAL_TYPE: &str = "public-key";

/// Relying Party entity for `navigator.credentials.create`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RelyingPartyEntity {
    #[schema(example = "example.com")]
    pub id: String,
    #[schema(example = "Passkey Admin")]
    pub name: String,
}

/// User entity for `navigator.credentials.create`
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    /// User handle, base64url
    #[schema(example = "YWRtaW4")]
    pub id: String,
    pub name: String,
    pub display_name: String,
}

/// Accepted credential algorithm
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PubKeyCredParam {
    #[serde(rename = "type")]
    #[schema(example = "public-key")]
    pub credential_type: String,
    /// COSE algorithm identifier (-7 = ES256)
    #[schema(example = -7)]
    pub alg: i64,
}

/// Options passed to `navigator.credentials.create`
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptions {
    pub rp: RelyingPartyEntity,
    pub user: UserEntity,
    /// 32 random bytes, base64url
    pub challenge: String,
    pub pub_key_cred_params: Vec<PubKeyCredParam>,
    #[schema(example = 60000)]
    pub timeout: u32,
    #[schema(example = "none")]
    pub attestation: String,
}

/// Entry of the authentication allow-list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AllowCredential {
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
}

/// Options passed to `navigator.credentials.get`
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOptions {
    pub challenge: String,
    #[schema(example = 60000)]
    pub timeout: u32,
    #[schema(example = "example.com")]
    pub rp_id: String,
    pub allow_credentials: Vec<AllowCredential>,
    #[schema(example = "preferred")]
    pub user_verification: String,
}

/// `AuthenticatorAttestationResponse` members
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    pub attestation_object: Option<String>,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Option<String>,
}

/// Registration verify request (`PublicKeyCredential` from `create`)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegistrationCredential {
    /// Credential id, base64url
    pub id: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "public-key")]
    pub credential_type: Option<String>,
    pub response: Option<AttestationResponse>,
}

/// `AuthenticatorAssertionResponse` members
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: Option<String>,
    pub authenticator_data: Option<String>,
    pub signature: Option<String>,
}

/// Authentication verify request (`PublicKeyCredential` from `get`)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AssertionCredential {
    /// Credential id, base64url
    pub id: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "public-key")]
    pub credential_type: Option<String>,
    pub response: Option<AssertionResponse>,
}

/// Successful ceremony outcome
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    #[schema(example = true)]
    pub ok: bool,
    /// 32 lowercase hex characters
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015")]
    pub token: String,
}

/// Session lookup outcome
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub ok: bool,
    /// Credential id the session was issued for
    pub credential_id: String,
}
