//! Passkey service
//!
//! Owns the typed stores and the entropy source. The ceremony operations are
//! implemented in `registration` and `authentication`.

use std::sync::Arc;

use passkey_core::{base64url_decode, EntropySource, OsEntropy};

use super::config::RelyingPartyConfig;
use super::storage::{ChallengeStore, CredentialStore, KeyValueStore, MemoryStore, SessionStore};
use crate::error::ApiError;

/// Registration, authentication and session lookup for the single credential
pub struct PasskeyService {
    pub(super) store: Arc<dyn KeyValueStore>,
    pub(super) challenges: ChallengeStore,
    pub(super) credentials: CredentialStore,
    pub(super) sessions: SessionStore,
    pub(super) entropy: Arc<dyn EntropySource>,
    pub(super) config: RelyingPartyConfig,
}

impl PasskeyService {
    /// Create a service over `store` using the OS random source
    pub fn new(store: Arc<dyn KeyValueStore>, config: RelyingPartyConfig) -> Self {
        Self::with_entropy(store, config, Arc::new(OsEntropy))
    }

    pub fn with_entropy(
        store: Arc<dyn KeyValueStore>,
        config: RelyingPartyConfig,
        entropy: Arc<dyn EntropySource>,
    ) -> Self {
        Self {
            challenges: ChallengeStore::new(store.clone(), config.challenge_ttl),
            credentials: CredentialStore::new(store.clone()),
            sessions: SessionStore::new(store.clone(), config.session_ttl),
            store,
            entropy,
            config,
        }
    }

    /// Create with in-memory storage (for testing)
    pub fn in_memory(config: RelyingPartyConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn config(&self) -> &RelyingPartyConfig {
        &self.config
    }

    /// Credential id a live session token was issued for
    pub async fn resolve_session(&self, token: &str) -> Result<Option<String>, ApiError> {
        Ok(self.sessions.resolve(token).await?)
    }

    pub(super) fn rp_id(&self, host: Option<&str>) -> Result<String, ApiError> {
        self.config
            .resolve_rp_id(host)
            .ok_or_else(|| ApiError::bad_request("Cannot determine relying party id"))
    }

    pub(super) async fn mint_session(&self, subject: &str) -> Result<String, ApiError> {
        self.sessions.issue(subject, self.entropy.as_ref()).await
    }
}

/// Decode a required base64url member, reporting `field` on failure
pub(super) fn decode_field(value: &str, field: &str) -> Result<Vec<u8>, ApiError> {
    base64url_decode(value).map_err(|_| ApiError::bad_request(format!("{field} is not valid base64url")))
}

impl std::fmt::Debug for PasskeyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasskeyService")
            .field("backend", &self.store.backend_name())
            .field("config", &self.config)
            .finish()
    }
}
