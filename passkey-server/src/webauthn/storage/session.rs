//! Session tokens
//!
//! A session is a key `passkey:session:<token>` whose value is the
//! credential id it was issued for. Expiry is the only revocation.

use std::sync::Arc;
use std::time::Duration;

use passkey_core::crypto::{new_session_token, SESSION_TOKEN_LEN};
use passkey_core::EntropySource;

use super::{session_key, KeyValueStore, PutOptions, StorageError};
use crate::error::ApiError;

/// Typed access to session keys
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

/// Tokens are lowercase hex; anything else cannot have been minted here.
fn is_well_formed(token: &str) -> bool {
    token.len() == SESSION_TOKEN_LEN * 2
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Mint a token for `subject` and persist it with the session TTL
    pub async fn issue(
        &self,
        subject: &str,
        entropy: &dyn EntropySource,
    ) -> Result<String, ApiError> {
        let token = new_session_token(entropy)?;
        self.store
            .put(
                &session_key(&token),
                subject.as_bytes().to_vec(),
                PutOptions::with_ttl(self.ttl),
            )
            .await?;
        Ok(token)
    }

    /// Subject of a live session, or `None` for unknown, expired or malformed tokens
    pub async fn resolve(&self, token: &str) -> Result<Option<String>, StorageError> {
        if !is_well_formed(token) {
            return Ok(None);
        }
        match self.store.get(&session_key(token)).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::Serialization("session subject is not UTF-8".into())),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("backend", &self.store.backend_name())
            .field("ttl", &self.ttl)
            .finish()
    }
}
