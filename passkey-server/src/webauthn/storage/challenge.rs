//! Challenge slots
//!
//! Each ceremony has exactly one slot. Issuing a challenge overwrites the
//! slot, so only the most recently issued challenge can be redeemed.

use std::sync::Arc;
use std::time::Duration;

use super::{KeyValueStore, PutOptions, StorageError, AUTH_CHALLENGE_KEY, REGISTER_CHALLENGE_KEY};

/// Ceremony a challenge was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengePurpose {
    Register,
    Auth,
}

impl ChallengePurpose {
    pub fn key(self) -> &'static str {
        match self {
            Self::Register => REGISTER_CHALLENGE_KEY,
            Self::Auth => AUTH_CHALLENGE_KEY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Auth => "auth",
        }
    }
}

/// Typed access to the challenge slots
#[derive(Clone)]
pub struct ChallengeStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ChallengeStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Store `challenge` as the live value for `purpose`.
    ///
    /// Returns the value it replaced, if one was still live.
    pub async fn issue(
        &self,
        purpose: ChallengePurpose,
        challenge: &str,
    ) -> Result<Option<String>, StorageError> {
        let previous = self.current(purpose).await?;
        self.store
            .put(
                purpose.key(),
                challenge.as_bytes().to_vec(),
                PutOptions::with_ttl(self.ttl),
            )
            .await?;

        if previous.is_some() {
            tracing::debug!(purpose = purpose.as_str(), "Replaced pending challenge");
        }
        Ok(previous)
    }

    /// Live challenge for `purpose`. Empty values count as absent.
    pub async fn current(&self, purpose: ChallengePurpose) -> Result<Option<String>, StorageError> {
        let Some(bytes) = self.store.get(purpose.key()).await? else {
            return Ok(None);
        };
        let value = String::from_utf8(bytes).map_err(|_| {
            StorageError::Serialization(format!("{} challenge is not UTF-8", purpose.as_str()))
        })?;
        Ok(Some(value).filter(|v| !v.is_empty()))
    }

    /// Invalidate the slot for `purpose`
    pub async fn clear(&self, purpose: ChallengePurpose) -> Result<(), StorageError> {
        self.store.delete(purpose.key()).await
    }
}

impl std::fmt::Debug for ChallengeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeStore")
            .field("backend", &self.store.backend_name())
            .field("ttl", &self.ttl)
            .finish()
    }
}
