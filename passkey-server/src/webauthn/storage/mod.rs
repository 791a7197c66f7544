//! Passkey storage module
//!
//! All flow state lives behind the [`KeyValueStore`] trait:
//! - **Challenges**: one live value per purpose, expiring after the challenge TTL.
//! - **Credential**: a single record, overwritten by every successful registration.
//! - **Sessions**: one key per token, expiring after the session TTL.
//!
//! Two backends are provided. [`MemoryStore`] keeps everything in a `DashMap`
//! (development and tests, lost on restart). [`PostgresStore`] persists to the
//! `passkey_kv` table.

mod challenge;
mod credential;
mod memory;
mod postgres;
mod session;

pub use challenge::{ChallengePurpose, ChallengeStore};
pub use credential::{CredentialRecord, CredentialStore};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use session::SessionStore;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Config, StoreBackend};

/// Key holding the single credential record.
pub const CREDENTIAL_KEY: &str = "passkey:credential";

/// Key holding the pending registration challenge.
pub const REGISTER_CHALLENGE_KEY: &str = "passkey:challenge:register";

/// Key holding the pending authentication challenge.
pub const AUTH_CHALLENGE_KEY: &str = "passkey:challenge:auth";

const SESSION_KEY_PREFIX: &str = "passkey:session:";

/// How often the memory backend sweeps expired entries
const MEMORY_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Key holding the subject of a session token.
pub fn session_key(token: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{token}")
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store not configured: {0}")]
    NotConfigured(String),
}

/// Options for [`KeyValueStore::put`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Entry lifetime; `None` keeps the entry until it is overwritten or deleted.
    pub ttl: Option<Duration>,
}

impl PutOptions {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

/// Byte-oriented key-value store with optional per-entry expiry.
///
/// Expired entries must never be returned by `get`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    async fn put(&self, key: &str, value: Vec<u8>, options: PutOptions)
        -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check backend health (always Ok for in-process backends)
    async fn check_health(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Backend name for logs and readiness output
    fn backend_name(&self) -> &'static str;
}

/// Open the store selected by the server configuration.
pub async fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory passkey storage - data will be lost on restart!");
            let store = Arc::new(MemoryStore::new());
            memory::spawn_purge_task(Arc::downgrade(&store), MEMORY_PURGE_INTERVAL);
            Ok(store)
        }
        StoreBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                StorageError::NotConfigured("PASSKEY_STORE=postgres requires DATABASE_URL".into())
            })?;
            tracing::info!("Using PostgreSQL passkey storage");
            let store = PostgresStore::connect(url, config.database_max_connections).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}
