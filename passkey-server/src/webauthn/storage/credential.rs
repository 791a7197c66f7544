//! Single credential slot
//!
//! The record is stored as JSON with the public key base64url-encoded:
//! `{"id": "...", "publicKey": "...", "signCount": 0}`.

use std::sync::Arc;

use passkey_core::{base64url_decode, base64url_encode, RAW_EC_KEY_LEN};
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, PutOptions, StorageError, CREDENTIAL_KEY};

/// The registered credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Credential id as sent by the browser (base64url)
    pub id: String,
    /// Uncompressed P-256 point: `0x04 || x || y`
    pub public_key: [u8; RAW_EC_KEY_LEN],
    pub sign_count: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    id: String,
    public_key: String,
    #[serde(default)]
    sign_count: u32,
}

impl CredentialRecord {
    fn to_json(&self) -> Result<Vec<u8>, StorageError> {
        serde_json::to_vec(&StoredCredential {
            id: self.id.clone(),
            public_key: base64url_encode(&self.public_key),
            sign_count: self.sign_count,
        })
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn from_json(bytes: &[u8]) -> Result<Self, StorageError> {
        let stored: StoredCredential = serde_json::from_slice(bytes)
            .map_err(|e| StorageError::Serialization(format!("credential record: {e}")))?;

        let raw = base64url_decode(&stored.public_key)
            .map_err(|e| StorageError::Serialization(format!("credential public key: {e}")))?;
        let public_key: [u8; RAW_EC_KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
            StorageError::Serialization(format!(
                "credential public key is {} bytes, expected {}",
                raw.len(),
                RAW_EC_KEY_LEN
            ))
        })?;

        Ok(Self {
            id: stored.id,
            public_key,
            sign_count: stored.sign_count,
        })
    }
}

/// Typed access to the credential slot
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Option<CredentialRecord>, StorageError> {
        match self.store.get(CREDENTIAL_KEY).await? {
            Some(bytes) => CredentialRecord::from_json(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Persist `record`, replacing any existing credential. Never expires.
    pub async fn save(&self, record: &CredentialRecord) -> Result<(), StorageError> {
        self.store
            .put(CREDENTIAL_KEY, record.to_json()?, PutOptions::default())
            .await
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webauthn::storage::MemoryStore;

    fn record(id: &str, fill: u8) -> CredentialRecord {
        let mut public_key = [fill; RAW_EC_KEY_LEN];
        public_key[0] = 0x04;
        CredentialRecord {
            id: id.to_string(),
            public_key,
            sign_count: 3,
        }
    }

    #[tokio::test]
    async fn test_save_load_overwrite() {
        let store = CredentialStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.load().await.unwrap(), None);

        store.save(&record("first", 1)).await.unwrap();
        store.save(&record("second", 2)).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(record("second", 2)));
    }

    #[tokio::test]
    async fn test_stored_layout() {
        let memory = Arc::new(MemoryStore::new());
        let store = CredentialStore::new(memory.clone());
        store.save(&record("cred", 7)).await.unwrap();

        let raw = memory.get(CREDENTIAL_KEY).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json["id"], "cred");
        assert_eq!(json["signCount"], 3);
        assert_eq!(json["publicKey"].as_str().unwrap().len(), 87);
    }

    #[tokio::test]
    async fn test_wrong_key_length_is_rejected() {
        let memory = Arc::new(MemoryStore::new());
        let body = serde_json::json!({
            "id": "cred",
            "publicKey": base64url_encode(&[0x04; 33]),
            "signCount": 0,
        });
        memory
            .put(CREDENTIAL_KEY, body.to_string().into_bytes(), PutOptions::default())
            .await
            .unwrap();

        let store = CredentialStore::new(memory);
        assert!(matches!(
            store.load().await,
            Err(StorageError::Serialization(_))
        ));
    }
}
