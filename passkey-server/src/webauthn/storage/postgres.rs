//! PostgreSQL key-value backend
//!
//! Rows live in `passkey_kv`. Expired rows are filtered out on read and
//! removed opportunistically on write.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{KeyValueStore, PutOptions, StorageError};

/// PostgreSQL-backed key-value storage
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect with a bounded pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        tracing::info!(max_connections, "Connected to PostgreSQL database");
        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;

        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Delete every expired row, returning how many were removed
    pub async fn purge_expired(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM passkey_kv WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

fn expiry_from(options: PutOptions) -> Result<Option<DateTime<Utc>>, StorageError> {
    options
        .ttl
        .map(|ttl| {
            chrono::Duration::from_std(ttl)
                .map(|ttl| Utc::now() + ttl)
                .map_err(|e| StorageError::Serialization(format!("TTL out of range: {e}")))
        })
        .transpose()
}

#[async_trait]
impl KeyValueStore for PostgresStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        sqlx::query_scalar::<_, Vec<u8>>(
            r#"
            SELECT value
            FROM passkey_kv
            WHERE key = $1 AND (expires_at IS NULL OR expires_at > NOW())
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))
    }

    async fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        options: PutOptions,
    ) -> Result<(), StorageError> {
        let expires_at = expiry_from(options)?;

        sqlx::query(
            r#"
            INSERT INTO passkey_kv (key, value, expires_at, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                expires_at = EXCLUDED.expires_at,
                updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(&value)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        // Session keys accumulate; sweep what has lapsed
        if let Err(e) = self.purge_expired().await {
            tracing::warn!(error = %e, "Failed to purge expired passkey rows");
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM passkey_kv WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;
        Ok(())
    }

    async fn check_health(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("pool", &"<PgPool>")
            .finish()
    }
}
