use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::memory::MemoryStore;
use crate::shared::AppError;

/// Revoked bearer tokens, keyed by their SHA-256 digest
#[async_trait]
pub trait TokenBlacklistRepository {
    async fn revoke(&self, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AppError>;
    async fn is_revoked(&self, token_hash: &str) -> Result<bool, AppError>;
}

pub struct InMemoryTokenBlacklistRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryTokenBlacklistRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TokenBlacklistRepository for InMemoryTokenBlacklistRepository {
    #[instrument(skip(self, token_hash))]
    async fn revoke(&self, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let mut tables = self.store.tables()?;
        tables
            .blacklisted_tokens
            .insert(token_hash.to_string(), expires_at);
        debug!("Token revoked in memory");
        Ok(())
    }

    #[instrument(skip(self, token_hash))]
    async fn is_revoked(&self, token_hash: &str) -> Result<bool, AppError> {
        let tables = self.store.tables()?;
        Ok(tables.blacklisted_tokens.contains_key(token_hash))
    }
}

/// MySQL implementation of the token blacklist
pub struct MySqlTokenBlacklistRepository {
    pool: MySqlPool,
}

impl MySqlTokenBlacklistRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklistRepository for MySqlTokenBlacklistRepository {
    #[instrument(skip(self, token_hash))]
    async fn revoke(&self, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO blacklisted_tokens (token_hash, expires_at) VALUES (?, ?)
             ON DUPLICATE KEY UPDATE expires_at = VALUES(expires_at)",
        )
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to revoke token");
            AppError::from(e)
        })?;

        debug!("Token revoked in database");
        Ok(())
    }

    #[instrument(skip(self, token_hash))]
    async fn is_revoked(&self, token_hash: &str) -> Result<bool, AppError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT token_hash FROM blacklisted_tokens WHERE token_hash = ?")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_revoke_and_check() {
        let repo = InMemoryTokenBlacklistRepository::new(Arc::new(MemoryStore::new()));

        assert!(!repo.is_revoked("digest-a").await.unwrap());

        repo.revoke("digest-a", Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        assert!(repo.is_revoked("digest-a").await.unwrap());
        assert!(!repo.is_revoked("digest-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_twice_is_harmless() {
        let repo = InMemoryTokenBlacklistRepository::new(Arc::new(MemoryStore::new()));
        let exp = Utc::now() + Duration::hours(1);
        repo.revoke("digest", exp).await.unwrap();
        repo.revoke("digest", exp).await.unwrap();
        assert!(repo.is_revoked("digest").await.unwrap());
    }
}
