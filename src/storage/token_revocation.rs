//! Token denylist
//!
//! Admin tokens are stateless, so the only way to kill one before its `exp`
//! is to remember its `jti` here. Entries only need to live as long as the
//! token itself; after that the signature check rejects it on its own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;

/// Information about a revoked token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedToken {
    /// JWT ID (jti)
    pub token_id: String,
    /// Admin who owned the token
    pub user_id: String,
    pub revoked_at: DateTime<Utc>,
    /// When the original token expires (for cleanup)
    pub expires_at: DateTime<Utc>,
    pub reason: RevocationReason,
}

/// Reason for token revocation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RevocationReason {
    /// Admin logged out
    UserLogout,
    /// Admin changed their password
    CredentialChange,
}

/// Token revocation storage trait
#[async_trait]
pub trait TokenRevocationStore: Send + Sync {
    /// Add a token to the revocation list
    async fn revoke_token(&self, revoked_token: RevokedToken) -> Result<()>;

    /// Check if a token is revoked
    async fn is_token_revoked(&self, token_id: &str) -> Result<bool>;

    /// Drop entries whose token has expired. Returns how many were removed.
    async fn cleanup_expired_revocations(&self) -> Result<usize>;

    /// Number of entries currently held
    async fn revoked_count(&self) -> Result<usize>;
}

/// In-memory implementation of token revocation store
pub struct MemoryTokenRevocationStore {
    revoked_tokens: RwLock<HashMap<String, RevokedToken>>,
}

impl MemoryTokenRevocationStore {
    pub fn new() -> Self {
        Self {
            revoked_tokens: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryTokenRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRevocationStore for MemoryTokenRevocationStore {
    async fn revoke_token(&self, revoked_token: RevokedToken) -> Result<()> {
        log::info!(
            "Token revoked for admin {} ({:?})",
            revoked_token.user_id,
            revoked_token.reason
        );
        self.revoked_tokens
            .write()
            .await
            .insert(revoked_token.token_id.clone(), revoked_token);
        Ok(())
    }

    async fn is_token_revoked(&self, token_id: &str) -> Result<bool> {
        Ok(self.revoked_tokens.read().await.contains_key(token_id))
    }

    async fn cleanup_expired_revocations(&self) -> Result<usize> {
        let now = Utc::now();
        let mut revoked_tokens = self.revoked_tokens.write().await;
        let before = revoked_tokens.len();
        revoked_tokens.retain(|_, token| token.expires_at >= now);
        let removed = before - revoked_tokens.len();

        if removed > 0 {
            log::info!("Cleaned up {} expired token revocations", removed);
        }
        Ok(removed)
    }

    async fn revoked_count(&self) -> Result<usize> {
        Ok(self.revoked_tokens.read().await.len())
    }
}

/// Shared reference to token revocation store
pub type SharedTokenRevocationStore = Arc<dyn TokenRevocationStore>;

/// Create a new memory-based token revocation store
pub fn create_memory_revocation_store() -> SharedTokenRevocationStore {
    Arc::new(MemoryTokenRevocationStore::new())
}

/// Start the hourly purge of expired entries
pub fn start_cleanup_task(store: SharedTokenRevocationStore) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            if let Err(e) = store.cleanup_expired_revocations().await {
                log::error!("Failed to cleanup expired token revocations: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn revoked(token_id: &str, expires_in: Duration) -> RevokedToken {
        RevokedToken {
            token_id: token_id.to_string(),
            user_id: "admin-1".to_string(),
            revoked_at: Utc::now(),
            expires_at: Utc::now() + expires_in,
            reason: RevocationReason::UserLogout,
        }
    }

    #[tokio::test]
    async fn test_token_revocation() {
        let store = MemoryTokenRevocationStore::new();
        store.revoke_token(revoked("jti-1", Duration::hours(24))).await.unwrap();

        assert!(store.is_token_revoked("jti-1").await.unwrap());
        assert!(!store.is_token_revoked("jti-2").await.unwrap());
        assert_eq!(store.revoked_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_expired_revocations() {
        let store = MemoryTokenRevocationStore::new();
        store.revoke_token(revoked("expired", Duration::hours(-1))).await.unwrap();
        store.revoke_token(revoked("live", Duration::hours(1))).await.unwrap();

        assert_eq!(store.cleanup_expired_revocations().await.unwrap(), 1);
        assert!(!store.is_token_revoked("expired").await.unwrap());
        assert!(store.is_token_revoked("live").await.unwrap());
    }
}
