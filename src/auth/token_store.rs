use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::MagicLinkToken;

/// Storage port for outstanding magic-link tokens, keyed by token value.
///
/// `take` is the linearization point for single use: it removes and
/// returns the entry in one step, so two concurrent verifications of the
/// same token can never both observe it.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: MagicLinkToken);
    async fn take(&self, token: &str) -> Option<MagicLinkToken>;
    async fn purge_expired(&self, now: DateTime<Utc>);
}

#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<RwLock<HashMap<String, MagicLinkToken>>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn insert(&self, token: MagicLinkToken) {
        self.tokens
            .write()
            .await
            .insert(token.token.clone(), token);
    }

    async fn take(&self, token: &str) -> Option<MagicLinkToken> {
        self.tokens.write().await.remove(token)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, entry| !entry.is_expired(now));
        let removed = before - tokens.len();
        if removed > 0 {
            debug!("Purged {} expired magic-link tokens", removed);
        }
    }
}

/// Background task to periodically drop tokens nobody redeemed.
pub async fn start_cleanup_task(store: Arc<dyn TokenStore>) {
    let mut interval = tokio::time::interval(Duration::from_secs(10 * 60)); // 10 minutes

    loop {
        interval.tick().await;
        store.purge_expired(Utc::now()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(value: &str, expires_at: DateTime<Utc>) -> MagicLinkToken {
        MagicLinkToken {
            token: value.to_string(),
            email: "a@b.com".to_string(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_take_is_single_use() {
        let store = InMemoryTokenStore::new();
        let now = Utc::now();
        store.insert(token("t1", now + Duration::minutes(15))).await;

        let first = store.take("t1").await;
        assert!(first.is_some());
        assert_eq!(first.unwrap().email, "a@b.com");

        assert!(store.take("t1").await.is_none());
    }

    #[tokio::test]
    async fn test_purge_removes_only_expired() {
        let store = InMemoryTokenStore::new();
        let now = Utc::now();
        store.insert(token("live", now + Duration::minutes(10))).await;
        store.insert(token("dead", now - Duration::minutes(1))).await;

        store.purge_expired(now).await;

        assert!(store.take("dead").await.is_none());
        assert!(store.take("live").await.is_some());
    }
}
