//! In-process subscription store, for tests and `storage.backend: memory`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::DomainResult;
use crate::domain::models::PushSubscription;
use crate::domain::ports::SubscriptionStore;

#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    records: RwLock<BTreeMap<String, PushSubscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn list(&self) -> DomainResult<Vec<PushSubscription>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn upsert(&self, subscription: &PushSubscription) -> DomainResult<String> {
        subscription.validate()?;
        let key = subscription.storage_key();
        self.records
            .write()
            .await
            .insert(key.clone(), subscription.clone());
        Ok(key)
    }

    async fn remove(&self, key: &str) -> DomainResult<bool> {
        Ok(self.records.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let store = InMemorySubscriptionStore::new();
        let sub = PushSubscription::new("https://push.example/a", "p", "a");

        let key = store.upsert(&sub).await.unwrap();
        store.upsert(&sub).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.list().await.unwrap(), vec![sub]);

        assert!(store.remove(&key).await.unwrap());
        assert!(store.is_empty().await);
    }
}
