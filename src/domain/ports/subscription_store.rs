use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::PushSubscription;

/// Storage interface for push subscriptions
///
/// Records are keyed by [`PushSubscription::storage_key`], so storing the
/// same endpoint twice replaces the earlier keys.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// List every stored subscription
    async fn list(&self) -> DomainResult<Vec<PushSubscription>>;

    /// Insert or replace a subscription
    ///
    /// # Returns
    /// * `Ok(key)` - the storage key the record was written under
    async fn upsert(&self, subscription: &PushSubscription) -> DomainResult<String>;

    /// Remove a subscription by storage key
    ///
    /// # Returns
    /// * `Ok(true)` if a record was removed
    /// * `Ok(false)` if no record had that key
    async fn remove(&self, key: &str) -> DomainResult<bool>;
}
