use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Announcement, DeliveryOutcome, PushSubscription};

/// Delivers an encrypted payload to a single push subscriber.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Send `payload` to `subscription`.
    ///
    /// Never fails outright; a subscription the push service reports as
    /// expired or unknown comes back as [`DeliveryOutcome::Gone`].
    async fn send(&self, subscription: &PushSubscription, payload: &[u8]) -> DeliveryOutcome;
}

/// Posts one announcement to a public topic.
#[async_trait]
pub trait TopicPublisher: Send + Sync {
    async fn publish(&self, announcement: &Announcement) -> DomainResult<()>;
}
