use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::errors::{DomainError, DomainResult};

/// A browser push subscription as handed out by `PushManager.subscribe()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Provider-specific key pair used to encrypt payloads for one subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

impl PushSubscription {
    pub fn new(
        endpoint: impl Into<String>,
        p256dh: impl Into<String>,
        auth: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: p256dh.into(),
                auth: auth.into(),
            },
        }
    }

    /// Store key: hex SHA-256 of the endpoint URL.
    pub fn storage_key(&self) -> String {
        hex::encode(Sha256::digest(self.endpoint.as_bytes()))
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "subscription endpoint cannot be empty".to_string(),
            ));
        }
        if self.keys.p256dh.trim().is_empty() || self.keys.auth.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "subscription keys cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
