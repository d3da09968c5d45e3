//! Web Push delivery (RFC 8030) with VAPID signing and aes128gcm payloads.

use async_trait::async_trait;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder, URL_SAFE_NO_PAD,
};

use crate::domain::models::{DeliveryOutcome, PushConfig, PushSubscription};
use crate::domain::ports::PushSender;

pub struct WebPushSender {
    client: IsahcWebPushClient,
    private_key: String,
    subject: Option<String>,
    ttl: u32,
}

impl WebPushSender {
    /// Build a sender from configuration; `Ok(None)` when no private key is set.
    pub fn from_config(config: &PushConfig) -> Result<Option<Self>, WebPushError> {
        let Some(private_key) = config
            .vapid_private_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            client: IsahcWebPushClient::new()?,
            private_key: private_key.to_string(),
            subject: config.subject.clone(),
            ttl: config.ttl_secs,
        }))
    }

    async fn deliver(&self, subscription: &PushSubscription, payload: &[u8]) -> Result<(), WebPushError> {
        let info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
        );

        let mut signature = VapidSignatureBuilder::from_base64(&self.private_key, URL_SAFE_NO_PAD, &info)?;
        if let Some(subject) = &self.subject {
            signature.add_claim("sub", subject.as_str());
        }

        let mut message = WebPushMessageBuilder::new(&info);
        message.set_ttl(self.ttl);
        message.set_payload(ContentEncoding::Aes128Gcm, payload);
        message.set_vapid_signature(signature.build()?);

        self.client.send(message.build()?).await
    }
}

/// Map a delivery error to an outcome. Expired and unknown endpoints are
/// permanent; anything else may succeed on a later broadcast.
fn outcome_for(error: WebPushError) -> DeliveryOutcome {
    match error {
        WebPushError::EndpointNotValid | WebPushError::EndpointNotFound => {
            DeliveryOutcome::Gone
        }
        other => DeliveryOutcome::Failed(other.to_string()),
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(&self, subscription: &PushSubscription, payload: &[u8]) -> DeliveryOutcome {
        match self.deliver(subscription, payload).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => outcome_for(e),
        }
    }
}
