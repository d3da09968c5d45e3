//! One-time announcement fan-out.
//!
//! The notifier holds a process-lifetime latch. The first call to
//! [`Notifier::notify_target_dropped`] claims it before any dispatch work
//! starts; every later call returns immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::domain::models::{Announcement, DeliveryOutcome, NotifySummary, PushSummary};
use crate::domain::ports::{PushSender, SubscriptionStore, TopicPublisher};

pub struct Notifier {
    already_sent: AtomicBool,
    store: Arc<dyn SubscriptionStore>,
    push: Option<Arc<dyn PushSender>>,
    topic: Option<Arc<dyn TopicPublisher>>,
}

impl Notifier {
    /// Channels left as `None` are skipped silently.
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        push: Option<Arc<dyn PushSender>>,
        topic: Option<Arc<dyn TopicPublisher>>,
    ) -> Self {
        Self {
            already_sent: AtomicBool::new(false),
            store,
            push,
            topic,
        }
    }

    pub fn already_sent(&self) -> bool {
        self.already_sent.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &Arc<dyn SubscriptionStore> {
        &self.store
    }

    pub fn push_enabled(&self) -> bool {
        self.push.is_some()
    }

    /// Announce the target on every configured channel, at most once per
    /// process. Returns `None` when the latch was already set.
    pub async fn notify_target_dropped(
        &self,
        model: Option<&str>,
        source: Option<&str>,
    ) -> Option<NotifySummary> {
        if self.already_sent.swap(true, Ordering::SeqCst) {
            info!("announcement already sent, skipping");
            return None;
        }

        let announcement = Announcement::target_dropped(model, source);
        info!(model, source, "announcing target");

        let (push, topic_delivered) =
            tokio::join!(self.broadcast_push(&announcement), self.publish_topic(&announcement));

        let summary = NotifySummary {
            push,
            topic_delivered,
        };
        info!(
            sent = summary.push.map(|p| p.sent),
            failed = summary.push.map(|p| p.failed),
            removed = summary.push.map(|p| p.removed),
            topic_delivered = summary.topic_delivered,
            "announcement dispatched"
        );
        Some(summary)
    }

    async fn broadcast_push(&self, announcement: &Announcement) -> Option<PushSummary> {
        let sender = self.push.as_ref()?;

        let subscriptions = match self.store.list().await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                warn!(error = %e, "could not list push subscriptions");
                return Some(PushSummary::default());
            }
        };

        let payload = announcement.to_push_payload();
        let outcomes = join_all(subscriptions.iter().map(|subscription| {
            let payload = &payload;
            async move {
                let outcome = sender.send(subscription, payload).await;
                match &outcome {
                    DeliveryOutcome::Gone => {
                        let key = subscription.storage_key();
                        if let Err(e) = self.store.remove(&key).await {
                            warn!(key = %key, error = %e, "could not remove expired subscription");
                        }
                    }
                    DeliveryOutcome::Failed(reason) => {
                        warn!(endpoint = %subscription.endpoint, reason = %reason, "push delivery failed");
                    }
                    DeliveryOutcome::Delivered => {}
                }
                outcome
            }
        }))
        .await;

        let mut summary = PushSummary::default();
        for outcome in &outcomes {
            summary.record(outcome);
        }
        Some(summary)
    }

    async fn publish_topic(&self, announcement: &Announcement) -> Option<bool> {
        let publisher = self.topic.as_ref()?;
        match publisher.publish(announcement).await {
            Ok(()) => Some(true),
            Err(e) => {
                warn!(error = %e, "topic publish failed");
                Some(false)
            }
        }
    }
}
