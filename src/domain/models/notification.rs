use serde::{Deserialize, Serialize};

/// The message announced on every channel when the target first appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub title: String,
    pub body: String,
    /// Click-through link, when the detecting source provided one.
    pub url: Option<String>,
}

impl Announcement {
    pub fn target_dropped(model: Option<&str>, source: Option<&str>) -> Self {
        let body = match model {
            Some(model) => format!("{model} is now available."),
            None => "Sonnet 5 is now available.".to_string(),
        };
        Self {
            title: "Sonnet 5 has dropped".to_string(),
            body,
            url: source.map(str::to_string),
        }
    }

    /// JSON payload delivered to push subscribers.
    pub fn to_push_payload(&self) -> Vec<u8> {
        serde_json::json!({
            "title": self.title,
            "body": self.body,
            "url": self.url,
        })
        .to_string()
        .into_bytes()
    }
}

/// Result of delivering one push message to one subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Recoverable failure; the subscription is kept.
    Failed(String),
    /// The push service reported the subscription expired or unknown.
    Gone,
}

/// Counts for one push broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PushSummary {
    pub sent: usize,
    pub failed: usize,
    pub removed: usize,
}

impl PushSummary {
    pub fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.sent += 1,
            DeliveryOutcome::Failed(_) => self.failed += 1,
            DeliveryOutcome::Gone => self.removed += 1,
        }
    }
}

/// What one notifier dispatch did on each channel. `None` means the channel
/// is not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotifySummary {
    pub push: Option<PushSummary>,
    pub topic_delivered: Option<bool>,
}
