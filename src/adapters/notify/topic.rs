//! Public topic broadcast (ntfy-style HTTP publish).

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Announcement, TopicConfig};
use crate::domain::ports::TopicPublisher;

pub struct NtfyTopicPublisher {
    http: Client,
    url: String,
    priority: String,
    tags: String,
}

impl NtfyTopicPublisher {
    /// `None` when no topic URL is configured.
    pub fn from_config(http: Client, config: &TopicConfig) -> Option<Self> {
        let url = config.url.as_deref().filter(|u| !u.trim().is_empty())?;
        Some(Self {
            http,
            url: url.to_string(),
            priority: config.priority.clone(),
            tags: config.tags.clone(),
        })
    }
}

#[async_trait]
impl TopicPublisher for NtfyTopicPublisher {
    async fn publish(&self, announcement: &Announcement) -> DomainResult<()> {
        let mut request = self
            .http
            .post(&self.url)
            .header("Title", &announcement.title)
            .header("Priority", &self.priority)
            .header("Tags", &self.tags)
            .body(announcement.body.clone());
        if let Some(url) = &announcement.url {
            request = request.header("Click", url);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::DeliveryFailed(format!(
                "topic publish returned {status}: {body}"
            )));
        }

        debug!(url = %self.url, "topic notification published");
        Ok(())
    }
}
