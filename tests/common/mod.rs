//! Common test utilities for integration tests
//!
//! Shared fixtures for mock upstreams and in-memory service wiring.

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dropwatch::adapters::memory::InMemorySubscriptionStore;
use dropwatch::domain::errors::DomainResult;
use dropwatch::domain::models::{Announcement, HttpClientConfig, ScheduleConfig};
use dropwatch::domain::ports::{SourceAdapter, TopicPublisher};
use dropwatch::{Aggregator, CheckScheduler, Notifier};

/// HTTP client configured the way production builds it.
pub fn http_client() -> Client {
    dropwatch::adapters::sources::build_http_client(&HttpClientConfig::default())
        .expect("Failed to build HTTP client")
}

/// Setup test logging
///
/// Call this at the beginning of tests that need log output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Topic publisher that only counts calls.
#[derive(Default)]
pub struct CountingTopic {
    pub calls: AtomicUsize,
}

impl CountingTopic {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopicPublisher for CountingTopic {
    async fn publish(&self, _announcement: &Announcement) -> DomainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scheduler over `adapters` with an in-memory store and a counting topic.
pub fn scheduler_with(
    adapters: Vec<Arc<dyn SourceAdapter>>,
) -> (Arc<CheckScheduler>, Arc<CountingTopic>, Arc<InMemorySubscriptionStore>) {
    let topic = Arc::new(CountingTopic::default());
    let store = Arc::new(InMemorySubscriptionStore::new());
    let notifier = Notifier::new(
        store.clone(),
        None,
        Some(topic.clone() as Arc<dyn TopicPublisher>),
    );
    let scheduler = Arc::new(CheckScheduler::new(
        Arc::new(Aggregator::new(adapters)),
        Arc::new(notifier),
        ScheduleConfig {
            interval_secs: 60,
            run_on_startup: false,
        },
    ));
    (scheduler, topic, store)
}

/// A models listing body in the catalog API's shape.
pub fn models_body(entries: &[(&str, &str)]) -> String {
    let data: Vec<serde_json::Value> = entries
        .iter()
        .map(|(id, name)| serde_json::json!({"type": "model", "id": id, "display_name": name}))
        .collect();
    serde_json::json!({"data": data, "has_more": false}).to_string()
}
