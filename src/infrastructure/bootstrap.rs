//! Service composition.
//!
//! Wires configuration into the subscription store, notification channels,
//! source adapters and the check scheduler. Missing credentials disable the
//! affected capability and are reported once here.

use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

use crate::adapters::http::AppState;
use crate::adapters::memory::InMemorySubscriptionStore;
use crate::adapters::notify::{NtfyTopicPublisher, WebPushSender};
use crate::adapters::sources::build_http_client;
use crate::adapters::sqlite::{initialize_database, SqliteSubscriptionStore};
use crate::domain::models::{Config, StorageConfig};
use crate::domain::ports::{PushSender, SubscriptionStore, TopicPublisher};
use crate::services::{Aggregator, CheckScheduler, Notifier};

/// Everything a running instance needs, built once from [`Config`].
pub struct AppContext {
    pub config: Config,
    pub http: Client,
    pub aggregator: Arc<Aggregator>,
    pub notifier: Arc<Notifier>,
    pub scheduler: Arc<CheckScheduler>,
}

impl AppContext {
    pub async fn build(config: Config) -> Result<Self> {
        let http = build_http_client(&config.http)?;
        let store = build_subscription_store(&config.storage).await?;
        let notifier = Arc::new(build_notifier(&config, &http, store)?);
        let aggregator = Arc::new(Aggregator::from_config(&config.sources, &http));
        report_capabilities(&config, &aggregator);

        let scheduler = Arc::new(CheckScheduler::new(
            Arc::clone(&aggregator),
            Arc::clone(&notifier),
            config.schedule.clone(),
        ));

        Ok(Self {
            config,
            http,
            aggregator,
            notifier,
            scheduler,
        })
    }

    /// Shared state for the HTTP router.
    pub fn http_state(&self) -> AppState {
        AppState::new(
            Arc::clone(&self.scheduler),
            self.config.server.trigger_token.clone(),
            self.notifier
                .push_enabled()
                .then(|| self.config.notify.push.vapid_public_key.clone())
                .flatten(),
        )
    }
}

pub async fn build_subscription_store(storage: &StorageConfig) -> Result<Arc<dyn SubscriptionStore>> {
    match storage.backend.as_str() {
        "memory" => {
            info!("using in-memory subscription store");
            Ok(Arc::new(InMemorySubscriptionStore::new()))
        }
        _ => {
            let pool = initialize_database(&storage.path)
                .await
                .with_context(|| format!("Failed to open subscription database at {}", storage.path))?;
            Ok(Arc::new(SqliteSubscriptionStore::new(pool)))
        }
    }
}

pub fn build_notifier(
    config: &Config,
    http: &Client,
    store: Arc<dyn SubscriptionStore>,
) -> Result<Notifier> {
    let push: Option<Arc<dyn PushSender>> = WebPushSender::from_config(&config.notify.push)
        .context("Failed to create web push client")?
        .map(|sender| Arc::new(sender) as Arc<dyn PushSender>);
    let topic: Option<Arc<dyn TopicPublisher>> =
        NtfyTopicPublisher::from_config(http.clone(), &config.notify.topic)
            .map(|publisher| Arc::new(publisher) as Arc<dyn TopicPublisher>);

    if push.is_none() {
        info!("push notifications disabled: no VAPID private key configured");
    }
    if topic.is_none() {
        info!("topic notifications disabled: no topic URL configured");
    }

    Ok(Notifier::new(store, push, topic))
}

fn report_capabilities(config: &Config, aggregator: &Aggregator) {
    let catalog = &config.sources.catalog;
    if catalog.enabled && catalog.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        info!("catalog source has no API key and will report not found");
    }
    info!(sources = ?aggregator.adapter_names(), "source adapters configured");
}
