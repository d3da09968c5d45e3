//! Vendor model catalog adapter.
//!
//! Lists models from the authenticated `/v1/models` endpoint and classifies
//! each entry's `id` and `display_name`. This is the most authoritative
//! source and comes first in aggregation order.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::error::SourceError;
use super::etag::{send_conditional, EtagCache};
use crate::domain::models::{CatalogSourceConfig, CheckResult};
use crate::domain::ports::SourceAdapter;
use crate::services::classifier;

#[derive(Debug, Default, Deserialize)]
struct ModelsPage {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

pub struct CatalogAdapter {
    http: Client,
    config: CatalogSourceConfig,
    cache: Mutex<EtagCache>,
}

impl CatalogAdapter {
    pub fn new(http: Client, config: CatalogSourceConfig) -> Self {
        Self {
            http,
            config,
            cache: Mutex::new(EtagCache::default()),
        }
    }

    /// The models endpoint; also reported as the `source` of a match.
    pub fn models_url(&self) -> String {
        format!("{}/v1/models", self.config.base_url.trim_end_matches('/'))
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    async fn fetch(&self, api_key: &str) -> Result<CheckResult, SourceError> {
        let url = self.models_url();
        let request = self
            .http
            .get(&url)
            .query(&[("limit", self.config.limit)])
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.config.api_version);

        // Held across the request: the adapter is polled by one check at a time.
        let mut cache = self.cache.lock().await;
        let fetched = send_conditional::<ModelsPage>(request, &url, cache.etag()).await?;
        Ok(cache.resolve(fetched, |page| classify_models(&page.data, &url)))
    }
}

/// First entity whose id or display name names the target.
fn classify_models(models: &[ModelEntry], source: &str) -> CheckResult {
    models
        .iter()
        .find_map(|entry| {
            let id = entry.id.as_deref().unwrap_or_default();
            let display_name = entry.display_name.as_deref().unwrap_or_default();
            (classifier::classify(id) || classifier::classify(display_name))
                .then(|| CheckResult::found(id, source))
        })
        .unwrap_or_else(CheckResult::not_found)
}

#[async_trait]
impl SourceAdapter for CatalogAdapter {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn fetch_and_classify(&self) -> CheckResult {
        let Some(api_key) = self.api_key() else {
            debug!(adapter = self.name(), "no API key configured, skipping");
            return CheckResult::not_found();
        };

        match self.fetch(api_key).await {
            Ok(result) => result,
            Err(e) => {
                warn!(adapter = self.name(), error = %e, "source check failed");
                CheckResult::not_found()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: Option<&str>, display_name: Option<&str>) -> ModelEntry {
        ModelEntry {
            id: id.map(str::to_string),
            display_name: display_name.map(str::to_string),
        }
    }

    #[test]
    fn test_first_matching_entity_wins() {
        let models = vec![
            entry(Some("claude-opus-4-1"), Some("Claude Opus 4.1")),
            entry(Some("claude-sonnet-5-preview"), Some("Claude Sonnet 5")),
            entry(Some("claude-sonnet-5"), Some("Claude Sonnet 5")),
        ];
        let result = classify_models(&models, "https://api/v1/models");
        assert_eq!(
            result,
            CheckResult::found("claude-sonnet-5-preview", "https://api/v1/models")
        );
    }

    #[test]
    fn test_display_name_alone_can_match() {
        let models = vec![entry(Some("model-x"), Some("Claude Sonnet 5"))];
        let result = classify_models(&models, "src");
        assert!(result.found);
        assert_eq!(result.model.as_deref(), Some("model-x"));
    }

    #[test]
    fn test_missing_fields_are_tolerated() {
        let models = vec![entry(None, None), entry(Some("claude-3-5-sonnet"), None)];
        assert_eq!(classify_models(&models, "src"), CheckResult::not_found());
    }

    #[test]
    fn test_decoy_entities_do_not_match() {
        let models = vec![
            entry(Some("claude-3-5-sonnet-20241022"), Some("Claude 3.5 Sonnet")),
            entry(Some("claude-sonnet-4-5"), Some("Claude Sonnet 4.5")),
        ];
        assert!(!classify_models(&models, "src").found);
    }

    #[tokio::test]
    async fn test_no_api_key_skips_network() {
        let adapter = CatalogAdapter::new(
            Client::new(),
            CatalogSourceConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                api_key: Some("   ".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(adapter.fetch_and_classify().await, CheckResult::not_found());
    }
}
