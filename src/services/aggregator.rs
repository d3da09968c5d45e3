//! Multi-source aggregation.
//!
//! Every adapter runs to completion on every check; the priority order is
//! applied only when reducing the results, never to cancel slower sources.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, info};

use crate::adapters::sources::{CatalogAdapter, DiscussionAdapter, ReleasesAdapter, WebPagesAdapter};
use crate::domain::models::{CheckResult, SourcesConfig};
use crate::domain::ports::SourceAdapter;

/// Runs a fixed, ordered set of source adapters concurrently.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl Aggregator {
    /// Adapters are listed in priority order, most authoritative first.
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// Compose the production adapter set: catalog, pages, discussion, releases.
    /// Disabled sources are left out without changing the others' order.
    pub fn from_config(config: &SourcesConfig, http: &Client) -> Self {
        let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::with_capacity(4);
        if config.catalog.enabled {
            adapters.push(Arc::new(CatalogAdapter::new(http.clone(), config.catalog.clone())));
        }
        if config.pages.enabled {
            adapters.push(Arc::new(WebPagesAdapter::new(http.clone(), config.pages.clone())));
        }
        if config.discussion.enabled {
            adapters.push(Arc::new(DiscussionAdapter::new(http.clone(), config.discussion.clone())));
        }
        if config.releases.enabled {
            adapters.push(Arc::new(ReleasesAdapter::new(http.clone(), config.releases.clone())));
        }
        Self::new(adapters)
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Query every source concurrently, keeping priority order.
    pub async fn check_each(&self) -> Vec<(String, CheckResult)> {
        join_all(self.adapters.iter().map(|adapter| async move {
            let result = adapter.fetch_and_classify().await;
            debug!(
                adapter = adapter.name(),
                found = result.found,
                model = result.model.as_deref(),
                "source checked"
            );
            (adapter.name().to_string(), result)
        }))
        .await
    }

    /// Query every source and reduce to one authoritative result.
    pub async fn check_all_sources(&self) -> CheckResult {
        let started = Instant::now();

        let results = self.check_each().await;
        let found_count = results.iter().filter(|(_, r)| r.found).count();
        let result = reduce(results.into_iter().map(|(_, r)| r));
        info!(
            sources = self.adapters.len(),
            found_count,
            found = result.found,
            duration_ms = started.elapsed().as_millis() as u64,
            "all sources checked"
        );
        result
    }
}

/// First found result in priority order, or the canonical not-found result.
pub fn reduce(results: impl IntoIterator<Item = CheckResult>) -> CheckResult {
    results
        .into_iter()
        .find(|r| r.found)
        .unwrap_or_else(CheckResult::not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedAdapter {
        name: &'static str,
        result: CheckResult,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FixedAdapter {
        fn new(name: &'static str, result: CheckResult, delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                name,
                result,
                delay: Duration::from_millis(delay_ms),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SourceAdapter for FixedAdapter {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_and_classify(&self) -> CheckResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_priority_order_wins_over_completion_order() {
        // The first adapter is the slowest; it must still win.
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            FixedAdapter::new("a", CheckResult::found("model-a", "src-a"), 50),
            FixedAdapter::new("b", CheckResult::not_found(), 0),
            FixedAdapter::new("c", CheckResult::found("model-c", "src-c"), 0),
            FixedAdapter::new("d", CheckResult::not_found(), 0),
        ];

        let aggregator = Aggregator::new(adapters);
        let result = aggregator.check_all_sources().await;

        assert_eq!(result, CheckResult::found("model-a", "src-a"));
    }

    #[tokio::test]
    async fn test_all_not_found_is_canonical() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = (0..4)
            .map(|_| FixedAdapter::new("x", CheckResult::not_found(), 0) as Arc<dyn SourceAdapter>)
            .collect();
        let result = Aggregator::new(adapters).check_all_sources().await;
        assert_eq!(
            result,
            CheckResult {
                found: false,
                model: None,
                source: None
            }
        );
    }

    #[tokio::test]
    async fn test_every_adapter_runs_even_after_a_match() {
        let first = FixedAdapter::new("a", CheckResult::found("m", "s"), 0);
        let slow = FixedAdapter::new("b", CheckResult::not_found(), 30);
        let aggregator = Aggregator::new(vec![
            first.clone() as Arc<dyn SourceAdapter>,
            slow.clone() as Arc<dyn SourceAdapter>,
        ]);

        aggregator.check_all_sources().await;

        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_adapters_run_concurrently() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = (0..4)
            .map(|_| FixedAdapter::new("x", CheckResult::not_found(), 100) as Arc<dyn SourceAdapter>)
            .collect();
        let started = Instant::now();
        Aggregator::new(adapters).check_all_sources().await;
        assert!(started.elapsed() < Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_check_each_reports_every_source_in_order() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            FixedAdapter::new("slow", CheckResult::not_found(), 30),
            FixedAdapter::new("fast", CheckResult::found("m", "s"), 0),
        ];
        let rows = Aggregator::new(adapters).check_each().await;
        let names: Vec<&str> = rows.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["slow", "fast"]);
        assert!(rows[1].1.found);
    }

    #[test]
    fn test_reduce_keeps_not_found_model_out() {
        let partial = CheckResult {
            found: false,
            model: Some("leftover".to_string()),
            source: None,
        };
        assert_eq!(reduce(vec![partial]), CheckResult::not_found());
        assert_eq!(reduce(Vec::new()), CheckResult::not_found());
    }

    #[test]
    fn test_from_config_keeps_declared_order() {
        let http = Client::new();
        let aggregator = Aggregator::from_config(&SourcesConfig::default(), &http);
        assert_eq!(
            aggregator.adapter_names(),
            vec!["catalog", "pages", "discussion", "releases"]
        );

        let mut config = SourcesConfig::default();
        config.pages.enabled = false;
        let aggregator = Aggregator::from_config(&config, &http);
        assert_eq!(aggregator.adapter_names(), vec!["catalog", "discussion", "releases"]);
    }
}
