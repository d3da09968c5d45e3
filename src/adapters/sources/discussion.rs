//! Forum search adapter (Hacker News Algolia `search_by_date`).
//!
//! Only titles of the most recent hits are classified; comment bodies and
//! story text are too noisy.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use super::error::SourceError;
use crate::domain::models::{CheckResult, DiscussionSourceConfig};
use crate::domain::ports::SourceAdapter;
use crate::services::classifier;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "objectID", default)]
    object_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

pub struct DiscussionAdapter {
    http: Client,
    config: DiscussionSourceConfig,
}

impl DiscussionAdapter {
    pub fn new(http: Client, config: DiscussionSourceConfig) -> Self {
        Self { http, config }
    }

    fn search_url(&self) -> String {
        format!(
            "{}/api/v1/search_by_date",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn fetch(&self) -> Result<CheckResult, SourceError> {
        let url = self.search_url();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("query", self.config.query.as_str()),
                ("tags", self.config.tags.as_str()),
            ])
            .query(&[("hitsPerPage", self.config.hits_per_page)])
            .send()
            .await
            .map_err(|e| SourceError::transport(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { url, status });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::decode(&url, e))?;

        Ok(self.classify_hits(&body.hits))
    }

    fn classify_hits(&self, hits: &[SearchHit]) -> CheckResult {
        hits.iter()
            .take(self.config.hits_per_page as usize)
            .find_map(|hit| {
                let token = classifier::extract_model_token(hit.title.as_deref()?)?;
                let permalink = match &hit.object_id {
                    Some(id) => format!("{}{id}", self.config.permalink_base),
                    None => self.search_url(),
                };
                Some(CheckResult::found(token, permalink))
            })
            .unwrap_or_else(CheckResult::not_found)
    }
}

#[async_trait]
impl SourceAdapter for DiscussionAdapter {
    fn name(&self) -> &str {
        "discussion"
    }

    async fn fetch_and_classify(&self) -> CheckResult {
        self.fetch().await.unwrap_or_else(|e| {
            warn!(adapter = self.name(), error = %e, "source check failed");
            CheckResult::not_found()
        })
    }
}
