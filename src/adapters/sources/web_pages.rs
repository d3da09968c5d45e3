//! Public web page adapter.
//!
//! Fetches a short list of pages, strips markup and classifies each text
//! fragment. Long fragments are skipped: a token buried in a large block of
//! prose is more likely a rumour than an announcement.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use super::error::SourceError;
use crate::domain::models::{CheckResult, PagesSourceConfig};
use crate::domain::ports::SourceAdapter;
use crate::services::classifier;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

pub struct WebPagesAdapter {
    http: Client,
    config: PagesSourceConfig,
}

impl WebPagesAdapter {
    pub fn new(http: Client, config: PagesSourceConfig) -> Self {
        Self { http, config }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| SourceError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::decode(url, e))
    }
}

/// Decode the handful of entities that commonly wrap model names.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Split markup into trimmed, entity-decoded text fragments.
pub fn text_fragments(html: &str) -> impl Iterator<Item = String> + '_ {
    TAG.split(html)
        .map(|raw| decode_entities(raw).trim().to_string())
        .filter(|fragment| !fragment.is_empty())
}

/// First target token found in a fragment of at most `max_len` characters.
pub fn first_matching_fragment(html: &str, max_len: usize) -> Option<String> {
    text_fragments(html)
        .filter(|fragment| fragment.chars().count() <= max_len)
        .find_map(|fragment| classifier::extract_model_token(&fragment))
}

#[async_trait]
impl SourceAdapter for WebPagesAdapter {
    fn name(&self) -> &str {
        "pages"
    }

    async fn fetch_and_classify(&self) -> CheckResult {
        for url in &self.config.urls {
            let html = match self.fetch_page(url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(adapter = self.name(), url = %url, error = %e, "page fetch failed");
                    continue;
                }
            };

            if let Some(token) = first_matching_fragment(&html, self.config.max_fragment_len) {
                return CheckResult::found(token, url.as_str());
            }
            debug!(adapter = self.name(), url = %url, "no match on page");
        }

        CheckResult::not_found()
    }
}
