//! Code host release/commit adapter (GitHub REST API v3).
//!
//! For each repository, in order: recent releases first, then recent commit
//! messages. Each request URL keeps its own entity tag, so unchanged
//! listings cost a `304` and no rate-limit budget.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::error::SourceError;
use super::etag::{send_conditional, EtagCache};
use crate::domain::models::{CheckResult, ReleasesSourceConfig};
use crate::domain::ports::SourceAdapter;
use crate::services::classifier;

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    commit: Option<CommitDetail>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: Option<String>,
}

pub struct ReleasesAdapter {
    http: Client,
    config: ReleasesSourceConfig,
    caches: Mutex<HashMap<String, EtagCache>>,
}

impl ReleasesAdapter {
    pub fn new(http: Client, config: ReleasesSourceConfig) -> Self {
        Self {
            http,
            config,
            caches: Mutex::new(HashMap::new()),
        }
    }

    fn repo_url(&self, repo: &str, listing: &str) -> String {
        format!(
            "{}/repos/{}/{}?per_page={}",
            self.config.base_url.trim_end_matches('/'),
            repo,
            listing,
            self.config.per_page
        )
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match self.config.token.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// Conditional GET of one listing, reduced through that URL's cache.
    async fn check_listing<T>(
        &self,
        url: &str,
        reduce: impl FnOnce(Vec<T>) -> CheckResult,
    ) -> Result<CheckResult, SourceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let etag = self
            .caches
            .lock()
            .await
            .get(url)
            .and_then(|c| c.etag().map(str::to_string));

        let fetched = send_conditional::<Vec<T>>(self.request(url), url, etag.as_deref()).await?;

        let mut caches = self.caches.lock().await;
        Ok(caches
            .entry(url.to_string())
            .or_default()
            .resolve(fetched, reduce))
    }

    async fn check_repo(&self, repo: &str) -> CheckResult {
        let releases_url = self.repo_url(repo, "releases");
        match self
            .check_listing(&releases_url, |releases: Vec<Release>| {
                classify_releases(repo, &releases)
            })
            .await
        {
            Ok(result) if result.found => return result,
            Ok(_) => {}
            Err(e) => warn!(adapter = self.name(), repo, error = %e, "release listing failed"),
        }

        let commits_url = self.repo_url(repo, "commits");
        match self
            .check_listing(&commits_url, |commits: Vec<CommitEntry>| {
                classify_commits(repo, &commits)
            })
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(adapter = self.name(), repo, error = %e, "commit listing failed");
                CheckResult::not_found()
            }
        }
    }
}

fn classify_releases(repo: &str, releases: &[Release]) -> CheckResult {
    releases
        .iter()
        .find_map(|release| {
            let tag = release.tag_name.as_deref().unwrap_or_default();
            let text = format!(
                "{} {} {}",
                tag,
                release.name.as_deref().unwrap_or_default(),
                release.body.as_deref().unwrap_or_default()
            );
            let token = classifier::extract_model_token(&text)?;
            let url = release
                .html_url
                .clone()
                .unwrap_or_else(|| format!("https://github.com/{repo}/releases/tag/{tag}"));
            Some(CheckResult::found(token, url))
        })
        .unwrap_or_else(CheckResult::not_found)
}

fn classify_commits(repo: &str, commits: &[CommitEntry]) -> CheckResult {
    commits
        .iter()
        .find_map(|entry| {
            let message = entry.commit.as_ref()?.message.as_deref()?;
            let token = classifier::extract_model_token(message)?;
            let url = entry.html_url.clone().unwrap_or_else(|| {
                format!(
                    "https://github.com/{repo}/commit/{}",
                    entry.sha.as_deref().unwrap_or_default()
                )
            });
            Some(CheckResult::found(token, url))
        })
        .unwrap_or_else(CheckResult::not_found)
}

#[async_trait]
impl SourceAdapter for ReleasesAdapter {
    fn name(&self) -> &str {
        "releases"
    }

    async fn fetch_and_classify(&self) -> CheckResult {
        for repo in &self.config.repositories {
            let result = self.check_repo(repo).await;
            if result.found {
                return result;
            }
            debug!(adapter = self.name(), repo = %repo, "no match in repository");
        }
        CheckResult::not_found()
    }
}
