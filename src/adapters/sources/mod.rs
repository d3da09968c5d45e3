//! Source adapters. Each queries one external surface and reduces the
//! response to a [`CheckResult`](crate::domain::models::CheckResult).

mod error;
mod etag;

pub mod catalog;
pub mod discussion;
pub mod releases;
pub mod web_pages;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

pub use catalog::CatalogAdapter;
pub use discussion::DiscussionAdapter;
pub use error::SourceError;
pub use etag::{Conditional, EtagCache};
pub use releases::ReleasesAdapter;
pub use web_pages::WebPagesAdapter;

use crate::domain::models::HttpClientConfig;

/// Build the HTTP client shared by every adapter and outbound channel.
pub fn build_http_client(config: &HttpClientConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .pool_max_idle_per_host(4)
        .build()
        .context("Failed to build HTTP client")
}
