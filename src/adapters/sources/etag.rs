//! Conditional requests with entity tags.
//!
//! API-backed adapters remember the last `ETag` together with the result it
//! produced. A `304 Not Modified` replays that result without re-parsing.

use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::error::SourceError;
use crate::domain::models::CheckResult;

/// Last entity tag seen for one request, and the result it produced.
#[derive(Debug, Clone, Default)]
pub struct EtagCache {
    last_etag: Option<String>,
    last_result: CheckResult,
}

impl EtagCache {
    pub fn etag(&self) -> Option<&str> {
        self.last_etag.as_deref()
    }

    pub fn last_result(&self) -> &CheckResult {
        &self.last_result
    }

    /// Turn a response into a result, replaying the cached one on 304.
    ///
    /// A fresh body carrying an `ETag` replaces the cache; a fresh body
    /// without one clears it, so a stale tag is never sent again.
    pub fn resolve<T>(
        &mut self,
        fetched: Conditional<T>,
        reduce: impl FnOnce(T) -> CheckResult,
    ) -> CheckResult {
        match fetched {
            Conditional::NotModified => self.last_result.clone(),
            Conditional::Fresh { body, etag } => {
                let result = reduce(body);
                match etag {
                    Some(tag) => {
                        self.last_etag = Some(tag);
                        self.last_result = result.clone();
                    }
                    None => *self = Self::default(),
                }
                result
            }
        }
    }
}

/// Response of a conditional GET.
#[derive(Debug)]
pub enum Conditional<T> {
    NotModified,
    Fresh { body: T, etag: Option<String> },
}

/// Send `request`, adding `If-None-Match` when a tag is known.
///
/// `304` maps to [`Conditional::NotModified`]; any other non-2xx status is
/// an error.
pub(crate) async fn send_conditional<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
    etag: Option<&str>,
) -> Result<Conditional<T>, SourceError> {
    let request = match etag {
        Some(tag) => request.header(IF_NONE_MATCH, tag),
        None => request,
    };

    let response = request
        .send()
        .await
        .map_err(|e| SourceError::transport(url, e))?;

    let status = response.status();
    if status == StatusCode::NOT_MODIFIED && etag.is_some() {
        return Ok(Conditional::NotModified);
    }
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status,
        });
    }

    let etag = response
        .headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .json::<T>()
        .await
        .map_err(|e| SourceError::decode(url, e))?;

    Ok(Conditional::Fresh { body, etag })
}
