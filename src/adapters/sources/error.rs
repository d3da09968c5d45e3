use reqwest::StatusCode;
use thiserror::Error;

/// Failure inside a source adapter. Never leaves the adapter: it is logged
/// and the adapter reports "not found" instead.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl SourceError {
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn decode(url: &str, source: reqwest::Error) -> Self {
        Self::Decode {
            url: url.to_string(),
            source,
        }
    }
}
