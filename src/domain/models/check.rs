use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one source query, or of the aggregate over all sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the target was positively identified.
    pub found: bool,
    /// The matched model identifier or token, for display.
    pub model: Option<String>,
    /// Link to where the match was observed.
    pub source: Option<String>,
}

impl CheckResult {
    /// The canonical "nothing found" result.
    pub const fn not_found() -> Self {
        Self {
            found: false,
            model: None,
            source: None,
        }
    }

    /// A positive result carrying the matched model and where it was seen.
    pub fn found(model: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            found: true,
            model: Some(model.into()),
            source: Some(source.into()),
        }
    }
}

/// The process-wide latest-known detection state.
///
/// Serialized with camelCase keys (`checkedAt`) for the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub found: bool,
    pub model: Option<String>,
    pub source: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl StatusSnapshot {
    /// Snapshot used before the first check completes.
    pub fn initial() -> Self {
        Self::from_result(CheckResult::not_found(), Utc::now())
    }

    pub fn from_result(result: CheckResult, checked_at: DateTime<Utc>) -> Self {
        Self {
            found: result.found,
            model: result.model,
            source: result.source,
            checked_at,
        }
    }

    pub fn result(&self) -> CheckResult {
        CheckResult {
            found: self.found,
            model: self.model.clone(),
            source: self.source.clone(),
        }
    }
}
