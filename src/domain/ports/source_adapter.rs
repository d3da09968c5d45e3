use async_trait::async_trait;

use crate::domain::models::CheckResult;

/// One external surface that can be polled for the target.
///
/// Implementations never fail: transport and parsing errors are logged
/// inside the adapter and reported as [`CheckResult::not_found`].
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Short stable name used in logs, e.g. `"catalog"`.
    fn name(&self) -> &str;

    /// Query the upstream and classify what it returned.
    async fn fetch_and_classify(&self) -> CheckResult;
}
