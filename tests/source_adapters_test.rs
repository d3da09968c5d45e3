//! Source adapters against mock upstreams.
//!
//! Covers request shape (paths, headers, query), conditional requests,
//! failover between pages/repositories and soft failure handling.

mod common;

use common::{http_client, models_body};
use dropwatch::adapters::sources::{CatalogAdapter, DiscussionAdapter, ReleasesAdapter, WebPagesAdapter};
use dropwatch::domain::models::{
    CatalogSourceConfig, CheckResult, DiscussionSourceConfig, PagesSourceConfig, ReleasesSourceConfig,
};
use dropwatch::SourceAdapter;
use mockito::{Matcher, Server};

fn catalog(server: &Server, api_key: Option<&str>) -> CatalogAdapter {
    CatalogAdapter::new(
        http_client(),
        CatalogSourceConfig {
            base_url: server.url(),
            api_key: api_key.map(str::to_string),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_catalog_matches_entity_and_reports_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/models")
        .match_query(Matcher::UrlEncoded("limit".into(), "100".into()))
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(models_body(&[
            ("claude-opus-4-1-20250805", "Claude Opus 4.1"),
            ("claude-sonnet-5-preview", "Claude Sonnet 5"),
        ]))
        .create_async()
        .await;

    let adapter = catalog(&server, Some("test-key"));
    let result = adapter.fetch_and_classify().await;

    mock.assert_async().await;
    assert_eq!(
        result,
        CheckResult::found("claude-sonnet-5-preview", format!("{}/v1/models", server.url()))
    );
}

#[tokio::test]
async fn test_catalog_replays_cached_result_on_304() {
    let mut server = Server::new_async().await;
    let fresh = server
        .mock("GET", "/v1/models")
        .match_query(Matcher::Any)
        .match_header("if-none-match", Matcher::Missing)
        .with_status(200)
        .with_header("etag", "\"rev-1\"")
        .with_body(models_body(&[("claude-sonnet-5", "Claude Sonnet 5")]))
        .expect(1)
        .create_async()
        .await;
    let unchanged = server
        .mock("GET", "/v1/models")
        .match_query(Matcher::Any)
        .match_header("if-none-match", "\"rev-1\"")
        .with_status(304)
        .expect(1)
        .create_async()
        .await;

    let adapter = catalog(&server, Some("k"));
    let first = adapter.fetch_and_classify().await;
    let second = adapter.fetch_and_classify().await;

    fresh.assert_async().await;
    unchanged.assert_async().await;
    assert!(first.found);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_catalog_without_key_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/models")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let result = catalog(&server, None).fetch_and_classify().await;

    mock.assert_async().await;
    assert_eq!(result, CheckResult::not_found());
}

#[tokio::test]
async fn test_catalog_error_status_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/models")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"type":"error"}"#)
        .create_async()
        .await;

    assert_eq!(
        catalog(&server, Some("bad")).fetch_and_classify().await,
        CheckResult::not_found()
    );
}

#[tokio::test]
async fn test_catalog_malformed_body_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/models")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    assert!(!catalog(&server, Some("k")).fetch_and_classify().await.found);
}

#[tokio::test]
async fn test_pages_fail_over_and_skip_long_fragments() {
    let mut server = Server::new_async().await;
    let long_fragment = format!("Claude Sonnet 5 {}", "x".repeat(240));
    server
        .mock("GET", "/down")
        .with_status(503)
        .create_async()
        .await;
    server
        .mock("GET", "/long")
        .with_status(200)
        .with_body(format!("<html><p>{long_fragment}</p></html>"))
        .create_async()
        .await;
    server
        .mock("GET", "/news")
        .with_status(200)
        .with_body("<html><ul><li>Introducing <b>Claude Sonnet 5</b></li></ul></html>")
        .create_async()
        .await;

    let urls = ["/down", "/long", "/news"]
        .iter()
        .map(|p| format!("{}{p}", server.url()))
        .collect::<Vec<_>>();
    let adapter = WebPagesAdapter::new(
        http_client(),
        PagesSourceConfig {
            urls: urls.clone(),
            ..Default::default()
        },
    );

    let result = adapter.fetch_and_classify().await;
    assert_eq!(result, CheckResult::found("Claude Sonnet 5", urls[2].as_str()));
}

#[tokio::test]
async fn test_pages_all_failing_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let adapter = WebPagesAdapter::new(
        http_client(),
        PagesSourceConfig {
            urls: vec![format!("{}/a", server.url()), format!("{}/b", server.url())],
            ..Default::default()
        },
    );
    assert_eq!(adapter.fetch_and_classify().await, CheckResult::not_found());
}

#[tokio::test]
async fn test_discussion_search_request_and_permalink() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/search_by_date")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "sonnet 5".into()),
            Matcher::UrlEncoded("tags".into(), "story".into()),
            Matcher::UrlEncoded("hitsPerPage".into(), "20".into()),
        ]))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "hits": [
                    {"objectID": "1", "title": "Claude 3.5 Sonnet is great"},
                    {"objectID": "2", "title": null},
                    {"objectID": "3", "title": "Anthropic releases Claude Sonnet 5"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let adapter = DiscussionAdapter::new(
        http_client(),
        DiscussionSourceConfig {
            base_url: server.url(),
            ..Default::default()
        },
    );
    let result = adapter.fetch_and_classify().await;

    mock.assert_async().await;
    assert_eq!(
        result,
        CheckResult::found("Claude Sonnet 5", "https://news.ycombinator.com/item?id=3")
    );
}

fn releases(server: &Server, repositories: &[&str]) -> ReleasesAdapter {
    ReleasesAdapter::new(
        http_client(),
        ReleasesSourceConfig {
            base_url: server.url(),
            repositories: repositories.iter().map(|r| r.to_string()).collect(),
            token: Some("gh-token".to_string()),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_releases_fall_back_to_commits_after_failing_repo() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Regex(r"^/repos/o/broken/".to_string()))
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(2)
        .create_async()
        .await;
    let releases_mock = server
        .mock("GET", "/repos/o/sdk/releases")
        .match_query(Matcher::UrlEncoded("per_page".into(), "10".into()))
        .match_header("authorization", "Bearer gh-token")
        .match_header("accept", "application/vnd.github+json")
        .match_header("user-agent", Matcher::Regex("^dropwatch/".to_string()))
        .with_status(200)
        .with_body(r#"[{"tag_name": "v1.2.0", "name": "v1.2.0", "body": "Bug fixes", "html_url": null}]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/repos/o/sdk/commits")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            serde_json::json!([
                {"sha": "aaa", "html_url": "https://github.com/o/sdk/commit/aaa", "commit": {"message": "chore: lint"}},
                {"sha": "bbb", "html_url": "https://github.com/o/sdk/commit/bbb", "commit": {"message": "feat: add claude-sonnet-5 to model list"}}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let result = releases(&server, &["o/broken", "o/sdk"]).fetch_and_classify().await;

    releases_mock.assert_async().await;
    assert_eq!(
        result,
        CheckResult::found("claude-sonnet-5", "https://github.com/o/sdk/commit/bbb")
    );
}

#[tokio::test]
async fn test_releases_match_skips_commit_listing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/o/sdk/releases")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("etag", "W/\"r1\"")
        .with_body(r#"[{"tag_name": "v2.0.0", "name": "Sonnet 5 support", "body": "", "html_url": "https://github.com/o/sdk/releases/tag/v2.0.0"}]"#)
        .create_async()
        .await;
    let commits = server
        .mock("GET", "/repos/o/sdk/commits")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let result = releases(&server, &["o/sdk"]).fetch_and_classify().await;

    commits.assert_async().await;
    assert_eq!(
        result,
        CheckResult::found("Sonnet 5", "https://github.com/o/sdk/releases/tag/v2.0.0")
    );
}
