use serde::{Deserialize, Serialize};

/// Main configuration structure for dropwatch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP API configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Check scheduling configuration
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Outbound HTTP client configuration
    #[serde(default)]
    pub http: HttpClientConfig,

    /// Source adapter configuration
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Notification channel configuration
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Push subscription storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Copy of the configuration with every secret replaced by a marker.
    pub fn redacted(&self) -> Self {
        fn mask(secret: &Option<String>) -> Option<String> {
            secret.as_ref().map(|_| "<redacted>".to_string())
        }

        let mut config = self.clone();
        config.server.trigger_token = mask(&self.server.trigger_token);
        config.sources.catalog.api_key = mask(&self.sources.catalog.api_key);
        config.sources.releases.token = mask(&self.sources.releases.token);
        config.notify.push.vapid_private_key = mask(&self.notify.push.vapid_private_key);
        config
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to enable permissive CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Bearer token guarding `POST /trigger`; the route is disabled without it
    #[serde(default)]
    pub trigger_token: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8787
}

const fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: true,
            trigger_token: None,
        }
    }
}

/// Check scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScheduleConfig {
    /// Seconds between scheduled checks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Run one check immediately at startup
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

const fn default_interval_secs() -> u64 {
    60
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            run_on_startup: true,
        }
    }
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpClientConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent sent to every upstream (the code host rejects requests without one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("dropwatch/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Source adapter configuration, one section per adapter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourcesConfig {
    #[serde(default)]
    pub catalog: CatalogSourceConfig,

    #[serde(default)]
    pub pages: PagesSourceConfig,

    #[serde(default)]
    pub discussion: DiscussionSourceConfig,

    #[serde(default)]
    pub releases: ReleasesSourceConfig,
}

/// Vendor model catalog API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    /// API key; without it the adapter reports "not found" without network access
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_catalog_api_version")]
    pub api_version: String,

    /// Page size requested from the models endpoint
    #[serde(default = "default_catalog_limit")]
    pub limit: u32,
}

fn default_catalog_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_catalog_api_version() -> String {
    "2023-06-01".to_string()
}

const fn default_catalog_limit() -> u32 {
    100
}

impl Default for CatalogSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_catalog_base_url(),
            api_key: None,
            api_version: default_catalog_api_version(),
            limit: default_catalog_limit(),
        }
    }
}

/// Public web pages scanned for the target token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PagesSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Pages tried in order
    #[serde(default = "default_page_urls")]
    pub urls: Vec<String>,

    /// Text fragments longer than this (in characters) are ignored
    #[serde(default = "default_max_fragment_len")]
    pub max_fragment_len: usize,
}

fn default_page_urls() -> Vec<String> {
    vec![
        "https://www.anthropic.com/news".to_string(),
        "https://docs.anthropic.com/en/docs/about-claude/models/overview".to_string(),
        "https://www.anthropic.com/claude/sonnet".to_string(),
    ]
}

const fn default_max_fragment_len() -> usize {
    200
}

impl Default for PagesSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            urls: default_page_urls(),
            max_fragment_len: default_max_fragment_len(),
        }
    }
}

/// Forum search-by-date API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiscussionSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_discussion_base_url")]
    pub base_url: String,

    #[serde(default = "default_discussion_query")]
    pub query: String,

    /// Content type filter passed as `tags`
    #[serde(default = "default_discussion_tags")]
    pub tags: String,

    /// Number of most recent hits whose titles are inspected (1-100)
    #[serde(default = "default_hits_per_page")]
    pub hits_per_page: u32,

    /// Prefix joined with a hit's `objectID` to build its permalink
    #[serde(default = "default_permalink_base")]
    pub permalink_base: String,
}

fn default_discussion_base_url() -> String {
    "https://hn.algolia.com".to_string()
}

fn default_discussion_query() -> String {
    "sonnet 5".to_string()
}

fn default_discussion_tags() -> String {
    "story".to_string()
}

const fn default_hits_per_page() -> u32 {
    20
}

fn default_permalink_base() -> String {
    "https://news.ycombinator.com/item?id=".to_string()
}

impl Default for DiscussionSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_discussion_base_url(),
            query: default_discussion_query(),
            tags: default_discussion_tags(),
            hits_per_page: default_hits_per_page(),
            permalink_base: default_permalink_base(),
        }
    }
}

/// Code host releases and commits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReleasesSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_releases_base_url")]
    pub base_url: String,

    /// `owner/repo` entries tried in order
    #[serde(default = "default_repositories")]
    pub repositories: Vec<String>,

    /// Releases and commits fetched per repository
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Optional token to lift anonymous rate limits
    #[serde(default)]
    pub token: Option<String>,
}

fn default_releases_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_repositories() -> Vec<String> {
    vec![
        "anthropics/anthropic-sdk-python".to_string(),
        "anthropics/anthropic-sdk-typescript".to_string(),
        "anthropics/claude-code".to_string(),
    ]
}

const fn default_per_page() -> u32 {
    10
}

impl Default for ReleasesSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_releases_base_url(),
            repositories: default_repositories(),
            per_page: default_per_page(),
            token: None,
        }
    }
}

/// Notification channel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotifyConfig {
    #[serde(default)]
    pub push: PushConfig,

    #[serde(default)]
    pub topic: TopicConfig,
}

/// Web Push (VAPID) configuration; the channel is disabled without a private key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PushConfig {
    /// URL-safe base64 public key handed to browsers
    #[serde(default)]
    pub vapid_public_key: Option<String>,

    /// URL-safe base64 private key used to sign VAPID claims
    #[serde(default)]
    pub vapid_private_key: Option<String>,

    /// `sub` claim, usually a `mailto:` contact
    #[serde(default)]
    pub subject: Option<String>,

    /// Seconds the push service may hold an undelivered message
    #[serde(default = "default_push_ttl")]
    pub ttl_secs: u32,
}

const fn default_push_ttl() -> u32 {
    86_400
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            vapid_public_key: None,
            vapid_private_key: None,
            subject: None,
            ttl_secs: default_push_ttl(),
        }
    }
}

/// Public topic broadcast (ntfy-style `POST <url>`); disabled without a URL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TopicConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_topic_priority")]
    pub priority: String,

    #[serde(default = "default_topic_tags")]
    pub tags: String,
}

fn default_topic_priority() -> String {
    "high".to_string()
}

fn default_topic_tags() -> String {
    "tada,robot".to_string()
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            url: None,
            priority: default_topic_priority(),
            tags: default_topic_tags(),
        }
    }
}

/// Push subscription storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// `sqlite` or `memory`
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,
}

fn default_storage_backend() -> String {
    "sqlite".to_string()
}

fn default_database_path() -> String {
    ".dropwatch/subscriptions.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: default_database_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
