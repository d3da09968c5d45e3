pub mod check;
pub mod config;
pub mod notification;
pub mod subscription;

pub use check::{CheckResult, StatusSnapshot};
pub use config::{
    CatalogSourceConfig, Config, DiscussionSourceConfig, HttpClientConfig, LoggingConfig,
    NotifyConfig, PagesSourceConfig, PushConfig, ReleasesSourceConfig, ScheduleConfig,
    ServerConfig, SourcesConfig, StorageConfig, TopicConfig,
};
pub use notification::{Announcement, DeliveryOutcome, NotifySummary, PushSummary};
pub use subscription::{PushSubscription, SubscriptionKeys};
