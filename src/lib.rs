//! Dropwatch - multi-source launch watcher
//!
//! Dropwatch polls several independent public sources for the first sign
//! that "Sonnet 5" is available, serves the latest result over a small HTTP
//! API, and announces the launch exactly once per process.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, port traits and errors
//! - **Service Layer** (`services`): classifier, aggregator, scheduler, notifier
//! - **Adapters** (`adapters`): upstream sources, notification channels,
//!   subscription stores and the HTTP API
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, composition
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use dropwatch::{AppContext, ConfigLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let context = AppContext::build(ConfigLoader::load()?).await?;
//!     let snapshot = context.scheduler.check_or_current().await;
//!     println!("found: {}", snapshot.found);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{CheckResult, Config, PushSubscription, StatusSnapshot};
pub use domain::ports::{PushSender, SourceAdapter, SubscriptionStore, TopicPublisher};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::AppContext;
pub use services::{Aggregator, CheckScheduler, Notifier};
