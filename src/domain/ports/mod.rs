//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - SourceAdapter: one external surface reduced to a `CheckResult`
//! - SubscriptionStore: keyed storage of push subscriptions
//! - PushSender / TopicPublisher: notification delivery channels
//!
//! These traits let the detection and notification services stay
//! independent of the upstream APIs and storage backends.

pub mod notification_channel;
pub mod source_adapter;
pub mod subscription_store;

pub use notification_channel::{PushSender, TopicPublisher};
pub use source_adapter::SourceAdapter;
pub use subscription_store::SubscriptionStore;
