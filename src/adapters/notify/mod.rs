//! Notification channel adapters.

pub mod topic;
pub mod web_push;

pub use topic::NtfyTopicPublisher;
pub use web_push::WebPushSender;
