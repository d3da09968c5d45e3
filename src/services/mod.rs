pub mod aggregator;
pub mod check_scheduler;
pub mod classifier;
pub mod notifier;

pub use aggregator::Aggregator;
pub use check_scheduler::{CheckScheduler, SchedulerHandle};
pub use classifier::Classification;
pub use notifier::Notifier;
