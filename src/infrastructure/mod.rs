//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - Service composition from configuration

pub mod bootstrap;
pub mod config;
pub mod logging;

pub use bootstrap::AppContext;
