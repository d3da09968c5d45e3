//! Domain layer for dropwatch
//!
//! This module contains the detection data model, configuration model
//! and the port traits implemented by adapters.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
