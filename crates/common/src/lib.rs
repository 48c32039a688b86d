//! Gazemap Common Utilities
//!
//! Shared infrastructure for all Gazemap crates:
//! - Error types and result aliases
//! - Session clock and publish cadence
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
