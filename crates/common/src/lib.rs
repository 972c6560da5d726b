//! PawTrace Common Utilities
//!
//! Shared infrastructure for all PawTrace crates:
//! - Error types and result aliases
//! - Frame clock for frame/second conversion and timestamp formatting
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
