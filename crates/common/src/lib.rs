//! Evtape Common Utilities
//!
//! Shared infrastructure for all evtape crates:
//! - Error types and result aliases
//! - Cooperative cancellation flag and SIGINT wiring
//! - Tracing/logging initialization
//! - Configuration loading

pub mod cancel;
pub mod config;
pub mod error;
pub mod logging;

pub use cancel::*;
pub use config::*;
pub use error::*;
