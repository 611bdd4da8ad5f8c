//! Shared test utilities for the gfs-fetcher workspace.
//!
//! This crate provides:
//! - Fixed clocks for morning/afternoon invocations
//! - Bounding boxes and YAML configs used across tests
//! - Temporary directory helpers
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../../crates/test-utils" }
//! ```

pub mod fixtures;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use paths::*;
