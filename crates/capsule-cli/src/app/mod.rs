//! Application-level utilities for the Capsule CLI.
//!
//! This module provides:
//! - Path resolution for config and database files
//! - A context that lazily loads config, the cipher and the store

mod context;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use resolver::{missing_store_message, resolve_config_path, resolve_store_path};
