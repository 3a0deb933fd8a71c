//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying capsules
//! in various formats (JSON, table, plain text).

mod json;
mod text;

// Re-export public API
pub use json::print_json;
pub use text::{
    inspection_table, notice_table, print_capsule, print_migration_report, summary_table,
};
