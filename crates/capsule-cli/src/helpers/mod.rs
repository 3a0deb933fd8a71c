//! Input and parsing helper functions for the CLI.
//!
//! This module provides utilities for:
//! - Datetime, day and capsule ID parsing (`parsing`)
//! - Attachment file loading and saving (`attachment`)

mod attachment;
mod parsing;

// Re-export public API
pub use attachment::{load_attachment, save_attachment};
pub use parsing::{parse_capsule_id, parse_datetime, parse_day};
