//! Path resolution for config and database files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, default_store_path, CapsuleConfig};

/// Resolve the config file path: `--config` / `CAPSULE_CONFIG`, then the XDG default.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.config.as_deref() {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    default_config_path()
}

/// Resolve the database path: `--db` / `CAPSULE_DB`, then config, then the XDG default.
pub fn resolve_store_path(cli: &Cli, config: Option<&CapsuleConfig>) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.db.as_deref() {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    if let Some(config) = config {
        return Ok(PathBuf::from(&config.store.path));
    }
    default_store_path()
}

/// Error message when the database file is missing.
pub fn missing_store_message(path: &Path) -> String {
    format!(
        "No capsule database found at {}\n\nRun:\n  capsule init\n\nOr specify a database path:\n  CAPSULE_DB=/path/to/capsules.db capsule init",
        path.display()
    )
}
