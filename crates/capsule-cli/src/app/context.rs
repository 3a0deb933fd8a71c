//! Application context for the Capsule CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config file, field cipher and record store.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use capsule_core::notify::DEFAULT_BASE_URL;
use capsule_core::{FieldCipher, LazyStore, SqliteCapsuleStore};

use crate::cli::Cli;
use crate::config::{read_config, CapsuleConfig};
use crate::errors::CliError;

use super::resolver::{missing_store_message, resolve_config_path, resolve_store_path};

/// Application context that bundles CLI args with everything handlers need.
///
/// Nothing is loaded until a handler asks for it, so commands such as
/// `completions` never touch the secret or the database.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<CapsuleConfig>>,
    cipher: OnceCell<FieldCipher>,
    store: OnceCell<LazyStore>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            cipher: OnceCell::new(),
            store: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file, if one exists.
    pub fn config(&self) -> anyhow::Result<Option<&CapsuleConfig>> {
        let config = self.config.get_or_try_init(|| -> anyhow::Result<_> {
            let path = resolve_config_path(self.cli)?;
            if !path.exists() {
                return Ok(None);
            }
            Ok(Some(read_config(&path)?))
        })?;
        Ok(config.as_ref())
    }

    /// Database path after applying flag, env and config precedence.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        resolve_store_path(self.cli, self.config()?)
    }

    /// Base URL for unlock links.
    pub fn base_url(&self) -> anyhow::Result<String> {
        Ok(self
            .config()?
            .map(|c| c.notify.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
    }

    /// The field cipher over `ENCRYPTION_SECRET`.
    pub fn cipher(&self) -> anyhow::Result<&FieldCipher> {
        self.cipher
            .get_or_try_init(|| -> anyhow::Result<FieldCipher> { Ok(FieldCipher::from_env()?) })
    }

    /// The record store. The database must already exist.
    pub fn store(&self) -> anyhow::Result<&SqliteCapsuleStore> {
        let lazy = self.store.get_or_try_init(|| -> anyhow::Result<_> {
            let path = self.store_path()?;
            if !path.exists() {
                return Err(CliError::not_found(
                    missing_store_message(&path),
                    "Hint: Run `capsule init` to create the database.",
                )
                .into());
            }
            tracing::debug!(path = %path.display(), "resolved capsule database");
            Ok(LazyStore::sqlite(path))
        })?;
        Ok(lazy.get()?)
    }
}
