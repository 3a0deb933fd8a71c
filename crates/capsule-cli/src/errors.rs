//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use capsule_core::CapsuleError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, database, capsule)
    NotFound { message: String, hint: String },

    /// Stored data failed verification or belongs to another user
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Required configuration is missing
    Config { message: String, hint: String },

    /// Capsule has not unlocked yet
    Locked(String),

    /// Migration left records unencrypted
    MigrationIncomplete(String),

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } | CliError::Config { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::Locked(message)
            | CliError::MigrationIncomplete(message)
            | CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Translate a core error into its CLI form, if it has one.
    pub fn from_core(err: &CapsuleError) -> Option<Self> {
        let mapped = match err {
            CapsuleError::Configuration(_) => CliError::Config {
                message: err.to_string(),
                hint: "Hint: Export ENCRYPTION_SECRET with the shared secret used to seal your capsules."
                    .to_string(),
            },
            CapsuleError::CapsuleNotFound(_) => CliError::not_found(
                err.to_string(),
                "Hint: Run `capsule list --user <USER>` to find capsule IDs.",
            ),
            CapsuleError::Authentication | CapsuleError::Format(_) => CliError::AuthFailed {
                message: err.to_string(),
                hint: Some(
                    "Hint: Run `capsule inspect` to check which capsules decrypt.".to_string(),
                ),
            },
            CapsuleError::Forbidden(_) => CliError::AuthFailed {
                message: err.to_string(),
                hint: None,
            },
            CapsuleError::Locked { .. } => CliError::Locked(err.to_string()),
            CapsuleError::Validation(_) | CapsuleError::InvalidInput(_) => {
                CliError::invalid_input(err.to_string())
            }
            _ => return None,
        };
        Some(mapped)
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::Config { .. } => exit_codes::CONFIG,
            CliError::Locked(_) => exit_codes::LOCKED,
            CliError::MigrationIncomplete(_) => exit_codes::MIGRATION_INCOMPLETE,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}
