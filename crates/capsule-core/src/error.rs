//! Error types for Capsule core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Capsule operations.
pub type Result<T> = std::result::Result<T, CapsuleError>;

/// Core error type for Capsule operations.
#[derive(Debug, Error)]
pub enum CapsuleError {
    /// Required configuration (the shared encryption secret) is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Stored value does not have the `iv:tag:ciphertext` envelope shape
    #[error("Format error: {0}")]
    Format(String),

    /// Authentication tag did not verify (wrong key, tampered or foreign data)
    #[error("Authentication failed: encrypted data could not be verified")]
    Authentication,

    /// Failure on the encrypt path
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Capsule not found (or not visible to the requesting user)
    #[error("Capsule not found: {0}")]
    CapsuleNotFound(Uuid),

    /// Capsule belongs to another user
    #[error("Forbidden: capsule {0} belongs to another user")]
    Forbidden(Uuid),

    /// Capsule unlock date has not passed yet
    #[error("Capsule {id} is still locked until {unlock_date}")]
    Locked {
        id: Uuid,
        unlock_date: chrono::DateTime<chrono::Utc>,
    },

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl CapsuleError {
    /// True for the decrypt failures a read path downgrades to a placeholder.
    ///
    /// Format and authentication failures both mean "this field's plaintext
    /// cannot be recovered"; callers do not distinguish them for end users.
    pub fn is_unrecoverable_field(&self) -> bool {
        matches!(self, CapsuleError::Format(_) | CapsuleError::Authentication)
    }

    /// Short stable label for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            CapsuleError::Configuration(_) => "configuration",
            CapsuleError::Format(_) => "format",
            CapsuleError::Authentication => "authentication",
            CapsuleError::Encryption(_) => "encryption",
            CapsuleError::Validation(_) => "validation",
            CapsuleError::CapsuleNotFound(_) => "not_found",
            CapsuleError::Forbidden(_) => "forbidden",
            CapsuleError::Locked { .. } => "locked",
            CapsuleError::Storage(_) | CapsuleError::Sqlite { .. } => "storage",
            CapsuleError::InvalidInput(_) => "invalid_input",
            CapsuleError::Io { .. } => "io",
            CapsuleError::Json { .. } => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypt_failures_are_unrecoverable_fields() {
        assert!(CapsuleError::Format("bad".to_string()).is_unrecoverable_field());
        assert!(CapsuleError::Authentication.is_unrecoverable_field());
        assert!(!CapsuleError::Encryption("boom".to_string()).is_unrecoverable_field());
        assert!(!CapsuleError::Configuration("missing".to_string()).is_unrecoverable_field());
    }

    #[test]
    fn test_authentication_message_has_no_detail() {
        let message = CapsuleError::Authentication.to_string();
        assert!(message.contains("could not be verified"));
    }
}
