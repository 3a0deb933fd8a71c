//! The process-wide shared encryption secret.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{CapsuleError, Result};

/// Environment variable the shared secret is read from.
pub const SECRET_ENV_VAR: &str = "ENCRYPTION_SECRET";

/// Shared secret every per-user key is stretched from.
///
/// Supplied once at process start; immutable afterwards.
pub struct SharedSecret {
    value: SecretString,
}

impl SharedSecret {
    /// Wrap an explicit secret value.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::Configuration` if the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(CapsuleError::Configuration(format!(
                "{} is empty",
                SECRET_ENV_VAR
            )));
        }
        Ok(Self {
            value: SecretString::from(value),
        })
    }

    /// Read the secret from `ENCRYPTION_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::Configuration` if the variable is unset, empty,
    /// or not valid Unicode. Callers treat this as fatal.
    pub fn from_env() -> Result<Self> {
        match std::env::var(SECRET_ENV_VAR) {
            Ok(value) if !value.is_empty() => Self::new(value),
            _ => Err(CapsuleError::Configuration(format!(
                "{} is not defined in environment variables",
                SECRET_ENV_VAR
            ))),
        }
    }

    pub(crate) fn expose_bytes(&self) -> &[u8] {
        self.value.expose_secret().as_bytes()
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("value", &"[REDACTED]")
            .finish()
    }
}
