//! Per-user key derivation.
//!
//! Keys are derived, never stored: the salt is the SHA-256 digest of the
//! user identifier and the shared secret is stretched through
//! PBKDF2-HMAC-SHA256. The same secret and user identifier always produce
//! the same key, which is what lets old records be decrypted without a
//! key-management store.

use hmac::Hmac;
use sha2::{Digest, Sha256};
use zeroize::ZeroizeOnDrop;

use super::secret::SharedSecret;
use crate::error::{CapsuleError, Result};

/// PBKDF2 iteration count for production keys.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256).
pub const KEY_LENGTH: usize = 32;

/// A 256-bit key derived for one user.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct UserKey {
    key: [u8; KEY_LENGTH],
}

impl UserKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive the encryption key for `user_id`.
///
/// # Arguments
///
/// * `secret` - The process-wide shared secret
/// * `user_id` - Stable identifier of the owning user
/// * `iterations` - PBKDF2 rounds (`PBKDF2_ITERATIONS` in production)
///
/// # Errors
///
/// Returns `CapsuleError::Validation` if `user_id` is empty or `iterations`
/// is zero, and `CapsuleError::Encryption` if PBKDF2 rejects its parameters.
pub fn derive_user_key(secret: &SharedSecret, user_id: &str, iterations: u32) -> Result<UserKey> {
    if user_id.is_empty() {
        return Err(CapsuleError::Validation(
            "User identifier cannot be empty".to_string(),
        ));
    }
    if iterations == 0 {
        return Err(CapsuleError::Validation(
            "PBKDF2 iteration count must be positive".to_string(),
        ));
    }

    let salt = Sha256::digest(user_id.as_bytes());

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(secret.expose_bytes(), &salt, iterations, &mut key_bytes)
        .map_err(|e| CapsuleError::Encryption(format!("Key derivation failed: {}", e)))?;

    Ok(UserKey::from_bytes(key_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST_ITERATIONS: u32 = 1_000;

    fn secret(value: &str) -> SharedSecret {
        SharedSecret::new(value).unwrap()
    }

    #[test]
    fn test_key_derivation_deterministic() {
        let secret = secret("s3cr3t");

        let key1 = derive_user_key(&secret, "user-42", PBKDF2_ITERATIONS).unwrap();
        let key2 = derive_user_key(&secret, "user-42", PBKDF2_ITERATIONS).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_user_different_key() {
        let secret = secret("s3cr3t");

        let key1 = derive_user_key(&secret, "user-1", FAST_ITERATIONS).unwrap();
        let key2 = derive_user_key(&secret, "user-2", FAST_ITERATIONS).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_secret_different_key() {
        let key1 = derive_user_key(&secret("secret-one"), "user-1", FAST_ITERATIONS).unwrap();
        let key2 = derive_user_key(&secret("secret-two"), "user-1", FAST_ITERATIONS).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_no_collisions_across_sample() {
        let secret = secret("s3cr3t");
        let mut seen = std::collections::HashSet::new();
        for i in 0..32 {
            let key = derive_user_key(&secret, &format!("user-{}", i), 10).unwrap();
            assert!(seen.insert(*key.as_bytes()));
        }
    }

    #[test]
    fn test_matches_manual_pbkdf2_over_sha256_salt() {
        let secret = secret("s3cr3t");
        let key = derive_user_key(&secret, "user-42", FAST_ITERATIONS).unwrap();

        let salt = Sha256::digest(b"user-42");
        let mut expected = [0u8; KEY_LENGTH];
        pbkdf2::pbkdf2::<Hmac<Sha256>>(b"s3cr3t", &salt, FAST_ITERATIONS, &mut expected).unwrap();

        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn test_empty_user_id_rejected() {
        let result = derive_user_key(&secret("s3cr3t"), "", FAST_ITERATIONS);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("User identifier cannot be empty"));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let result = derive_user_key(&secret("s3cr3t"), "user-1", 0);
        assert!(matches!(result, Err(CapsuleError::Validation(_))));
    }

    #[test]
    fn test_user_key_debug_redacts() {
        let key = derive_user_key(&secret("s3cr3t"), "user-1", FAST_ITERATIONS).unwrap();

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }
}
