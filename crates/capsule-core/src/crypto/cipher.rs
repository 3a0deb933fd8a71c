//! AES-256-GCM field encryption under per-user keys.
//!
//! `FieldCipher` is the entry point: it owns the shared secret and exposes
//! `encrypt`, `decrypt` and `derive_user_key` keyed by user identifier.
//! Key derivation dominates the cost of every call, so batch callers use
//! `FieldCipher::for_user` to derive once and reuse the resulting
//! `UserCipher` for every field of a record or listing.

use std::sync::Arc;

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use aes_gcm::Aes256Gcm;

use super::envelope::{Envelope, IV_LENGTH, TAG_LENGTH};
use super::key::{derive_user_key, UserKey, PBKDF2_ITERATIONS};
use super::secret::SharedSecret;
use crate::error::{CapsuleError, Result};

/// Encrypts and decrypts capsule fields for any user.
///
/// Stateless apart from the read-only secret; cheap to clone and safe to
/// share across threads.
#[derive(Clone)]
pub struct FieldCipher {
    secret: Arc<SharedSecret>,
    iterations: u32,
}

impl FieldCipher {
    /// Create a cipher over an explicit secret with production KDF settings.
    pub fn new(secret: SharedSecret) -> Self {
        Self {
            secret: Arc::new(secret),
            iterations: PBKDF2_ITERATIONS,
        }
    }

    /// Create a cipher from `ENCRYPTION_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::Configuration` if the secret is missing.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(SharedSecret::from_env()?))
    }

    /// Create a cipher with a non-default PBKDF2 iteration count.
    ///
    /// Envelopes produced under one iteration count cannot be opened under
    /// another; production data always uses `PBKDF2_ITERATIONS`.
    pub fn with_iterations(secret: SharedSecret, iterations: u32) -> Self {
        Self {
            secret: Arc::new(secret),
            iterations,
        }
    }

    /// Derive the 256-bit key for `user_id`.
    pub fn derive_user_key(&self, user_id: &str) -> Result<UserKey> {
        derive_user_key(&self.secret, user_id, self.iterations)
    }

    /// Derive the key for `user_id` once and bind it to a reusable cipher.
    pub fn for_user(&self, user_id: &str) -> Result<UserCipher> {
        let key = self.derive_user_key(user_id)?;
        Ok(UserCipher {
            user_id: user_id.to_string(),
            key,
        })
    }

    /// Encrypt `plaintext` for `user_id` into an `iv:tag:ciphertext` envelope.
    ///
    /// Empty plaintext passes through as an empty string without deriving a key.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::Encryption` on any cipher failure and
    /// `CapsuleError::Validation` for an empty user identifier.
    pub fn encrypt(&self, plaintext: &str, user_id: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        self.for_user(user_id)?.encrypt(plaintext)
    }

    /// Decrypt an envelope produced by `encrypt` for the same `user_id`.
    ///
    /// Empty input passes through as an empty string. The envelope shape is
    /// checked before any key is derived.
    ///
    /// # Errors
    ///
    /// - `CapsuleError::Format` if the value is not a well-formed envelope
    /// - `CapsuleError::Authentication` if the tag does not verify
    pub fn decrypt(&self, envelope: &str, user_id: &str) -> Result<String> {
        if envelope.is_empty() {
            return Ok(String::new());
        }
        let parsed = Envelope::parse(envelope)?;
        let key = self.derive_user_key(user_id)?;
        open(&key, &parsed)
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("secret", &"[REDACTED]")
            .field("iterations", &self.iterations)
            .finish()
    }
}

/// A `FieldCipher` bound to one user's derived key.
#[derive(Debug, Clone)]
pub struct UserCipher {
    user_id: String,
    key: UserKey,
}

impl UserCipher {
    /// The user this cipher's key belongs to.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Encrypt with the bound key. Empty plaintext yields an empty string.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        Ok(seal(&self.key, plaintext.as_bytes())?.encode())
    }

    /// Decrypt with the bound key. Empty input yields an empty string.
    pub fn decrypt(&self, envelope: &str) -> Result<String> {
        if envelope.is_empty() {
            return Ok(String::new());
        }
        let parsed = Envelope::parse(envelope)?;
        open(&self.key, &parsed)
    }
}

fn seal(key: &UserKey, plaintext: &[u8]) -> Result<Envelope> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CapsuleError::Encryption(format!("invalid key length: {}", e)))?;

    // Fresh IV per call; never reused under the same key.
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, b"", &mut buffer)
        .map_err(|e| CapsuleError::Encryption(format!("Failed to encrypt data: {}", e)))?;

    let mut iv = [0u8; IV_LENGTH];
    iv.copy_from_slice(&nonce);
    let mut tag_bytes = [0u8; TAG_LENGTH];
    tag_bytes.copy_from_slice(&tag);

    Ok(Envelope {
        iv,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

fn open(key: &UserKey, envelope: &Envelope) -> Result<String> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CapsuleError::Encryption(format!("invalid key length: {}", e)))?;

    let mut buffer = envelope.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&envelope.iv),
            b"",
            &mut buffer,
            GenericArray::from_slice(&envelope.tag),
        )
        .map_err(|_| CapsuleError::Authentication)?;

    String::from_utf8(buffer)
        .map_err(|_| CapsuleError::Format("decrypted data is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::looks_encrypted;

    fn cipher() -> FieldCipher {
        FieldCipher::with_iterations(SharedSecret::new("s3cr3t").unwrap(), 1_000)
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let cipher = cipher();
        let encrypted = cipher.encrypt("Hello, future me.", "user-1").unwrap();
        let decrypted = cipher.decrypt(&encrypted, "user-1").unwrap();
        assert_eq!(decrypted, "Hello, future me.");
    }

    #[test]
    fn test_empty_input_passes_through() {
        let cipher = cipher();
        assert_eq!(cipher.encrypt("", "user-1").unwrap(), "");
        assert_eq!(cipher.decrypt("", "user-1").unwrap(), "");
    }

    #[test]
    fn test_empty_plaintext_skips_user_validation() {
        // No key is derived for empty input, so an empty user id is not an error here.
        let cipher = cipher();
        assert_eq!(cipher.encrypt("", "").unwrap(), "");
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let cipher = cipher();
        let first = cipher.encrypt("same plaintext", "user-1").unwrap();
        let second = cipher.encrypt("same plaintext", "user-1").unwrap();

        assert_ne!(first, second);
        assert_eq!(cipher.decrypt(&first, "user-1").unwrap(), "same plaintext");
        assert_eq!(cipher.decrypt(&second, "user-1").unwrap(), "same plaintext");
    }

    #[test]
    fn test_wrong_user_fails_authentication() {
        let cipher = cipher();
        let encrypted = cipher.encrypt("private", "user-1").unwrap();
        let result = cipher.decrypt(&encrypted, "user-2");
        assert!(matches!(result, Err(CapsuleError::Authentication)));
    }

    #[test]
    fn test_wrong_secret_fails_authentication() {
        let encrypted = cipher().encrypt("private", "user-1").unwrap();
        let other = FieldCipher::with_iterations(SharedSecret::new("other").unwrap(), 1_000);
        let result = other.decrypt(&encrypted, "user-1");
        assert!(matches!(result, Err(CapsuleError::Authentication)));
    }

    #[test]
    fn test_malformed_envelope_checked_before_key_derivation() {
        // An empty user id would fail key derivation; the format error wins.
        let cipher = cipher();
        assert!(matches!(
            cipher.decrypt("not:enough", ""),
            Err(CapsuleError::Format(_))
        ));
        assert!(matches!(
            cipher.decrypt("a:b:c:d", ""),
            Err(CapsuleError::Format(_))
        ));
    }

    #[test]
    fn test_user_cipher_matches_field_cipher() {
        let cipher = cipher();
        let bound = cipher.for_user("user-1").unwrap();
        assert_eq!(bound.user_id(), "user-1");

        let from_bound = bound.encrypt("title").unwrap();
        assert_eq!(cipher.decrypt(&from_bound, "user-1").unwrap(), "title");

        let from_field = cipher.encrypt("message", "user-1").unwrap();
        assert_eq!(bound.decrypt(&from_field).unwrap(), "message");
    }

    #[test]
    fn test_unicode_round_trip() {
        let cipher = cipher();
        let plaintext = "Dear me, 2030 \u{1F680} \u{00E9}t\u{00E9} \u{65E5}\u{672C}";
        let encrypted = cipher.encrypt(plaintext, "user-1").unwrap();
        assert!(looks_encrypted(&encrypted));
        assert_eq!(cipher.decrypt(&encrypted, "user-1").unwrap(), plaintext);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug_output = format!("{:?}", cipher());
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("s3cr3t"));
    }
}
