//! Per-user encryption at rest for capsule fields.
//!
//! This module provides the encryption core used by every read, write and
//! migration path:
//! - **SHA-256 + PBKDF2-HMAC-SHA256**: deterministic per-user key derivation
//!   from one shared secret (no per-record keys are stored)
//! - **AES-256-GCM**: authenticated encryption with a fresh 96-bit IV per call
//! - **Envelope**: `base64(iv):base64(tag):base64(ciphertext)` text encoding
//!
//! ## Security Model
//!
//! - The shared secret comes from the deployment environment and is never
//!   logged, persisted, or printed
//! - Derived keys live only for the duration of an operation or batch and
//!   are zeroized on drop
//! - Decryption never releases plaintext unless the tag verifies
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the capsule database
//! - Tampering with or transplanting stored envelopes between records/users
//!
//! We do NOT defend against:
//! - Disclosure of the shared secret
//! - A compromised application process

pub mod cipher;
pub mod envelope;
pub mod key;
pub mod secret;

pub use cipher::{FieldCipher, UserCipher};
pub use envelope::{looks_encrypted, Envelope, DELIMITER, IV_LENGTH, TAG_LENGTH};
pub use key::{derive_user_key, UserKey, KEY_LENGTH, PBKDF2_ITERATIONS};
pub use secret::{SharedSecret, SECRET_ENV_VAR};
