//! # Capsule Core
//!
//! Core library for Capsule - sealed messages to your future self, encrypted
//! at rest under per-user keys.
//!
//! This crate provides the encryption core, the capsule record store and the
//! services built on them, independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **crypto**: Per-user key derivation and AES-256-GCM field envelopes
//! - **storage**: Record store trait, SQLite backend, lazy shared handle
//! - **capsule**: Field sealing and per-field revealing with placeholders
//! - **vault**: Create, list, open and delete capsules for their owner
//! - **migration**: One-time encryption of legacy plaintext records
//! - **notify**: Selection of capsules due for an unlock notification
//! - **diagnostics**: Encryption health checks without exposing plaintext
//! - **backup**: JSON export of raw records

pub mod backup;
pub mod capsule;
pub mod crypto;
pub mod diagnostics;
pub mod error;
pub mod fs;
pub mod migration;
pub mod notify;
pub mod storage;
pub mod vault;

pub use capsule::{
    reveal_record, CapsuleField, FieldOutcome, RevealedCapsule, MESSAGE_PLACEHOLDER,
    TITLE_PLACEHOLDER,
};
pub use crypto::{looks_encrypted, FieldCipher, SharedSecret, UserCipher, UserKey};
pub use error::{CapsuleError, Result};
pub use migration::{migrate_capsules, MigrationFailure, MigrationReport, MigrationScope};
pub use storage::{
    Attachment, CapsuleFilter, CapsuleRecord, CapsuleStore, LazyStore, NewCapsule,
    SqliteCapsuleStore,
};
pub use vault::{CapsuleSummary, Countdown, Vault};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
