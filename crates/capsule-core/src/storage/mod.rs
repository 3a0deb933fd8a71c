//! Storage abstraction and backends.
//!
//! The storage layer persists raw capsule records. It never encrypts or
//! decrypts; the vault and migration layers hand it envelopes.

mod lazy;
mod sqlite;
mod traits;
mod types;

pub use lazy::LazyStore;
pub use sqlite::{SqliteCapsuleStore, FORMAT_VERSION};
pub use traits::CapsuleStore;
pub use types::{Attachment, CapsuleFilter, CapsuleRecord, NewCapsule, RecordOrder};
