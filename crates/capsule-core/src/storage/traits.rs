//! Storage trait definition.
//!
//! The `CapsuleStore` trait is the narrow record interface the vault,
//! migration, notification and diagnostics paths are written against. It
//! moves raw records: field values arrive already encrypted (or as legacy
//! plaintext) and leave exactly as stored.

use uuid::Uuid;

use super::types::{CapsuleFilter, CapsuleRecord};
use crate::error::Result;

/// Record storage for capsules.
///
/// Implementations must ensure:
/// - Field values are persisted byte-for-byte as given
/// - A missing encryption flag stays distinguishable from `false`
/// - Each call is atomic on its own; there is no cross-record transaction
pub trait CapsuleStore: Send + Sync {
    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::Storage` if a record with the same id exists.
    fn insert_record(&self, record: &CapsuleRecord) -> Result<()>;

    /// Get a record by ID.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(record))` if found, `Ok(None)` if not found.
    fn get_record(&self, id: &Uuid) -> Result<Option<CapsuleRecord>>;

    /// List records matching the filter.
    fn list_records(&self, filter: &CapsuleFilter) -> Result<Vec<CapsuleRecord>>;

    /// List records whose encryption flag is false or absent.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Restrict to one user, or `None` for every user
    fn list_unencrypted(&self, user_id: Option<&str>) -> Result<Vec<CapsuleRecord>>;

    /// Replace every stored field of an existing record.
    ///
    /// `updated_at` is set by the store.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::CapsuleNotFound` if no record has this id.
    fn update_record(&self, record: &CapsuleRecord) -> Result<()>;

    /// Delete a record.
    ///
    /// # Returns
    ///
    /// Returns `true` if a record was removed.
    fn delete_record(&self, id: &Uuid) -> Result<bool>;

    /// Set the email-sent flag on a record.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::CapsuleNotFound` if no record has this id.
    fn mark_email_sent(&self, id: &Uuid) -> Result<()>;

    /// Total number of stored records.
    fn count_records(&self) -> Result<usize>;
}
