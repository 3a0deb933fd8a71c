//! One-time migration of legacy plaintext capsules to encrypted records.
//!
//! Selects every record whose encryption flag is false or absent, seals its
//! fields under the owner's key, sets the flag and writes it back. Records
//! are processed one at a time; a failure is logged and counted and the
//! batch moves on. Running the migration again only touches records that
//! are still unflagged, so it is safe to repeat.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::capsule::seal_fields;
use crate::crypto::{FieldCipher, UserCipher};
use crate::error::Result;
use crate::storage::{CapsuleRecord, CapsuleStore};

/// Which records a migration run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationScope {
    AllUsers,
    User(String),
}

impl MigrationScope {
    fn user_id(&self) -> Option<&str> {
        match self {
            MigrationScope::AllUsers => None,
            MigrationScope::User(id) => Some(id),
        }
    }
}

/// A record the migration could not encrypt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFailure {
    pub capsule_id: Uuid,
    pub reason: String,
}

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Records selected for migration
    pub total: usize,
    /// Records encrypted and written back
    pub encrypted: usize,
    pub failed: Vec<MigrationFailure>,
}

impl MigrationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Encrypt every legacy record in `scope`.
///
/// # Errors
///
/// Only the initial selection can fail the run; per-record failures end up
/// in `MigrationReport::failed`.
pub fn migrate_capsules(
    store: &dyn CapsuleStore,
    cipher: &FieldCipher,
    scope: &MigrationScope,
) -> Result<MigrationReport> {
    let pending = store.list_unencrypted(scope.user_id())?;
    let mut report = MigrationReport {
        total: pending.len(),
        ..MigrationReport::default()
    };

    if pending.is_empty() {
        tracing::info!("no capsules need encryption");
        return Ok(report);
    }
    tracing::info!(count = pending.len(), "encrypting legacy capsules");

    let mut keys: HashMap<String, UserCipher> = HashMap::new();

    for record in pending {
        let capsule_id = record.id;
        match migrate_record(store, cipher, &mut keys, record) {
            Ok(()) => {
                report.encrypted += 1;
                tracing::debug!(capsule_id = %capsule_id, "capsule encrypted");
            }
            Err(err) => {
                tracing::error!(
                    capsule_id = %capsule_id,
                    error = %err,
                    "failed to encrypt capsule"
                );
                report.failed.push(MigrationFailure {
                    capsule_id,
                    reason: err.to_string(),
                });
            }
        }
    }

    tracing::info!(
        total = report.total,
        encrypted = report.encrypted,
        failed = report.failed.len(),
        "migration finished"
    );
    Ok(report)
}

fn migrate_record(
    store: &dyn CapsuleStore,
    cipher: &FieldCipher,
    keys: &mut HashMap<String, UserCipher>,
    mut record: CapsuleRecord,
) -> Result<()> {
    let user_cipher = match keys.get(&record.user_id) {
        Some(existing) => existing.clone(),
        None => {
            let derived = cipher.for_user(&record.user_id)?;
            keys.insert(record.user_id.clone(), derived.clone());
            derived
        }
    };

    seal_fields(&user_cipher, &mut record)?;
    store.update_record(&record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SharedSecret;
    use crate::storage::{Attachment, NewCapsule, SqliteCapsuleStore};
    use chrono::Utc;

    fn cipher() -> FieldCipher {
        FieldCipher::with_iterations(SharedSecret::new("s3cr3t").unwrap(), 1_000)
    }

    fn insert_legacy(store: &SqliteCapsuleStore, user: &str, title: &str) -> Uuid {
        let now = Utc::now();
        let record = NewCapsule::new(user, title, "message", now).into_legacy_record(now);
        store.insert_record(&record).unwrap();
        record.id
    }

    #[test]
    fn test_empty_store_reports_nothing() {
        let store = SqliteCapsuleStore::open_in_memory().unwrap();
        let report = migrate_capsules(&store, &cipher(), &MigrationScope::AllUsers).unwrap();
        assert_eq!(report, MigrationReport::default());
        assert!(report.is_complete());
    }

    #[test]
    fn test_encrypts_all_fields_and_sets_flag() {
        let store = SqliteCapsuleStore::open_in_memory().unwrap();
        let cipher = cipher();
        let now = Utc::now();
        let record = NewCapsule::new("user-1", "Title", "Body", now)
            .with_attachment(Attachment::new("aGVsbG8=").with_name("a.txt"))
            .into_legacy_record(now);
        store.insert_record(&record).unwrap();

        let report = migrate_capsules(&store, &cipher, &MigrationScope::AllUsers).unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.encrypted, 1);

        let stored = store.get_record(&record.id).unwrap().unwrap();
        assert_eq!(stored.is_encrypted, Some(true));
        assert_eq!(cipher.decrypt(&stored.title, "user-1").unwrap(), "Title");
        assert_eq!(cipher.decrypt(&stored.message, "user-1").unwrap(), "Body");
        assert_eq!(
            cipher
                .decrypt(stored.attachment.as_deref().unwrap(), "user-1")
                .unwrap(),
            "aGVsbG8="
        );
        assert_eq!(stored.attachment_name.as_deref(), Some("a.txt"));
    }

    #[test]
    fn test_user_scope_leaves_others_alone() {
        let store = SqliteCapsuleStore::open_in_memory().unwrap();
        let mine = insert_legacy(&store, "user-1", "mine");
        let theirs = insert_legacy(&store, "user-2", "theirs");

        let report =
            migrate_capsules(&store, &cipher(), &MigrationScope::User("user-1".to_string()))
                .unwrap();
        assert_eq!(report.encrypted, 1);

        assert!(store.get_record(&mine).unwrap().unwrap().is_flagged_encrypted());
        let untouched = store.get_record(&theirs).unwrap().unwrap();
        assert_eq!(untouched.is_encrypted, None);
        assert_eq!(untouched.title, "theirs");
    }

    #[test]
    fn test_failures_are_counted_and_batch_continues() {
        let store = SqliteCapsuleStore::open_in_memory().unwrap();
        let bad = insert_legacy(&store, "", "orphan");
        let good = insert_legacy(&store, "user-1", "fine");

        let report = migrate_capsules(&store, &cipher(), &MigrationScope::AllUsers).unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.encrypted, 1);
        assert!(!report.is_complete());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].capsule_id, bad);
        assert!(store.get_record(&good).unwrap().unwrap().is_flagged_encrypted());
        assert_eq!(store.get_record(&bad).unwrap().unwrap().title, "orphan");
    }
}
