//! Encryption health checks over recent records.
//!
//! Reports whether stored fields decrypt without ever returning the
//! plaintext itself.

use serde::Serialize;
use uuid::Uuid;

use crate::crypto::{looks_encrypted, FieldCipher, UserCipher, DELIMITER};
use crate::error::Result;
use crate::storage::{CapsuleFilter, CapsuleRecord, CapsuleStore};

/// Health of one stored field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FieldCheck {
    /// Decrypts under the owner's key
    Ok,
    /// Has the envelope shape but does not decrypt
    Failed(String),
    /// Record is not flagged encrypted
    NotEncrypted,
    /// Record is flagged encrypted but the field is not a 3-part envelope
    MalformedEnvelope,
}

impl FieldCheck {
    pub fn is_healthy(&self) -> bool {
        matches!(self, FieldCheck::Ok | FieldCheck::NotEncrypted)
    }
}

impl std::fmt::Display for FieldCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldCheck::Ok => write!(f, "ok"),
            FieldCheck::Failed(reason) => write!(f, "failed ({})", reason),
            FieldCheck::NotEncrypted => write!(f, "not encrypted"),
            FieldCheck::MalformedEnvelope => write!(f, "malformed envelope"),
        }
    }
}

/// Diagnostic report for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordInspection {
    pub capsule_id: Uuid,
    pub user_id: String,
    pub is_encrypted: Option<bool>,
    /// Number of `:`-separated parts in the stored title
    pub title_parts: usize,
    pub title: FieldCheck,
    pub message: FieldCheck,
}

impl RecordInspection {
    pub fn is_healthy(&self) -> bool {
        self.title.is_healthy() && self.message.is_healthy()
    }
}

/// Inspect the `limit` most recently created records.
///
/// A record whose key cannot be derived reports both fields as failed.
pub fn inspect_recent(
    store: &dyn CapsuleStore,
    cipher: &FieldCipher,
    limit: usize,
) -> Result<Vec<RecordInspection>> {
    let records = store.list_records(&CapsuleFilter::new().newest_first().limit(limit))?;
    Ok(records
        .iter()
        .map(|record| inspect_record(cipher, record))
        .collect())
}

fn inspect_record(cipher: &FieldCipher, record: &CapsuleRecord) -> RecordInspection {
    let title_parts = record.title.split(DELIMITER).count();

    let (title, message) = if !record.is_flagged_encrypted() {
        (FieldCheck::NotEncrypted, FieldCheck::NotEncrypted)
    } else {
        match cipher.for_user(&record.user_id) {
            Ok(user_cipher) => (
                check_field(&user_cipher, &record.title),
                check_field(&user_cipher, &record.message),
            ),
            Err(err) => {
                let reason = format!("key derivation failed: {}", err);
                (FieldCheck::Failed(reason.clone()), FieldCheck::Failed(reason))
            }
        }
    };

    if !title.is_healthy() || !message.is_healthy() {
        tracing::warn!(capsule_id = %record.id, "capsule failed encryption check");
    }

    RecordInspection {
        capsule_id: record.id,
        user_id: record.user_id.clone(),
        is_encrypted: record.is_encrypted,
        title_parts,
        title,
        message,
    }
}

fn check_field(cipher: &UserCipher, value: &str) -> FieldCheck {
    if !looks_encrypted(value) {
        return FieldCheck::MalformedEnvelope;
    }
    match cipher.decrypt(value) {
        Ok(_) => FieldCheck::Ok,
        Err(err) => FieldCheck::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SharedSecret;
    use crate::storage::{NewCapsule, SqliteCapsuleStore};
    use chrono::{Duration, Utc};

    fn cipher() -> FieldCipher {
        FieldCipher::with_iterations(SharedSecret::new("s3cr3t").unwrap(), 1_000)
    }

    #[test]
    fn test_reports_each_condition() {
        let store = SqliteCapsuleStore::open_in_memory().unwrap();
        let cipher = cipher();
        let base = Utc::now();

        let mut legacy = NewCapsule::new("user-1", "Plain", "Body", base).into_legacy_record(base);
        legacy.created_at = base - Duration::minutes(3);
        store.insert_record(&legacy).unwrap();

        let mut healthy = NewCapsule::new("user-1", "T", "M", base).into_legacy_record(base);
        healthy.title = cipher.encrypt("Secret", "user-1").unwrap();
        healthy.message = cipher.encrypt("Body", "user-1").unwrap();
        healthy.is_encrypted = Some(true);
        healthy.created_at = base - Duration::minutes(2);
        store.insert_record(&healthy).unwrap();

        let mut broken = NewCapsule::new("user-1", "Plain title", "M", base).into_legacy_record(base);
        broken.message = cipher.encrypt("Body", "user-2").unwrap();
        broken.is_encrypted = Some(true);
        broken.created_at = base - Duration::minutes(1);
        store.insert_record(&broken).unwrap();

        let report = inspect_recent(&store, &cipher, 5).unwrap();
        assert_eq!(report.len(), 3);

        assert_eq!(report[0].capsule_id, broken.id);
        assert_eq!(report[0].title, FieldCheck::MalformedEnvelope);
        assert!(matches!(report[0].message, FieldCheck::Failed(_)));
        assert_eq!(report[0].title_parts, 1);
        assert!(!report[0].is_healthy());

        assert_eq!(report[1].capsule_id, healthy.id);
        assert_eq!(report[1].title, FieldCheck::Ok);
        assert_eq!(report[1].message, FieldCheck::Ok);
        assert_eq!(report[1].title_parts, 3);

        assert_eq!(report[2].capsule_id, legacy.id);
        assert_eq!(report[2].title, FieldCheck::NotEncrypted);
        assert_eq!(report[2].is_encrypted, None);
        assert!(report[2].is_healthy());
    }

    #[test]
    fn test_limit_applies() {
        let store = SqliteCapsuleStore::open_in_memory().unwrap();
        let now = Utc::now();
        for title in ["a", "b", "c"] {
            let record = NewCapsule::new("user-1", title, "m", now).into_legacy_record(now);
            store.insert_record(&record).unwrap();
        }

        assert_eq!(inspect_recent(&store, &cipher(), 2).unwrap().len(), 2);
    }

    #[test]
    fn test_report_never_contains_plaintext() {
        let store = SqliteCapsuleStore::open_in_memory().unwrap();
        let cipher = cipher();
        let now = Utc::now();
        let mut record = NewCapsule::new("user-1", "t", "m", now).into_legacy_record(now);
        record.title = cipher.encrypt("very private title", "user-1").unwrap();
        record.message = cipher.encrypt("very private message", "user-1").unwrap();
        record.is_encrypted = Some(true);
        store.insert_record(&record).unwrap();

        let report = inspect_recent(&store, &cipher, 1).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("very private"));
    }
}
