//! JSON export of raw capsule records.
//!
//! The export carries records exactly as stored: encrypted fields stay
//! sealed, so a backup file is as safe to hold as the database itself.

use std::path::Path;

use crate::error::Result;
use crate::fs::write_atomic;
use crate::storage::{CapsuleFilter, CapsuleRecord, CapsuleStore};

/// Write every record to `destination` as pretty-printed JSON.
///
/// The file is replaced atomically. Returns the number of records written.
pub fn export_backup(store: &dyn CapsuleStore, destination: &Path) -> Result<usize> {
    let records = store.list_records(&CapsuleFilter::new())?;
    let json = serde_json::to_vec_pretty(&records)?;
    write_atomic(destination, &json)?;

    tracing::info!(
        count = records.len(),
        destination = %destination.display(),
        "capsule backup written"
    );
    Ok(records.len())
}

/// Read a backup file produced by `export_backup`.
pub fn read_backup(path: &Path) -> Result<Vec<CapsuleRecord>> {
    let contents = std::fs::read(path)?;
    Ok(serde_json::from_slice(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{FieldCipher, SharedSecret};
    use crate::storage::{NewCapsule, SqliteCapsuleStore};
    use crate::vault::Vault;
    use chrono::{Duration, Utc};

    #[test]
    fn test_export_keeps_fields_sealed() {
        let store = SqliteCapsuleStore::open_in_memory().unwrap();
        let cipher = FieldCipher::with_iterations(SharedSecret::new("s3cr3t").unwrap(), 1_000);
        let vault = Vault::new(&store, &cipher);
        let record = vault
            .create_capsule(NewCapsule::new(
                "user-1",
                "Hidden title",
                "Hidden message",
                Utc::now() + Duration::days(1),
            ))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("backups").join("capsules.json");
        let count = export_backup(&store, &dest).unwrap();

        assert_eq!(count, 1);
        let text = std::fs::read_to_string(&dest).unwrap();
        assert!(!text.contains("Hidden"));

        let restored = read_backup(&dest).unwrap();
        assert_eq!(restored, vec![store.get_record(&record.id).unwrap().unwrap()]);
    }

    #[test]
    fn test_export_empty_store() {
        let store = SqliteCapsuleStore::open_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("empty.json");

        assert_eq!(export_backup(&store, &dest).unwrap(), 0);
        assert!(read_backup(&dest).unwrap().is_empty());
    }
}
