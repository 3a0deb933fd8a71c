//! SQLite storage backend.
//!
//! Records live in a single `capsules` table. Field-level encryption happens
//! above this layer, so the database file itself is a plain SQLite file whose
//! sensitive columns hold envelopes.

mod row;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, ErrorCode, OptionalExtension};
use uuid::Uuid;

use crate::error::{CapsuleError, Result};
use crate::storage::traits::CapsuleStore;
use crate::storage::types::{CapsuleFilter, CapsuleRecord, RecordOrder};

use row::{format_timestamp, CapsuleRow, CAPSULE_COLUMNS};

/// Current on-disk format version, recorded in the `meta` table.
pub const FORMAT_VERSION: &str = "0.1";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS capsules (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        message TEXT NOT NULL,
        unlock_date TEXT NOT NULL,
        attachment TEXT,
        attachment_name TEXT,
        attachment_type TEXT,
        -- NULL marks a legacy record written before the flag existed
        is_encrypted INTEGER,
        is_email_sent INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS capsules_user_id ON capsules (user_id);
    CREATE INDEX IF NOT EXISTS capsules_unlock_date ON capsules (unlock_date);
"#;

/// SQLite-backed capsule store.
pub struct SqliteCapsuleStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteCapsuleStore {
    /// Open (or create) a store at `path`, creating parent directories and
    /// the schema as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CapsuleError::Storage(format!(
                        "Failed to create store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        tracing::debug!(path = %path.display(), "opened capsule store");

        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    /// Backing file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Format version recorded when the store was created.
    pub fn format_version(&self) -> Result<String> {
        let conn = self.lock_conn()?;
        let version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?)",
            [FORMAT_VERSION],
        )?;
        Ok(())
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CapsuleError::Storage("SQLite connection poisoned".to_string()))
    }

    fn query_records(
        conn: &Connection,
        query: &str,
        params: &[Box<dyn rusqlite::ToSql>],
    ) -> Result<Vec<CapsuleRecord>> {
        let mut stmt = conn.prepare(query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            CapsuleRow::from_sql,
        )?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }
}

impl CapsuleStore for SqliteCapsuleStore {
    fn insert_record(&self, record: &CapsuleRecord) -> Result<()> {
        let conn = self.lock_conn()?;

        let result = conn.execute(
            &format!(
                "INSERT INTO capsules ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                CAPSULE_COLUMNS
            ),
            rusqlite::params![
                record.id.to_string(),
                record.user_id,
                record.title,
                record.message,
                format_timestamp(&record.unlock_date),
                record.attachment,
                record.attachment_name,
                record.attachment_type,
                record.is_encrypted,
                record.is_email_sent,
                format_timestamp(&record.created_at),
                format_timestamp(&record.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(CapsuleError::Storage(format!(
                    "Capsule {} already exists",
                    record.id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_record(&self, id: &Uuid) -> Result<Option<CapsuleRecord>> {
        let conn = self.lock_conn()?;

        let row = conn
            .query_row(
                &format!("SELECT {} FROM capsules WHERE id = ?", CAPSULE_COLUMNS),
                [id.to_string()],
                CapsuleRow::from_sql,
            )
            .optional()?;

        row.map(CapsuleRecord::try_from).transpose()
    }

    fn list_records(&self, filter: &CapsuleFilter) -> Result<Vec<CapsuleRecord>> {
        let conn = self.lock_conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref user_id) = filter.user_id {
            conditions.push("user_id = ?");
            params.push(Box::new(user_id.clone()));
        }

        if let Some(since) = filter.unlock_since {
            conditions.push("unlock_date >= ?");
            params.push(Box::new(format_timestamp(&since)));
        }

        if let Some(until) = filter.unlock_until {
            conditions.push("unlock_date <= ?");
            params.push(Box::new(format_timestamp(&until)));
        }

        if let Some(sent) = filter.email_sent {
            conditions.push("is_email_sent = ?");
            params.push(Box::new(sent));
        }

        let mut query = format!("SELECT {} FROM capsules", CAPSULE_COLUMNS);
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        match filter.order {
            RecordOrder::UnlockDate => query.push_str(" ORDER BY unlock_date ASC, created_at ASC"),
            RecordOrder::NewestFirst => query.push_str(" ORDER BY created_at DESC"),
        }

        if let Some(limit) = filter.limit {
            query.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        Self::query_records(&conn, &query, &params)
    }

    fn list_unencrypted(&self, user_id: Option<&str>) -> Result<Vec<CapsuleRecord>> {
        let conn = self.lock_conn()?;

        let mut query = format!(
            "SELECT {} FROM capsules WHERE (is_encrypted IS NULL OR is_encrypted = 0)",
            CAPSULE_COLUMNS
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(user_id) = user_id {
            query.push_str(" AND user_id = ?");
            params.push(Box::new(user_id.to_string()));
        }
        query.push_str(" ORDER BY created_at ASC");

        Self::query_records(&conn, &query, &params)
    }

    fn update_record(&self, record: &CapsuleRecord) -> Result<()> {
        let conn = self.lock_conn()?;

        let changed = conn.execute(
            r#"
            UPDATE capsules SET
                user_id = ?,
                title = ?,
                message = ?,
                unlock_date = ?,
                attachment = ?,
                attachment_name = ?,
                attachment_type = ?,
                is_encrypted = ?,
                is_email_sent = ?,
                updated_at = ?
            WHERE id = ?
            "#,
            rusqlite::params![
                record.user_id,
                record.title,
                record.message,
                format_timestamp(&record.unlock_date),
                record.attachment,
                record.attachment_name,
                record.attachment_type,
                record.is_encrypted,
                record.is_email_sent,
                format_timestamp(&Utc::now()),
                record.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(CapsuleError::CapsuleNotFound(record.id));
        }
        Ok(())
    }

    fn delete_record(&self, id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let changed = conn.execute("DELETE FROM capsules WHERE id = ?", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn mark_email_sent(&self, id: &Uuid) -> Result<()> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE capsules SET is_email_sent = 1, updated_at = ? WHERE id = ?",
            [format_timestamp(&Utc::now()), id.to_string()],
        )?;
        if changed == 0 {
            return Err(CapsuleError::CapsuleNotFound(*id));
        }
        Ok(())
    }

    fn count_records(&self) -> Result<usize> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM capsules", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
