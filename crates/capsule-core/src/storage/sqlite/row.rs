//! Capsule row type for database queries.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::{CapsuleError, Result};
use crate::storage::types::CapsuleRecord;

/// Columns in the order every SELECT in this module returns them.
pub const CAPSULE_COLUMNS: &str = "id, user_id, title, message, unlock_date, attachment, \
     attachment_name, attachment_type, is_encrypted, is_email_sent, created_at, updated_at";

/// Raw row data from the capsules table, before parsing into domain types.
#[derive(Debug)]
pub struct CapsuleRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub unlock_date: String,
    pub attachment: Option<String>,
    pub attachment_name: Option<String>,
    pub attachment_type: Option<String>,
    pub is_encrypted: Option<bool>,
    pub is_email_sent: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl CapsuleRow {
    /// Read a row selected with `CAPSULE_COLUMNS`.
    pub fn from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            message: row.get(3)?,
            unlock_date: row.get(4)?,
            attachment: row.get(5)?,
            attachment_name: row.get(6)?,
            attachment_type: row.get(7)?,
            is_encrypted: row.get(8)?,
            is_email_sent: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

/// Fixed-width UTC timestamp so lexical order in SQLite matches time order.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| CapsuleError::Storage(format!("Invalid {} timestamp: {}", column, e)))?
        .with_timezone(&Utc))
}

impl TryFrom<CapsuleRow> for CapsuleRecord {
    type Error = CapsuleError;

    fn try_from(row: CapsuleRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| CapsuleError::Storage(format!("Invalid capsule UUID: {}", e)))?;
        let unlock_date = parse_timestamp(&row.unlock_date, "unlock_date")?;
        let created_at = parse_timestamp(&row.created_at, "created_at")?;
        let updated_at = parse_timestamp(&row.updated_at, "updated_at")?;

        Ok(CapsuleRecord {
            id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            unlock_date,
            attachment: row.attachment,
            attachment_name: row.attachment_name,
            attachment_type: row.attachment_type,
            is_encrypted: row.is_encrypted,
            is_email_sent: row.is_email_sent,
            created_at,
            updated_at,
        })
    }
}
