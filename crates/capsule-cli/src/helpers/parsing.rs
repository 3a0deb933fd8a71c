//! Parsing helpers for datetimes, days and capsule IDs.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::CliError;

/// Parse a datetime string (RFC 3339 or YYYY-MM-DD as midnight UTC).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CliError::invalid_input(format!("Invalid date value: {}", value)))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(CliError::invalid_input(format!(
        "Invalid date/time (expected RFC 3339 or YYYY-MM-DD): {}",
        value
    ))
    .into())
}

/// Parse a calendar day (YYYY-MM-DD).
pub fn parse_day(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CliError::invalid_input(format!("Invalid day (expected YYYY-MM-DD): {}", value)).into()
    })
}

/// Parse a full capsule UUID.
pub fn parse_capsule_id(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        CliError::invalid_input(format!(
            "Invalid capsule ID: {} (expected a full UUID)",
            value
        ))
        .into()
    })
}
