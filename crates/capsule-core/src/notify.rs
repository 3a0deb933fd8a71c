//! Selection of capsules due for an unlock notification.
//!
//! Delivery is someone else's job; this module decides who should hear that
//! a capsule has opened and records that they have.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::capsule::{reveal_record, TITLE_PLACEHOLDER};
use crate::crypto::FieldCipher;
use crate::error::Result;
use crate::storage::{CapsuleFilter, CapsuleStore};

/// Base URL used for unlock links when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// A capsule that unlocks on the selected day and has not been announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockNotice {
    pub capsule_id: Uuid,
    pub user_id: String,
    /// Decrypted title, or the placeholder if it cannot be read
    pub title: String,
    /// When the capsule was created
    pub sealed_on: DateTime<Utc>,
    pub unlock_url: String,
}

/// Inclusive UTC bounds of `day`.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// Capsules unlocking on `day` whose notification has not gone out.
///
/// A title that cannot be decrypted is reported as the placeholder rather
/// than dropping the notice.
pub fn due_notifications(
    store: &dyn CapsuleStore,
    cipher: &FieldCipher,
    day: NaiveDate,
    base_url: &str,
) -> Result<Vec<UnlockNotice>> {
    let (start, end) = day_bounds(day);
    tracing::debug!(%start, %end, "selecting capsules unlocking today");

    let records = store.list_records(
        &CapsuleFilter::new()
            .unlock_since(start)
            .unlock_until(end)
            .email_sent(false),
    )?;

    let base = base_url.trim_end_matches('/');
    let mut notices = Vec::with_capacity(records.len());

    for mut record in records {
        // Only the title is needed.
        record.message.clear();
        record.attachment = None;

        let capsule_id = record.id;
        let user_id = record.user_id.clone();
        let sealed_on = record.created_at;

        let title = match reveal_record(cipher, record) {
            Ok(revealed) => revealed.title,
            Err(err) => {
                tracing::warn!(
                    capsule_id = %capsule_id,
                    error = err.kind(),
                    "could not reveal capsule title for notification"
                );
                TITLE_PLACEHOLDER.to_string()
            }
        };

        notices.push(UnlockNotice {
            capsule_id,
            user_id,
            title,
            sealed_on,
            unlock_url: format!("{}/vault/{}", base, capsule_id),
        });
    }

    tracing::info!(count = notices.len(), %day, "capsules due for notification");
    Ok(notices)
}

/// Record that the unlock notification for `id` has been sent.
pub fn mark_notified(store: &dyn CapsuleStore, id: &Uuid) -> Result<()> {
    store.mark_email_sent(id)?;
    tracing::debug!(capsule_id = %id, "marked notification sent");
    Ok(())
}
