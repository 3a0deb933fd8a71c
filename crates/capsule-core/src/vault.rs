//! Capsule vault: the owner-facing write and read paths.
//!
//! `Vault` ties a record store to a field cipher. Every capsule it writes is
//! sealed under the owner's key; every capsule it reads is revealed field by
//! field, with unreadable fields replaced rather than failing the request.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::capsule::{
    reveal_record, reveal_record_with, seal_new_capsule, validate_new_capsule, CapsuleField,
    RevealedCapsule,
};
use crate::crypto::{FieldCipher, UserCipher};
use crate::error::{CapsuleError, Result};
use crate::storage::{CapsuleFilter, CapsuleRecord, CapsuleStore, NewCapsule};

/// Time remaining until a capsule unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Countdown from `now` to `unlock_date`, or `None` once unlocked.
    pub fn until(unlock_date: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let remaining = (unlock_date - now).num_seconds();
        if remaining <= 0 {
            return None;
        }
        Some(Self {
            days: remaining / 86_400,
            hours: (remaining % 86_400) / 3_600,
            minutes: (remaining % 3_600) / 60,
            seconds: remaining % 60,
        })
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.days > 0 {
            write!(f, "{}d {}h {}m", self.days, self.hours, self.minutes)
        } else if self.hours > 0 {
            write!(f, "{}h {}m", self.hours, self.minutes)
        } else if self.minutes > 0 {
            write!(f, "{}m {}s", self.minutes, self.seconds)
        } else {
            write!(f, "{}s", self.seconds)
        }
    }
}

/// One row of a vault listing. Never carries the attachment payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapsuleSummary {
    pub id: Uuid,
    pub title: String,
    pub unlock_date: DateTime<Utc>,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<Countdown>,
    pub has_attachment: bool,
    pub attachment_name: Option<String>,
    pub attachment_type: Option<String>,
    pub created_at: DateTime<Utc>,
    /// True when the title could not be decrypted and shows a placeholder
    pub title_unreadable: bool,
}

/// Owner-facing capsule operations over a store.
pub struct Vault<'a> {
    store: &'a dyn CapsuleStore,
    cipher: &'a FieldCipher,
}

impl<'a> Vault<'a> {
    pub fn new(store: &'a dyn CapsuleStore, cipher: &'a FieldCipher) -> Self {
        Self { store, cipher }
    }

    /// Validate, seal and store a new capsule.
    ///
    /// Nothing is stored if validation or encryption fails.
    pub fn create_capsule(&self, capsule: NewCapsule) -> Result<CapsuleRecord> {
        validate_new_capsule(&capsule)?;

        let user_cipher = self.cipher.for_user(&capsule.user_id)?;
        let record = seal_new_capsule(&user_cipher, capsule, Utc::now())?;
        self.store.insert_record(&record)?;

        tracing::info!(
            capsule_id = %record.id,
            user_id = %record.user_id,
            "capsule sealed"
        );
        Ok(record)
    }

    /// List a user's capsules, soonest unlock first.
    ///
    /// The owner's key is derived at most once per listing.
    pub fn list_capsules(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<CapsuleSummary>> {
        require_user(user_id)?;

        let records = self.store.list_records(&CapsuleFilter::new().user(user_id))?;
        let user_cipher: Option<UserCipher> =
            if records.iter().any(CapsuleRecord::is_flagged_encrypted) {
                Some(self.cipher.for_user(user_id)?)
            } else {
                None
            };
        let mut summaries = Vec::with_capacity(records.len());

        for mut record in records {
            let has_attachment = record.attachment.is_some();
            record.attachment = None;

            let revealed = match &user_cipher {
                Some(cipher) => reveal_record_with(cipher, record)?,
                None => reveal_record(self.cipher, record)?,
            };

            summaries.push(summarize(revealed, has_attachment, now));
        }

        tracing::debug!(user_id = %user_id, count = summaries.len(), "listed capsules");
        Ok(summaries)
    }

    /// Open one capsule for its owner.
    ///
    /// # Errors
    ///
    /// - `CapsuleError::CapsuleNotFound` if the capsule is missing or owned
    ///   by another user
    /// - `CapsuleError::Locked` if the unlock date has not passed
    pub fn open_capsule(
        &self,
        user_id: &str,
        id: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<RevealedCapsule> {
        require_user(user_id)?;

        let record = match self.store.get_record(id)? {
            Some(record) if record.user_id == user_id => record,
            _ => return Err(CapsuleError::CapsuleNotFound(*id)),
        };
        if record.is_locked(now) {
            return Err(CapsuleError::Locked {
                id: record.id,
                unlock_date: record.unlock_date,
            });
        }

        reveal_record(self.cipher, record)
    }

    /// Delete an unlocked capsule owned by `user_id`.
    ///
    /// # Errors
    ///
    /// - `CapsuleError::CapsuleNotFound` if no capsule has this id
    /// - `CapsuleError::Forbidden` if it belongs to another user
    /// - `CapsuleError::Locked` if it has not unlocked yet
    pub fn delete_capsule(&self, user_id: &str, id: &Uuid, now: DateTime<Utc>) -> Result<()> {
        require_user(user_id)?;

        let record = self
            .store
            .get_record(id)?
            .ok_or(CapsuleError::CapsuleNotFound(*id))?;
        if record.user_id != user_id {
            return Err(CapsuleError::Forbidden(*id));
        }
        if record.is_locked(now) {
            return Err(CapsuleError::Locked {
                id: record.id,
                unlock_date: record.unlock_date,
            });
        }

        if !self.store.delete_record(id)? {
            return Err(CapsuleError::CapsuleNotFound(*id));
        }
        tracing::info!(capsule_id = %id, user_id = %user_id, "capsule deleted");
        Ok(())
    }
}

fn require_user(user_id: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(CapsuleError::Validation(
            "User identifier cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn summarize(revealed: RevealedCapsule, has_attachment: bool, now: DateTime<Utc>) -> CapsuleSummary {
    CapsuleSummary {
        id: revealed.id,
        title_unreadable: revealed.unreadable.contains(&CapsuleField::Title),
        title: revealed.title,
        unlock_date: revealed.unlock_date,
        locked: revealed.unlock_date > now,
        countdown: Countdown::until(revealed.unlock_date, now),
        has_attachment,
        attachment_name: revealed.attachment_name,
        attachment_type: revealed.attachment_type,
        created_at: revealed.created_at,
    }
}
