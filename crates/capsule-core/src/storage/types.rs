//! Core data types for the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use uuid::Uuid;

/// A capsule as persisted.
///
/// `title`, `message` and `attachment` hold either legacy plaintext or
/// `iv:tag:ciphertext` envelopes depending on `is_encrypted`. Attachment name
/// and media type are always plaintext metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsuleRecord {
    /// Unique identifier for this capsule
    pub id: Uuid,

    /// Owning user; also the key-derivation input
    pub user_id: String,

    pub title: String,

    pub message: String,

    /// When the capsule may be opened
    pub unlock_date: DateTime<Utc>,

    /// Attachment payload (base64 file content, or its envelope)
    pub attachment: Option<String>,

    /// Original file name, e.g. "my-photo.jpg"
    pub attachment_name: Option<String>,

    /// Media type, e.g. "image/jpeg"
    pub attachment_type: Option<String>,

    /// Encryption flag. `None` is a legacy record written before the flag existed.
    pub is_encrypted: Option<bool>,

    /// Whether the unlock notification has gone out
    pub is_email_sent: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl CapsuleRecord {
    /// True only when the record is explicitly flagged encrypted.
    pub fn is_flagged_encrypted(&self) -> bool {
        self.is_encrypted == Some(true)
    }

    /// True while the unlock date is still in the future.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.unlock_date > now
    }
}

/// Plaintext attachment supplied on capsule creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Base64 file content
    pub data: String,
    pub name: Option<String>,
    pub content_type: Option<String>,
}

impl Attachment {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            name: None,
            content_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Builder for creating new capsules. All text is plaintext here.
#[derive(Debug, Clone)]
pub struct NewCapsule {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub unlock_date: DateTime<Utc>,
    pub attachment: Option<Attachment>,
}

impl NewCapsule {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        unlock_date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            message: message.into(),
            unlock_date,
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Build an unencrypted record in the legacy shape (flag absent).
    ///
    /// This is what records written before encryption-at-rest look like;
    /// the vault never stores new capsules this way.
    pub fn into_legacy_record(self, now: DateTime<Utc>) -> CapsuleRecord {
        let (attachment, attachment_name, attachment_type) = match self.attachment {
            Some(a) => (Some(a.data), a.name, a.content_type),
            None => (None, None, None),
        };
        CapsuleRecord {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            unlock_date: self.unlock_date,
            attachment,
            attachment_name,
            attachment_type,
            is_encrypted: None,
            is_email_sent: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result ordering for record listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordOrder {
    /// Soonest unlock first, then oldest creation
    #[default]
    UnlockDate,
    /// Most recently created first
    NewestFirst,
}

/// Filter for querying capsule records.
#[derive(Debug, Clone, Default)]
pub struct CapsuleFilter {
    /// Filter by owning user
    pub user_id: Option<String>,

    /// Unlock window start (inclusive)
    pub unlock_since: Option<DateTime<Utc>>,

    /// Unlock window end (inclusive)
    pub unlock_until: Option<DateTime<Utc>>,

    /// Filter by notification state
    pub email_sent: Option<bool>,

    pub order: RecordOrder,

    /// Maximum number of results
    pub limit: Option<usize>,
}

impl CapsuleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn unlock_since(mut self, date: DateTime<Utc>) -> Self {
        self.unlock_since = Some(date);
        self
    }

    pub fn unlock_until(mut self, date: DateTime<Utc>) -> Self {
        self.unlock_until = Some(date);
        self
    }

    pub fn email_sent(mut self, sent: bool) -> Self {
        self.email_sent = Some(sent);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.order = RecordOrder::NewestFirst;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
