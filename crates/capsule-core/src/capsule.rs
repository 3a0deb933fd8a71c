//! Capsule field sealing and revealing.
//!
//! Sealing turns plaintext capsule fields into envelopes under the owner's
//! key. Revealing goes the other way with per-field failure isolation: one
//! unreadable field never hides the rest of the record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::crypto::{looks_encrypted, FieldCipher, UserCipher};
use crate::error::{CapsuleError, Result};
use crate::storage::{CapsuleRecord, NewCapsule};

/// Shown in place of a title that cannot be decrypted.
pub const TITLE_PLACEHOLDER: &str = "[Encrypted Title]";

/// Shown in place of a message that cannot be decrypted.
pub const MESSAGE_PLACEHOLDER: &str = "[Encrypted Message]";

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 100;

/// The encrypted fields of a capsule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapsuleField {
    Title,
    Message,
    Attachment,
}

impl CapsuleField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapsuleField::Title => "title",
            CapsuleField::Message => "message",
            CapsuleField::Attachment => "attachment",
        }
    }
}

impl std::fmt::Display for CapsuleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of revealing one stored field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Value did not have the envelope shape and is returned as stored
    Plaintext(String),
    /// Envelope decrypted successfully
    Decrypted(String),
    /// Envelope could not be decrypted; carries the failure reason
    Unreadable(String),
}

impl FieldOutcome {
    /// The readable value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            FieldOutcome::Plaintext(v) | FieldOutcome::Decrypted(v) => Some(v),
            FieldOutcome::Unreadable(_) => None,
        }
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self, FieldOutcome::Unreadable(_))
    }

    /// The readable value, or `placeholder` when unreadable.
    pub fn into_value_or(self, placeholder: &str) -> String {
        match self {
            FieldOutcome::Plaintext(v) | FieldOutcome::Decrypted(v) => v,
            FieldOutcome::Unreadable(_) => placeholder.to_string(),
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            FieldOutcome::Plaintext(v) | FieldOutcome::Decrypted(v) => Some(v),
            FieldOutcome::Unreadable(_) => None,
        }
    }
}

/// A capsule with its fields revealed for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealedCapsule {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub unlock_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub attachment_name: Option<String>,
    pub attachment_type: Option<String>,
    pub is_encrypted: bool,
    pub is_email_sent: bool,
    pub created_at: DateTime<Utc>,
    /// Fields that fell back to a placeholder (or were dropped)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unreadable: Vec<CapsuleField>,
}

impl RevealedCapsule {
    fn as_stored(record: CapsuleRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title,
            message: record.message,
            unlock_date: record.unlock_date,
            attachment: record.attachment,
            attachment_name: record.attachment_name,
            attachment_type: record.attachment_type,
            is_encrypted: record.is_encrypted == Some(true),
            is_email_sent: record.is_email_sent,
            created_at: record.created_at,
            unreadable: Vec::new(),
        }
    }
}

/// Check a new capsule before anything is encrypted or stored.
pub fn validate_new_capsule(capsule: &NewCapsule) -> Result<()> {
    if capsule.user_id.is_empty() {
        return Err(CapsuleError::Validation(
            "User identifier cannot be empty".to_string(),
        ));
    }
    if capsule.title.trim().is_empty() {
        return Err(CapsuleError::Validation(
            "Please provide a title".to_string(),
        ));
    }
    if capsule.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CapsuleError::Validation(format!(
            "Title cannot be more than {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    if capsule.message.trim().is_empty() {
        return Err(CapsuleError::Validation(
            "Please provide a message".to_string(),
        ));
    }
    if let Some(attachment) = &capsule.attachment {
        if attachment.data.is_empty() {
            return Err(CapsuleError::Validation(
                "Attachment name or type given without attachment data".to_string(),
            ));
        }
    }
    Ok(())
}

/// Encrypt a validated new capsule into a record flagged encrypted.
///
/// # Errors
///
/// Returns `CapsuleError::Validation` if `cipher` is bound to a different
/// user, and propagates any encryption failure.
pub fn seal_new_capsule(
    cipher: &UserCipher,
    capsule: NewCapsule,
    now: DateTime<Utc>,
) -> Result<CapsuleRecord> {
    if cipher.user_id() != capsule.user_id {
        return Err(CapsuleError::Validation(
            "Cipher is bound to a different user".to_string(),
        ));
    }
    let mut record = capsule.into_legacy_record(now);
    seal_fields(cipher, &mut record)?;
    Ok(record)
}

/// Encrypt a record's title, message and attachment in place and set the flag.
///
/// All fields are encrypted before any is written back, so an error leaves
/// the record untouched.
pub fn seal_fields(cipher: &UserCipher, record: &mut CapsuleRecord) -> Result<()> {
    let title = cipher.encrypt(&record.title)?;
    let message = cipher.encrypt(&record.message)?;
    let attachment = match record.attachment.as_deref() {
        Some(data) if !data.is_empty() => Some(cipher.encrypt(data)?),
        other => other.map(str::to_string),
    };

    record.title = title;
    record.message = message;
    record.attachment = attachment;
    record.is_encrypted = Some(true);
    Ok(())
}

/// Reveal one stored field.
///
/// Values without the envelope shape come back as `Plaintext`. Format and
/// authentication failures become `Unreadable` and are logged; any other
/// error propagates.
pub fn reveal_field(
    cipher: &UserCipher,
    capsule_id: &Uuid,
    field: CapsuleField,
    value: &str,
) -> Result<FieldOutcome> {
    if !looks_encrypted(value) {
        return Ok(FieldOutcome::Plaintext(value.to_string()));
    }
    match cipher.decrypt(value) {
        Ok(plaintext) => Ok(FieldOutcome::Decrypted(plaintext)),
        Err(err) if err.is_unrecoverable_field() => {
            tracing::warn!(
                capsule_id = %capsule_id,
                field = %field,
                error = err.kind(),
                "failed to decrypt capsule field"
            );
            Ok(FieldOutcome::Unreadable(err.to_string()))
        }
        Err(err) => Err(err),
    }
}

/// Reveal a record, deriving the owner's key on demand.
///
/// Records not flagged encrypted are returned as stored without any key
/// derivation.
pub fn reveal_record(cipher: &FieldCipher, record: CapsuleRecord) -> Result<RevealedCapsule> {
    if !record.is_flagged_encrypted() {
        return Ok(RevealedCapsule::as_stored(record));
    }
    let user_cipher = cipher.for_user(&record.user_id)?;
    reveal_record_with(&user_cipher, record)
}

/// Reveal a record with an already derived key.
///
/// # Errors
///
/// Returns `CapsuleError::Forbidden` if the record belongs to a user other
/// than the one `cipher` is bound to.
pub fn reveal_record_with(cipher: &UserCipher, record: CapsuleRecord) -> Result<RevealedCapsule> {
    if !record.is_flagged_encrypted() {
        return Ok(RevealedCapsule::as_stored(record));
    }
    if cipher.user_id() != record.user_id {
        return Err(CapsuleError::Forbidden(record.id));
    }

    let id = record.id;
    let mut unreadable = Vec::new();

    let title = reveal_field(cipher, &id, CapsuleField::Title, &record.title)?;
    if title.is_unreadable() {
        unreadable.push(CapsuleField::Title);
    }
    let message = reveal_field(cipher, &id, CapsuleField::Message, &record.message)?;
    if message.is_unreadable() {
        unreadable.push(CapsuleField::Message);
    }
    let attachment = match record.attachment.as_deref() {
        Some(value) => {
            let outcome = reveal_field(cipher, &id, CapsuleField::Attachment, value)?;
            if outcome.is_unreadable() {
                unreadable.push(CapsuleField::Attachment);
            }
            outcome.into_value()
        }
        None => None,
    };

    Ok(RevealedCapsule {
        id,
        user_id: record.user_id,
        title: title.into_value_or(TITLE_PLACEHOLDER),
        message: message.into_value_or(MESSAGE_PLACEHOLDER),
        unlock_date: record.unlock_date,
        attachment,
        attachment_name: record.attachment_name,
        attachment_type: record.attachment_type,
        is_encrypted: true,
        is_email_sent: record.is_email_sent,
        created_at: record.created_at,
        unreadable,
    })
}
