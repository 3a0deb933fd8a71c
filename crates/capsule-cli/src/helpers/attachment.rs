//! Attachment files: read into base64 on create, decoded on show.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use capsule_core::Attachment;

use crate::errors::CliError;

/// Read a file into an attachment carrying its name and media type.
pub fn load_attachment(path: &Path, media_type: Option<&str>) -> anyhow::Result<Attachment> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read attachment {}: {}", path.display(), e))?;
    if bytes.is_empty() {
        return Err(CliError::invalid_input(format!(
            "Attachment {} is empty",
            path.display()
        ))
        .into());
    }

    let mut attachment = Attachment::new(STANDARD.encode(&bytes));
    if let Some(name) = path.file_name() {
        attachment = attachment.with_name(name.to_string_lossy());
    }
    if let Some(media_type) = media_type.or_else(|| guess_media_type(path)) {
        attachment = attachment.with_content_type(media_type);
    }
    Ok(attachment)
}

/// Decode a revealed attachment payload and write it to `destination`.
pub fn save_attachment(payload: &str, destination: &Path) -> anyhow::Result<usize> {
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| anyhow::anyhow!("Attachment payload is not valid base64: {}", e))?;
    capsule_core::fs::write_atomic(destination, &bytes).map_err(|e| {
        anyhow::anyhow!(
            "Failed to write attachment to {}: {}",
            destination.display(),
            e
        )
    })?;
    Ok(bytes.len())
}

fn guess_media_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain",
        "json" => "application/json",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => return None,
    };
    Some(media_type)
}
