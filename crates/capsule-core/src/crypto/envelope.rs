//! Text encoding of an encrypted field.
//!
//! An envelope is three standard base64 segments joined by `:` in the fixed
//! order `iv:tag:ciphertext`. The same 3-part shape doubles as a cheap
//! heuristic for telling stored envelopes apart from legacy plaintext.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{CapsuleError, Result};

/// Segment delimiter.
pub const DELIMITER: char = ':';

/// AES-GCM initialization vector length (96 bits).
pub const IV_LENGTH: usize = 12;

/// AES-GCM authentication tag length (128 bits).
pub const TAG_LENGTH: usize = 16;

const PART_COUNT: usize = 3;

/// Decoded components of an encrypted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: [u8; IV_LENGTH],
    pub tag: [u8; TAG_LENGTH],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Parse a stored `iv:tag:ciphertext` string.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::Format` if the value does not split into exactly
    /// three parts, a part is not valid base64, or the IV/tag have the wrong
    /// length. No cryptographic work happens here.
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(DELIMITER).collect();
        if parts.len() != PART_COUNT {
            return Err(CapsuleError::Format(
                "invalid encrypted data format".to_string(),
            ));
        }

        let iv_bytes = decode_segment(parts[0], "iv")?;
        let tag_bytes = decode_segment(parts[1], "tag")?;
        let ciphertext = decode_segment(parts[2], "ciphertext")?;

        let iv: [u8; IV_LENGTH] = iv_bytes.as_slice().try_into().map_err(|_| {
            CapsuleError::Format(format!(
                "iv must be {} bytes, got {}",
                IV_LENGTH,
                iv_bytes.len()
            ))
        })?;
        let tag: [u8; TAG_LENGTH] = tag_bytes.as_slice().try_into().map_err(|_| {
            CapsuleError::Format(format!(
                "tag must be {} bytes, got {}",
                TAG_LENGTH,
                tag_bytes.len()
            ))
        })?;

        Ok(Self {
            iv,
            tag,
            ciphertext,
        })
    }

    /// Encode as `base64(iv):base64(tag):base64(ciphertext)`.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}{}{}",
            STANDARD.encode(self.iv),
            DELIMITER,
            STANDARD.encode(self.tag),
            DELIMITER,
            STANDARD.encode(&self.ciphertext)
        )
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(segment)
        .map_err(|e| CapsuleError::Format(format!("invalid base64 in {}: {}", name, e)))
}

/// Structural check: non-empty and exactly three `:`-separated parts.
///
/// This does not validate base64 or attempt decryption. A legacy plaintext
/// value containing exactly two colons (`"Chapter 3: Hope: Renewed"`) is a
/// false positive; the per-record encryption flag stays authoritative.
pub fn looks_encrypted(value: &str) -> bool {
    !value.is_empty() && value.split(DELIMITER).count() == PART_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope {
            iv: [7u8; IV_LENGTH],
            tag: [9u8; TAG_LENGTH],
            ciphertext: b"opaque".to_vec(),
        }
    }

    #[test]
    fn test_encode_has_three_segments() {
        let encoded = sample().encode();
        assert_eq!(encoded.matches(DELIMITER).count(), 2);
        assert!(looks_encrypted(&encoded));
    }

    #[test]
    fn test_parse_reverses_encode() {
        let envelope = sample();
        let parsed = Envelope::parse(&envelope.to_string()).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_two_parts_is_format_error() {
        let result = Envelope::parse("not:enough");
        assert!(matches!(result, Err(CapsuleError::Format(ref m)) if m == "invalid encrypted data format"));
    }

    #[test]
    fn test_four_parts_is_format_error() {
        let result = Envelope::parse("a:b:c:d");
        assert!(matches!(result, Err(CapsuleError::Format(ref m)) if m == "invalid encrypted data format"));
    }

    #[test]
    fn test_invalid_base64_is_format_error() {
        let result = Envelope::parse("!!!:AAAA:AAAA");
        assert!(matches!(result, Err(CapsuleError::Format(_))));
    }

    #[test]
    fn test_short_iv_is_format_error() {
        let value = format!(
            "{}:{}:{}",
            STANDARD.encode([0u8; 8]),
            STANDARD.encode([0u8; TAG_LENGTH]),
            STANDARD.encode(b"x")
        );
        let result = Envelope::parse(&value);
        assert!(matches!(result, Err(CapsuleError::Format(ref m)) if m.contains("iv")));
    }

    #[test]
    fn test_short_tag_is_format_error() {
        let value = format!(
            "{}:{}:{}",
            STANDARD.encode([0u8; IV_LENGTH]),
            STANDARD.encode([0u8; 4]),
            STANDARD.encode(b"x")
        );
        let result = Envelope::parse(&value);
        assert!(matches!(result, Err(CapsuleError::Format(ref m)) if m.contains("tag")));
    }

    #[test]
    fn test_looks_encrypted_heuristic() {
        assert!(looks_encrypted("a:b:c"));
        assert!(looks_encrypted("Chapter 3: Hope: Renewed"));
        assert!(!looks_encrypted(""));
        assert!(!looks_encrypted("My 2030 goals"));
        assert!(!looks_encrypted("Note to self: breathe"));
        assert!(!looks_encrypted("a:b:c:d"));
    }
}
