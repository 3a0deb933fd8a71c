use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use capsule_core::crypto::{Envelope, IV_LENGTH, TAG_LENGTH};
use capsule_core::{looks_encrypted, CapsuleError, FieldCipher, SharedSecret};

fn fast_cipher(secret: &str) -> FieldCipher {
    FieldCipher::with_iterations(SharedSecret::new(secret).expect("secret"), 1_000)
}

fn swap_char(c: char) -> char {
    if c == 'A' {
        'B'
    } else {
        'A'
    }
}

#[test]
fn test_known_scenario_round_trips_with_production_settings() {
    let cipher = FieldCipher::new(SharedSecret::new("s3cr3t").expect("secret"));

    let envelope = cipher
        .encrypt("My 2030 goals", "user-42")
        .expect("encrypt should succeed");

    assert_eq!(envelope.matches(':').count(), 2);
    let parts: Vec<&str> = envelope.split(':').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(STANDARD.decode(parts[0]).expect("iv base64").len(), IV_LENGTH);
    assert_eq!(STANDARD.decode(parts[1]).expect("tag base64").len(), TAG_LENGTH);
    assert_eq!(
        STANDARD.decode(parts[2]).expect("ciphertext base64").len(),
        "My 2030 goals".len()
    );

    let plaintext = cipher
        .decrypt(&envelope, "user-42")
        .expect("decrypt should succeed");
    assert_eq!(plaintext, "My 2030 goals");
}

#[test]
fn test_production_key_derivation_is_deterministic_and_user_separated() {
    let cipher = FieldCipher::new(SharedSecret::new("s3cr3t").expect("secret"));

    let first = cipher.derive_user_key("user-42").expect("derive");
    let second = cipher.derive_user_key("user-42").expect("derive");
    let other = cipher.derive_user_key("user-43").expect("derive");

    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_ne!(first.as_bytes(), other.as_bytes());
}

#[test]
fn test_empty_values_pass_through() {
    let cipher = fast_cipher("s3cr3t");
    assert_eq!(cipher.encrypt("", "user-1").expect("encrypt"), "");
    assert_eq!(cipher.decrypt("", "user-1").expect("decrypt"), "");
}

#[test]
fn test_two_encryptions_differ_and_both_decrypt() {
    let cipher = fast_cipher("s3cr3t");
    let a = cipher.encrypt("same", "user-1").expect("encrypt");
    let b = cipher.encrypt("same", "user-1").expect("encrypt");

    assert_ne!(a, b);
    assert_ne!(
        Envelope::parse(&a).expect("parse").iv,
        Envelope::parse(&b).expect("parse").iv
    );
    assert_eq!(cipher.decrypt(&a, "user-1").expect("decrypt"), "same");
    assert_eq!(cipher.decrypt(&b, "user-1").expect("decrypt"), "same");
}

#[test]
fn test_cross_user_decrypt_is_authentication_failure() {
    let cipher = fast_cipher("s3cr3t");
    let envelope = cipher.encrypt("only for user-1", "user-1").expect("encrypt");

    let result = cipher.decrypt(&envelope, "user-2");
    assert!(matches!(result, Err(CapsuleError::Authentication)));
}

#[test]
fn test_any_tampered_tag_or_ciphertext_character_fails() {
    let cipher = fast_cipher("s3cr3t");
    let envelope = cipher.encrypt("My 2030 goals", "user-42").expect("encrypt");
    let parts: Vec<&str> = envelope.split(':').collect();

    for segment in [1usize, 2] {
        for (index, c) in parts[segment].char_indices() {
            if c == '=' {
                continue;
            }
            let mut tampered_segment = parts[segment].to_string();
            tampered_segment.replace_range(index..index + 1, &swap_char(c).to_string());

            let mut tampered = parts.iter().map(|p| p.to_string()).collect::<Vec<_>>();
            tampered[segment] = tampered_segment;
            let tampered = tampered.join(":");

            let result = cipher.decrypt(&tampered, "user-42");
            assert!(
                matches!(
                    result,
                    Err(CapsuleError::Authentication) | Err(CapsuleError::Format(_))
                ),
                "segment {} index {} should fail, got {:?}",
                segment,
                index,
                result
            );
        }
    }
}

#[test]
fn test_wrong_part_counts_are_format_errors() {
    let cipher = fast_cipher("s3cr3t");
    for value in ["not:enough", "a:b:c:d"] {
        match cipher.decrypt(value, "user-1") {
            Err(CapsuleError::Format(message)) => {
                assert_eq!(message, "invalid encrypted data format")
            }
            other => panic!("expected format error for {:?}, got {:?}", value, other),
        }
    }
}

#[test]
fn test_looks_encrypted_heuristic() {
    let cipher = fast_cipher("s3cr3t");
    let envelope = cipher.encrypt("hello", "user-1").expect("encrypt");

    assert!(looks_encrypted(&envelope));
    assert!(looks_encrypted("a:b:c"));
    assert!(!looks_encrypted(""));
    assert!(!looks_encrypted("Dear future me"));
    assert!(!looks_encrypted("Note: remember this"));
}

#[test]
fn test_missing_secret_is_configuration_error() {
    assert!(matches!(
        SharedSecret::new(""),
        Err(CapsuleError::Configuration(_))
    ));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn encrypt_decrypt_always_round_trips(
            plaintext in "\\PC{1,80}",
            user_id in "[A-Za-z0-9_@.-]{1,32}",
        ) {
            let cipher = fast_cipher("s3cr3t");
            let envelope = cipher.encrypt(&plaintext, &user_id).unwrap();
            prop_assert!(looks_encrypted(&envelope));
            prop_assert_eq!(cipher.decrypt(&envelope, &user_id).unwrap(), plaintext);
        }
    }
}
