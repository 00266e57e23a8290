//! Signature codes for check results.
//!
//! A signature code proves which secret, task and salt a result byte belongs
//! to: it is the SHA-256 digest of the ASCII string
//! `"<secret>:<task>:<salt>:<result>"`, hex-encoded in lowercase. Anyone who
//! knows the secret can recompute and verify it; nobody else can forge a
//! result for a different salt.

use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 digest of a byte buffer.
///
/// The output is always 64 characters, without any prefix.
pub fn digest_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Computes the signature code for a check result.
///
/// The result byte is formatted as a signed decimal integer, matching the
/// value reported by the command line front-end.
pub fn signature(secret: &str, task: &str, salt: i32, result: u8) -> String {
    let message = format!("{}:{}:{}:{}", secret, task, salt, i32::from(result));
    digest_hex(message.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_shape() {
        let hash = digest_hex(b"");
        assert_eq!(hash.len(), 64);
        assert!(hash.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        // SHA-256 of the empty string is a well-known value.
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_signature_is_digest_of_joined_fields() {
        assert_eq!(signature("s", "T", 42, 3), digest_hex(b"s:T:42:3"));
    }

    #[test]
    fn test_signature_deterministic() {
        let a = signature("secret", "task-1", -7, 0x7f);
        let b = signature("secret", "task-1", -7, 0x7f);
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_sensitive_to_every_field() {
        let base = signature("s", "T", 1, 1);
        assert_ne!(base, signature("x", "T", 1, 1));
        assert_ne!(base, signature("s", "U", 1, 1));
        assert_ne!(base, signature("s", "T", 2, 1));
        assert_ne!(base, signature("s", "T", 1, 2));
    }
}
