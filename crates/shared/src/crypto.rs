//! Digest utilities for credential verification.
//!
//! The employee directory stores passwords as MD5 hex digests. That is a legacy
//! constraint of the directory schema, not a recommendation; any verification
//! path that must stay compatible with the directory has to use the same digest.

/// Computes the MD5 hash of the input and returns it as a lowercase hex string.
pub fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Compares a plaintext password against a stored MD5 hex digest.
///
/// The directory stores digests in mixed case, so the comparison is
/// case-insensitive on the hex representation.
pub fn verify_md5(password: &str, stored_hex: &str) -> bool {
    md5_hex(password).eq_ignore_ascii_case(stored_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_hex_known_vector() {
        // RFC 1321 test vector
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_md5_hex_empty_string() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_md5_hex_deterministic() {
        assert_eq!(md5_hex("same_input"), md5_hex("same_input"));
    }

    #[test]
    fn test_verify_md5_matches() {
        assert!(verify_md5("secret", &md5_hex("secret")));
    }

    #[test]
    fn test_verify_md5_case_insensitive() {
        let upper = md5_hex("secret").to_uppercase();
        assert!(verify_md5("secret", &upper));
    }

    #[test]
    fn test_verify_md5_rejects_wrong_password() {
        assert!(!verify_md5("wrong", &md5_hex("secret")));
    }

    #[test]
    fn test_md5_hex_unicode() {
        let hash = md5_hex("ทดสอบ");
        assert_eq!(hash.len(), 32);
    }
}
