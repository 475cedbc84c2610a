//! Personal data handling for log output.
//!
//! Names and e-mail addresses never reach the log in clear text. Use
//! [`fingerprint`] to correlate a value across log lines and
//! [`mask_email`] when a human needs a hint of which address was used.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest.
const FINGERPRINT_LEN: usize = 12;

/// Short, stable SHA-256 fingerprint of a value.
pub fn fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

/// Keep the first character of the local part and the domain.
///
/// `anna@example.se` becomes `a***@example.se`. Strings without an `@`
/// are fully masked.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = fingerprint("Anna");
        assert_eq!(a.len(), FINGERPRINT_LEN);
        assert_eq!(a, fingerprint("Anna"));
        assert_ne!(a, fingerprint("Bertil"));
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("anna@example.se"), "a***@example.se");
        assert_eq!(mask_email("östen@example.se"), "ö***@example.se");
        assert_eq!(mask_email("@example.se"), "***");
        assert_eq!(mask_email("no-at-sign"), "***");
    }
}
