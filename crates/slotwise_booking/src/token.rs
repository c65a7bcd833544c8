//! Manage-link tokens.
//!
//! A token is the only credential a guest has for their appointment, so it
//! comes straight from the operating system's CSPRNG.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

const TOKEN_BYTES: usize = 32;
/// Length of a base64url-encoded 32-byte token without padding.
pub const TOKEN_LENGTH: usize = 43;

/// 256 random bits, base64url without padding.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Cheap shape check before a token reaches the database.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_url_safe_and_unique() {
        let tokens: HashSet<String> = (0..200).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 200);
        for token in &tokens {
            assert!(is_well_formed(token), "{token}");
        }
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed(&"a".repeat(42)));
        assert!(!is_well_formed(&format!("{}=", "a".repeat(42))));
        assert!(is_well_formed(&"a".repeat(43)));
    }
}
