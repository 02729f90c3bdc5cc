//! Capability token generation.
//!
//! Draft registrations are reachable by anyone holding the access token, so
//! the token itself is the credential: an opaque random identifier used only
//! as a lookup key. Tokens carry no structure and are never derived from
//! registration fields.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Number of random bytes per token. 32 bytes = 256 bits of entropy,
/// comfortably above the 128-bit floor required for guessing resistance.
const TOKEN_BYTES: usize = 32;

/// Length of the base64url encoding of [`TOKEN_BYTES`] bytes.
pub const TOKEN_LEN: usize = 43;

/// Generate a new capability token.
///
/// Encoded as unpadded base64url so it is safe to embed in a link.
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_length() {
        let token = generate_access_token();
        assert_eq!(token.len(), TOKEN_LEN);
    }

    #[test]
    fn test_token_charset_is_url_safe() {
        let token = generate_access_token();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_token_uniqueness() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_access_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_token_decodes_to_expected_entropy() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        let token = generate_access_token();
        let decoded = URL_SAFE_NO_PAD.decode(&token).unwrap();
        assert_eq!(decoded.len(), TOKEN_BYTES);
    }
}
