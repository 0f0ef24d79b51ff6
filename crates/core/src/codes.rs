//! Human-shareable confirmation codes and check-in page tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;

/// Confirmation codes are six characters from an alphabet without the
/// ambiguous 0/O/1/I/L pairs, so they survive being read over the phone.
const CONFIRMATION_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CONFIRMATION_CODE_LEN: usize = 6;

/// Check-in tokens are 32 random bytes, base64url -- 43 characters.
const CHECK_IN_TOKEN_BYTES: usize = 32;
const CHECK_IN_TOKEN_LEN: usize = 43;

/// Generate a six-character confirmation code.
///
/// Uniqueness is enforced by the database constraint, not here; on the
/// rare collision the insert fails and the caller regenerates.
pub fn generate_confirmation_code() -> String {
    let mut rng = rand::rng();
    (0..CONFIRMATION_CODE_LEN)
        .map(|_| CONFIRMATION_ALPHABET[rng.random_range(0..CONFIRMATION_ALPHABET.len())] as char)
        .collect()
}

/// Generate a check-in page token for an event.
pub fn generate_check_in_token() -> String {
    let mut bytes = [0u8; CHECK_IN_TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Cheap format check before hitting the database with a token lookup.
pub fn is_valid_check_in_token(token: &str) -> bool {
    token.len() == CHECK_IN_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_code_shape() {
        let code = generate_confirmation_code();
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| CONFIRMATION_ALPHABET.contains(&b)));
    }

    #[test]
    fn check_in_token_shape() {
        let token = generate_check_in_token();
        assert_eq!(token.len(), 43);
        assert!(is_valid_check_in_token(&token));
    }

    #[test]
    fn rejects_malformed_check_in_tokens() {
        assert!(!is_valid_check_in_token("short"));
        assert!(!is_valid_check_in_token(&"x".repeat(44)));
        assert!(!is_valid_check_in_token(&format!("{}!", "x".repeat(42))));
    }

    #[test]
    fn codes_vary() {
        // Two draws colliding is ~1e-9; a stuck RNG is what this catches.
        assert_ne!(generate_check_in_token(), generate_check_in_token());
    }
}
