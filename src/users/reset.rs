use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const RESET_TOKEN_BYTES: usize = 20;

/// 20 random bytes, hex-encoded. This is the value delivered to the user.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex SHA-256 of the raw token string; the only form that is persisted.
pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Constant-time check of `raw` against a stored digest.
pub fn digest_matches(stored_digest: &str, raw: &str) -> bool {
    let digest = hash_reset_token(raw);
    digest.as_bytes().ct_eq(stored_digest.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_forty_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_differ() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn hash_matches_known_digest() {
        assert_eq!(
            hash_reset_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_matches_only_its_own_token() {
        let raw = generate_reset_token();
        let stored = hash_reset_token(&raw);
        assert!(digest_matches(&stored, &raw));
        assert!(!digest_matches(&stored, &generate_reset_token()));
        assert!(!digest_matches(&stored[..10], &raw));
        assert!(!digest_matches("", &raw));
    }
}
