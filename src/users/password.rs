use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use tracing::error;

use crate::error::{Result, UserError};

/// bcrypt work factor for newly stored passwords.
pub const HASH_COST: u32 = 10;

/// Hash families accepted by [`verify_password`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    /// `$2a$`, `$2b$`, `$2x$` and `$2y$` modular-crypt strings.
    Bcrypt,
    /// `$argon2…` PHC strings.
    Argon2,
}

impl HashScheme {
    pub fn detect(hash: &str) -> Option<Self> {
        if hash.starts_with("$argon2") {
            return Some(Self::Argon2);
        }
        match hash.as_bytes() {
            [b'$', b'2', b'a' | b'b' | b'x' | b'y', b'$', ..] => Some(Self::Bcrypt),
            _ => None,
        }
    }
}

/// Salted bcrypt hash at [`HASH_COST`].
pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, HASH_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        UserError::PasswordHash(e.to_string())
    })
}

/// `Ok(false)` on mismatch; errors when `hash` is not a recognised hash string.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    match HashScheme::detect(hash) {
        Some(HashScheme::Bcrypt) => bcrypt::verify(plain, hash).map_err(|e| {
            error!(error = %e, "bcrypt verify error");
            UserError::PasswordHash(e.to_string())
        }),
        Some(HashScheme::Argon2) => {
            let parsed = PasswordHash::new(hash).map_err(|e| {
                error!(error = %e, "argon2 parse hash error");
                UserError::PasswordHash(e.to_string())
            })?;
            Ok(Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok())
        }
        None => {
            error!("unrecognised password hash format");
            Err(UserError::PasswordHash("unrecognised hash format".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString};
    use rand::rngs::OsRng;

    #[test]
    fn new_hashes_are_bcrypt_at_cost_ten() {
        let hash = hash_password("analytical").unwrap();
        assert!(hash.starts_with("$2b$10$"), "{hash}");
        assert_eq!(HashScheme::detect(&hash), Some(HashScheme::Bcrypt));
        assert!(verify_password("analytical", &hash).unwrap());
        assert!(!verify_password("analyticalx", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(
            hash_password("difference-engine").unwrap(),
            hash_password("difference-engine").unwrap()
        );
    }

    #[test]
    fn verifies_two_a_prefixed_bcrypt_hashes() {
        let legacy = bcrypt::hash_with_result("notes-on-the-engine", HASH_COST)
            .unwrap()
            .format_for_version(bcrypt::Version::TwoA);
        assert!(legacy.starts_with("$2a$10$"));
        assert!(verify_password("notes-on-the-engine", &legacy).unwrap());
        assert!(!verify_password("notes-on-the-engine!", &legacy).unwrap());
    }

    #[test]
    fn verifies_argon2_hashes() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"bernoulli", &salt)
            .unwrap()
            .to_string();
        assert_eq!(HashScheme::detect(&hash), Some(HashScheme::Argon2));
        assert!(verify_password("bernoulli", &hash).unwrap());
        assert!(!verify_password("Bernoulli", &hash).unwrap());
    }

    #[test]
    fn unknown_or_truncated_hashes_are_errors() {
        assert!(matches!(
            verify_password("anything", "plaintext"),
            Err(UserError::PasswordHash(_))
        ));
        assert!(matches!(
            verify_password("anything", "$2b$10$short"),
            Err(UserError::PasswordHash(_))
        ));
    }
}
