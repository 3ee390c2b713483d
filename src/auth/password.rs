use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Upper bound on a credential secret, matching the registration field cap.
pub const MAX_SECRET_LEN: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential secret exceeds {MAX_SECRET_LEN} characters")]
    TooLong,
    #[error("credential hashing failed: {0}")]
    Hash(String),
}

/// Hashes a registration secret with a fresh salt. The plaintext is never
/// persisted; login only ever compares against this hash.
pub fn hash_secret(plain: &str) -> Result<String, CredentialError> {
    if plain.len() > MAX_SECRET_LEN {
        return Err(CredentialError::TooLong);
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "credential hashing failed");
            CredentialError::Hash(e.to_string())
        })
}

/// A stored hash that does not parse counts as a failed match, so a corrupt
/// row behaves like a bad credential instead of a server fault.
pub fn verify_secret(plain: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!(error = %e, "stored credential hash is unreadable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_secret_roundtrip() {
        let secret = "morel-hunter-42";
        let hash = hash_secret(secret).expect("hash");
        assert!(verify_secret(secret, &hash));
    }

    #[test]
    fn wrong_secret_does_not_verify() {
        let hash = hash_secret("chanterelle-basket").expect("hash");
        assert!(!verify_secret("porcini-basket", &hash));
    }

    #[test]
    fn overlong_secret_is_rejected_before_hashing() {
        let secret = "x".repeat(MAX_SECRET_LEN + 1);
        assert!(matches!(hash_secret(&secret), Err(CredentialError::TooLong)));
    }

    #[test]
    fn max_length_secret_is_accepted() {
        let secret = "y".repeat(MAX_SECRET_LEN);
        assert!(hash_secret(&secret).is_ok());
    }

    #[test]
    fn unreadable_stored_hash_fails_the_match() {
        assert!(!verify_secret("anything", "plaintext-from-the-old-schema"));
    }

    #[test]
    fn hashes_are_salted_per_user() {
        let first = hash_secret("shared-secret").expect("hash");
        let second = hash_secret("shared-secret").expect("hash");
        assert_ne!(first, second);
        assert!(verify_secret("shared-secret", &first));
        assert!(verify_secret("shared-secret", &second));
    }
}
