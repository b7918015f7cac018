//! Argon2id password hashing.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to hash password: {0}")]
pub struct PasswordHashError(String);

/// Argon2 instance for the build context.
///
/// Tests use reduced-cost parameters (1 MiB / 1 iteration); release builds
/// use the library defaults (Argon2id, ~19 MiB, 2 iterations).
fn argon2_instance() -> Argon2<'static> {
    #[cfg(test)]
    {
        use argon2::{Algorithm, Params, Version};
        let params = Params::new(1024, 1, 1, None).expect("valid reduced-cost Argon2 params");
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    #[cfg(not(test))]
    {
        Argon2::default()
    }
}

pub fn hash_password(plain: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2_instance()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordHashError(e.to_string()))
}

/// Verify a candidate against a stored PHC-format hash.
///
/// A stored hash that fails to parse counts as a mismatch; login must not
/// distinguish "corrupt hash" from "wrong password".
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("stored password hash failed to parse");
        return false;
    };
    argon2_instance()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}
