//! Password hashing with Argon2id.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PasswordError {
    #[error("password hash error: {0}")]
    Hash(String),
}

/// Hash verified when the login email is unknown, so that path costs the same as a
/// wrong password. Forced at startup by `init_dummy_hash`.
static DUMMY_HASH: LazyLock<Result<String, PasswordError>> =
    LazyLock::new(|| hash_password("lms-timing-equalizer"));

/// Computes the dummy hash up front so the first unknown-email login does not pay for it.
pub fn init_dummy_hash() -> Result<(), PasswordError> {
    DUMMY_HASH.as_ref().map(|_| ()).map_err(Clone::clone)
}

/// Hashes `password` with a fresh random salt into a PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// `Ok(true)` on match, `Ok(false)` on mismatch, `Err` if the stored hash is malformed.
pub fn verify_password(candidate: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| PasswordError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}

/// Burns one verification against the dummy hash. The result is meaningless.
///
/// If the dummy hash could not be built, one fresh hash of `candidate` is computed
/// instead so the unknown-email path still costs one Argon2 run.
pub fn verify_against_dummy(candidate: &str) {
    match DUMMY_HASH.as_ref() {
        Ok(hash) => {
            let _ = verify_password(candidate, hash);
        }
        Err(e) => {
            tracing::error!("dummy hash unavailable, hashing candidate instead: {}", e);
            let _ = hash_password(candidate);
        }
    }
}
