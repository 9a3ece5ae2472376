//! Argon2id password hashing. Stored values are PHC strings.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::rngs::OsRng;

use crate::errors::AppError;

pub async fn hash_password(plaintext: &str) -> Result<String, AppError> {
    let plaintext = plaintext.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&plaintext))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

/// Returns `false` for a wrong password and for a malformed stored hash.
pub async fn verify_password(plaintext: &str, stored_hash: &str) -> Result<bool, AppError> {
    let plaintext = plaintext.to_owned();
    let stored_hash = stored_hash.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&plaintext, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

fn hash_blocking(plaintext: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

fn verify_blocking(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash could not be parsed");
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}
