use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::ApiError;

/// Hash a plaintext password with a fresh random salt. The plaintext is never
/// stored or logged.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Acceptance policy applied at registration, credential update, and password
/// change. Rules are checked in order and the first unmet one is reported.
pub fn validate_password_policy(plain: &str) -> Result<(), ApiError> {
    if plain.len() < 8 {
        return Err(ApiError::WeakPassword(
            "Password must be at least 8 characters long".into(),
        ));
    }
    if !plain.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::WeakPassword(
            "Password must contain at least one uppercase letter".into(),
        ));
    }
    if !plain.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ApiError::WeakPassword(
            "Password must contain at least one lowercase letter".into(),
        ));
    }
    if !plain.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::WeakPassword(
            "Password must contain at least one number".into(),
        ));
    }
    Ok(())
}
