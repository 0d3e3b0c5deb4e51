//! Two-factor authentication: time-based one-time codes plus single-use
//! backup codes.
//!
//! Per-account state machine: disabled -> pending (secret stored, not yet
//! confirmed) -> enabled, and enabled -> disabled on explicit opt-out with
//! password reconfirmation. The persistence side lives in `auth::repo`.

use rand::{rngs::OsRng, RngCore};
use totp_rs::{Algorithm, Secret, TOTP};

use crate::auth::password::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};

pub const BACKUP_CODE_COUNT: usize = 10;

const DIGITS: usize = 6;
const STEP: u64 = 30;
/// Accept the previous and next 30-second window so a step of clock drift on
/// the client does not falsely reject a code.
const SKEW: u8 = 1;

/// Everything handed to the account exactly once at setup time. The secret
/// and backup codes are not retrievable afterwards; only the backup-code
/// hashes are stored.
pub struct SetupMaterial {
    pub secret: String,
    pub otpauth_url: String,
    pub qr_png_base64: String,
    pub backup_codes: Vec<String>,
}

fn build_totp(secret_b32: &str, issuer: &str, account_email: &str) -> ApiResult<TOTP> {
    let secret = Secret::Encoded(secret_b32.to_string())
        .to_bytes()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("invalid totp secret: {e:?}")))?;
    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP,
        secret,
        Some(issuer.to_string()),
        account_email.to_string(),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("totp init: {e}")))
}

/// Generate a fresh shared secret plus provisioning material for a
/// standards-compliant one-time-code app.
pub fn generate_setup(issuer: &str, account_email: &str) -> ApiResult<(SetupMaterial, String)> {
    let secret_b32 = Secret::generate_secret().to_encoded().to_string();
    let totp = build_totp(&secret_b32, issuer, account_email)?;
    let otpauth_url = totp.get_url();
    let qr_png_base64 = totp
        .get_qr_base64()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("qr render: {e}")))?;
    let (backup_codes, hashed) = generate_backup_codes()?;
    Ok((
        SetupMaterial {
            secret: secret_b32,
            otpauth_url,
            qr_png_base64,
            backup_codes,
        },
        hashed,
    ))
}

/// Check a code against the stored secret for the current time step,
/// tolerating one step of drift either side.
pub fn verify_totp(secret_b32: &str, issuer: &str, account_email: &str, code: &str) -> ApiResult<bool> {
    let totp = build_totp(secret_b32, issuer, account_email)?;
    let ok = totp
        .check_current(code)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("system clock: {e}")))?;
    Ok(ok)
}

/// Produce `BACKUP_CODE_COUNT` random single-use codes. Returns the
/// plaintext codes (shown to the user once) and the comma-joined hashes
/// that get persisted.
pub fn generate_backup_codes() -> ApiResult<(Vec<String>, String)> {
    let mut plain = Vec::with_capacity(BACKUP_CODE_COUNT);
    let mut hashes = Vec::with_capacity(BACKUP_CODE_COUNT);
    for _ in 0..BACKUP_CODE_COUNT {
        let mut bytes = [0u8; 4];
        OsRng.fill_bytes(&mut bytes);
        let code: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
        hashes.push(hash_password(&code).map_err(ApiError::Internal)?);
        plain.push(code);
    }
    Ok((plain, hashes.join(",")))
}

/// Match `code` against the stored hash list. On a hit, returns the list with
/// that entry removed (the caller persists it with a compare-and-swap so the
/// code is consumed exactly once). `None` means no match.
pub fn consume_backup_code(stored: &str, code: &str) -> Option<String> {
    let candidate = code.trim().to_uppercase();
    let mut hashes: Vec<&str> = stored.split(',').filter(|s| !s.is_empty()).collect();
    let hit = hashes
        .iter()
        .position(|h| verify_password(&candidate, h).unwrap_or(false))?;
    hashes.remove(hit);
    Some(hashes.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_code_verifies_and_wrong_secret_does_not() {
        let secret = Secret::generate_secret().to_encoded().to_string();
        let totp = build_totp(&secret, "GarageKeep", "a@example.com").unwrap();
        let code = totp.generate_current().unwrap();

        assert!(verify_totp(&secret, "GarageKeep", "a@example.com", &code).unwrap());

        let other = Secret::generate_secret().to_encoded().to_string();
        assert!(!verify_totp(&other, "GarageKeep", "a@example.com", &code).unwrap());
    }

    #[test]
    fn one_step_of_clock_drift_is_tolerated_but_no_more() {
        let secret = Secret::generate_secret().to_encoded().to_string();
        let totp = build_totp(&secret, "GarageKeep", "a@example.com").unwrap();
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // A code from the previous 30-second window still verifies.
        let previous = totp.generate(now - STEP);
        assert!(verify_totp(&secret, "GarageKeep", "a@example.com", &previous).unwrap());

        // Two windows back is outside the tolerance.
        let stale = totp.generate(now - 2 * STEP);
        assert!(!verify_totp(&secret, "GarageKeep", "a@example.com", &stale).unwrap());
    }

    #[test]
    fn setup_material_contains_provisioning_uri() {
        let (material, hashed) = generate_setup("GarageKeep", "a@example.com").unwrap();
        assert!(material.otpauth_url.starts_with("otpauth://totp/"));
        assert!(material.otpauth_url.contains("GarageKeep"));
        assert_eq!(material.backup_codes.len(), BACKUP_CODE_COUNT);
        assert_eq!(hashed.split(',').count(), BACKUP_CODE_COUNT);
        // Plaintext codes are never part of the persisted value.
        for code in &material.backup_codes {
            assert!(!hashed.contains(code.as_str()));
        }
    }

    #[test]
    fn backup_code_is_single_use() {
        let (plain, hashed) = generate_backup_codes().unwrap();
        let code = &plain[3];

        let remaining = consume_backup_code(&hashed, code).expect("first use matches");
        assert_eq!(remaining.split(',').count(), BACKUP_CODE_COUNT - 1);

        // Same code against the updated list no longer matches.
        assert!(consume_backup_code(&remaining, code).is_none());

        // Other codes still work regardless of order.
        assert!(consume_backup_code(&remaining, &plain[7]).is_some());
    }

    #[test]
    fn unknown_backup_code_does_not_match() {
        let (_, hashed) = generate_backup_codes().unwrap();
        assert!(consume_backup_code(&hashed, "ZZZZZZZZ").is_none());
    }
}
