//! Email-verification token lifecycle.
//!
//! Tokens are high-entropy, URL-safe, and single use. Issuing a new token
//! overwrites any prior unconsumed one. Tokens carry no expiry; consumption
//! clears them.

use rand::{rngs::OsRng, RngCore};

/// 32 bytes of OS randomness, hex-encoded (URL-safe by construction).
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn verification_link(base_url: &str, token: &str) -> String {
    format!("{}/verify-email?token={}", base_url.trim_end_matches('/'), token)
}
