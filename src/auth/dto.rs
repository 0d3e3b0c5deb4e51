use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTwoFactorRequest {
    pub user_id: i64,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct EnableTwoFactorRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct DisableTwoFactorRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCredentialsRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Public part of the account returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub theme: String,
    pub language: String,
    pub unit_system: String,
    pub currency: String,
    pub photo: Option<String>,
    pub first_login: bool,
    pub must_change_credentials: bool,
    pub email_verified: bool,
    pub two_factor_enabled: bool,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            theme: u.theme.clone(),
            language: u.language.clone(),
            unit_system: u.unit_system.clone(),
            currency: u.currency.clone(),
            photo: u.photo.clone(),
            first_login: u.first_login,
            must_change_credentials: u.must_change_credentials,
            email_verified: u.email_verified,
            two_factor_enabled: u.two_factor_enabled,
        }
    }
}

/// Response returned once a session is established.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Login either establishes a session or hands back a two-factor challenge.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginOutcome {
    TwoFactorRequired { requires_2fa: bool, user_id: i64 },
    Authenticated(AuthResponse),
}

/// Returned exactly once from two-factor setup; neither the secret nor the
/// plaintext backup codes can be retrieved again.
#[derive(Debug, Serialize)]
pub struct TwoFactorSetupResponse {
    pub secret: String,
    pub otpauth_url: String,
    pub qr_code: String,
    pub backup_codes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
