use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub jwt: JwtConfig,
    /// When false, new accounts are considered verified at creation.
    pub email_verification_enabled: bool,
    pub signups_disabled: bool,
    /// Base URL embedded in verification links.
    pub public_base_url: String,
    /// Issuer name shown by authenticator apps.
    pub totp_issuer: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir: PathBuf = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| "./data".into())
            .into();
        let uploads_dir: PathBuf = std::env::var("UPLOADS_DIR")
            .unwrap_or_else(|_| "./uploads".into())
            .into();
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "garagekeep".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "garagekeep-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 12),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        Ok(Self {
            data_dir,
            uploads_dir,
            jwt,
            email_verification_enabled: env_flag("ENABLE_EMAIL_VERIFICATION"),
            signups_disabled: env_flag("DISABLE_SIGNUPS"),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            totp_issuer: std::env::var("TOTP_ISSUER").unwrap_or_else(|_| "GarageKeep".into()),
        })
    }

    /// Path of the SQLite database file inside the data directory.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(crate::backup::STORE_FILE_NAME)
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
