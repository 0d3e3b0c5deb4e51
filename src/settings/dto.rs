use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub theme: String,
    pub language: String,
    pub unit_system: String,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct UnitsRequest {
    pub unit_system: String,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}
