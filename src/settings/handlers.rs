use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::MessageResponse, handlers::issue_and_send_verification, is_valid_email, jwt::AuthUser,
        repo::User,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::dto::{
    LanguageRequest, SettingsResponse, ThemeRequest, UnitsRequest, UpdateProfileRequest,
};
use super::repo;

const LANGUAGES: &[&str] = &["en", "de", "es", "fr", "it", "pt", "ru", "uk"];
const UNIT_SYSTEMS: &[&str] = &["metric", "imperial"];
const THEMES: &[&str] = &["light", "dark"];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings))
        .route("/settings/language", post(set_language))
        .route("/settings/units", post(set_units))
        .route("/settings/theme", post(set_theme))
        .route("/user/update-profile", post(update_profile))
}

async fn load_user(state: &AppState, user_id: i64) -> ApiResult<User> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<SettingsResponse>> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(SettingsResponse {
        theme: user.theme,
        language: user.language,
        unit_system: user.unit_system,
        currency: user.currency,
    }))
}

#[instrument(skip(state, payload))]
pub async fn set_language(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LanguageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !LANGUAGES.contains(&payload.language.as_str()) {
        return Err(ApiError::Validation("Unsupported language".into()));
    }
    repo::set_language(&state.db, user_id, &payload.language).await?;
    Ok(Json(MessageResponse::new("Language updated successfully")))
}

#[instrument(skip(state, payload))]
pub async fn set_units(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UnitsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !UNIT_SYSTEMS.contains(&payload.unit_system.as_str()) {
        return Err(ApiError::Validation("Unsupported unit system".into()));
    }
    repo::set_units(&state.db, user_id, &payload.unit_system, payload.currency.as_deref()).await?;
    Ok(Json(MessageResponse::new("Units updated successfully")))
}

#[instrument(skip(state, payload))]
pub async fn set_theme(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ThemeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !THEMES.contains(&payload.theme.as_str()) {
        return Err(ApiError::Validation("Unsupported theme".into()));
    }
    repo::set_theme(&state.db, user_id, &payload.theme).await?;
    Ok(Json(MessageResponse::new("Theme updated successfully")))
}

/// Rename the account or move it to a new email address. A changed email
/// re-enters the verification flow when verification is enabled.
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user = load_user(&state, user_id).await?;

    let username = payload
        .username
        .map(|u| u.trim().to_string())
        .unwrap_or_else(|| user.username.clone());
    let email = payload
        .email
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_else(|| user.email.clone());

    if username.is_empty() {
        return Err(ApiError::Validation("Username cannot be empty".into()));
    }

    if username != user.username
        && User::find_by_username(&state.db, &username).await?.is_some()
    {
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let email_changed = email != user.email;
    if email_changed {
        if !is_valid_email(&email) {
            return Err(ApiError::Validation("Invalid email format".into()));
        }
        if User::find_by_email(&state.db, &email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".into()));
        }
    }

    repo::set_profile(&state.db, user_id, &username, &email).await?;

    if email_changed && state.config.email_verification_enabled {
        issue_and_send_verification(&state, user_id, &username, &email).await?;
    }

    info!(user_id, "profile updated");
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}
