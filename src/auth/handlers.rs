use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, DisableTwoFactorRequest, EnableTwoFactorRequest,
            LoginOutcome, LoginRequest, MessageResponse, PublicUser, RefreshRequest,
            RegisterRequest, TwoFactorSetupResponse, UpdateCredentialsRequest,
            VerifyEmailRequest, VerifyTwoFactorRequest,
        },
        is_valid_email,
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, validate_password_policy, verify_password},
        repo::User,
        two_factor, verification,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/verify-2fa", post(verify_two_factor))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/auth/setup-2fa", post(setup_two_factor))
        .route("/auth/enable-2fa", post(enable_two_factor))
        .route("/auth/disable-2fa", post(disable_two_factor))
        .route("/auth/change-password", post(change_password))
        .route("/auth/update-credentials", post(update_credentials))
}

/// Issue a verification token, persist it, and hand it to the mailer.
/// Delivery failures are logged and swallowed (best effort by design);
/// the token itself is always stored.
pub(crate) async fn issue_and_send_verification(
    state: &AppState,
    user_id: i64,
    username: &str,
    email: &str,
) -> ApiResult<()> {
    let token = verification::generate_token();
    User::set_verification_token(&state.db, user_id, &token).await?;
    let link = verification::verification_link(&state.config.public_base_url, &token);
    if let Err(e) = state.mailer.send_verification(email, username, &link).await {
        warn!(error = %e, %email, "failed to send verification email");
    }
    Ok(())
}

/// Establish a session: sign a token pair and record the login time.
async fn establish_session(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id).map_err(ApiError::Internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(ApiError::Internal)?;
    User::touch_last_login(&state.db, user.id).await?;
    info!(user_id = user.id, "session established");
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

async fn load_user(state: &AppState, user_id: i64) -> ApiResult<User> {
    User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    if state.config.signups_disabled {
        return Err(ApiError::Forbidden(
            "Registrations are currently disabled".into(),
        ));
    }

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if username.is_empty() {
        return Err(ApiError::Validation("Username is required".into()));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    validate_password_policy(&payload.password)?;

    // Report duplicates before any write; the UNIQUE constraints backstop
    // races and surface as the same Conflict.
    if User::find_by_username(&state.db, &username).await?.is_some() {
        return Err(ApiError::Conflict("Username already exists".into()));
    }
    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;

    // The first registered account administers the deployment.
    let is_admin = User::count(&state.db).await? == 0;
    let email_verified = !state.config.email_verification_enabled;

    let user_id = User::create(&state.db, &username, &email, &hash, is_admin, email_verified)
        .await
        .map_err(ApiError::from)?;

    let mut message = "User registered successfully".to_string();
    if state.config.email_verification_enabled {
        issue_and_send_verification(&state, user_id, &username, &email).await?;
        message.push_str(". Please check your email to verify your account.");
    }

    info!(user_id, %username, "user registered");
    Ok((StatusCode::CREATED, Json(MessageResponse::new(message))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginOutcome>> {
    // Unknown username and wrong password take the same rejection path so the
    // response does not reveal which check failed.
    let user = User::find_by_username(&state.db, payload.username.trim())
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let ok = verify_password(&payload.password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if state.config.email_verification_enabled && !user.email_verified {
        return Err(ApiError::EmailNotVerified);
    }

    if user.two_factor_enabled {
        return Ok(Json(LoginOutcome::TwoFactorRequired {
            requires_2fa: true,
            user_id: user.id,
        }));
    }

    let session = establish_session(&state, &user).await?;
    Ok(Json(LoginOutcome::Authenticated(session)))
}

#[instrument(skip(state, payload))]
pub async fn verify_two_factor(
    State(state): State<AppState>,
    Json(payload): Json<VerifyTwoFactorRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = User::find_by_id(&state.db, payload.user_id)
        .await?
        .filter(|u| u.two_factor_enabled)
        .ok_or(ApiError::InvalidCode)?;

    let secret = user
        .two_factor_secret
        .as_deref()
        .ok_or(ApiError::InvalidCode)?;

    let totp_ok = two_factor::verify_totp(
        secret,
        &state.config.totp_issuer,
        &user.email,
        payload.code.trim(),
    )?;

    if !totp_ok {
        // Fall back to the single-use backup codes. The compare-and-swap
        // guarantees exactly one winner when the same code races.
        let stored = user.backup_codes.as_deref().unwrap_or("");
        let remaining = two_factor::consume_backup_code(stored, &payload.code)
            .ok_or(ApiError::InvalidCode)?;
        let swapped =
            User::swap_backup_codes(&state.db, user.id, stored, &remaining).await?;
        if !swapped {
            warn!(user_id = user.id, "backup code lost race, rejecting");
            return Err(ApiError::InvalidCode);
        }
        info!(user_id = user.id, "backup code consumed");
    }

    let session = establish_session(&state, &user).await?;
    Ok(Json(session))
}

#[instrument(skip(state, payload))]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if payload.token.is_empty() {
        return Err(ApiError::Validation("Verification token required".into()));
    }
    let user = User::find_by_verification_token(&state.db, &payload.token)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    User::mark_email_verified(&state.db, user.id).await?;
    info!(user_id = user.id, "email verified");
    Ok(Json(MessageResponse::new("Email verified successfully")))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::InvalidCredentials)?;

    let user = load_user(&state, claims.sub).await?;
    let access_token = keys.sign_access(user.id).map_err(ApiError::Internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(ApiError::Internal)?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(PublicUser::from(&user)))
}

#[instrument(skip(state))]
pub async fn setup_two_factor(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<TwoFactorSetupResponse>> {
    let user = load_user(&state, user_id).await?;
    if user.two_factor_enabled {
        return Err(ApiError::AlreadyEnabled);
    }

    let (material, hashed_codes) =
        two_factor::generate_setup(&state.config.totp_issuer, &user.email)?;
    User::store_two_factor_setup(&state.db, user.id, &material.secret, &hashed_codes).await?;

    info!(user_id, "two-factor setup started");
    Ok(Json(TwoFactorSetupResponse {
        secret: material.secret,
        otpauth_url: material.otpauth_url,
        qr_code: format!("data:image/png;base64,{}", material.qr_png_base64),
        backup_codes: material.backup_codes,
    }))
}

#[instrument(skip(state, payload))]
pub async fn enable_two_factor(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<EnableTwoFactorRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user = load_user(&state, user_id).await?;
    let secret = user
        .two_factor_secret
        .as_deref()
        .ok_or(ApiError::SetupNotStarted)?;

    let ok = two_factor::verify_totp(
        secret,
        &state.config.totp_issuer,
        &user.email,
        payload.code.trim(),
    )?;
    if !ok {
        return Err(ApiError::InvalidCode);
    }

    User::enable_two_factor(&state.db, user.id).await?;
    info!(user_id, "two-factor enabled");
    Ok(Json(MessageResponse::new("2FA enabled successfully")))
}

#[instrument(skip(state, payload))]
pub async fn disable_two_factor(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<DisableTwoFactorRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user = load_user(&state, user_id).await?;

    let ok = verify_password(&payload.password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        return Err(ApiError::InvalidPassword);
    }

    User::disable_two_factor(&state.db, user.id).await?;
    info!(user_id, "two-factor disabled");
    Ok(Json(MessageResponse::new("2FA disabled successfully")))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user = load_user(&state, user_id).await?;

    let ok = verify_password(&payload.current_password, &user.password_hash)
        .map_err(ApiError::Internal)?;
    if !ok {
        return Err(ApiError::InvalidPassword);
    }

    validate_password_policy(&payload.new_password)?;
    let hash = hash_password(&payload.new_password).map_err(ApiError::Internal)?;
    User::set_password_hash(&state.db, user.id, &hash).await?;

    info!(user_id, "password changed");
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// First-login flow: replaces username, email, and password in one shot and
/// clears the `must_change_credentials` flag.
#[instrument(skip(state, payload))]
pub async fn update_credentials(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateCredentialsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user = load_user(&state, user_id).await?;

    let new_username = payload.username.trim().to_string();
    let new_email = payload.email.trim().to_lowercase();
    if new_username.is_empty() || new_email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Missing required fields".into()));
    }

    if new_username != user.username
        && User::find_by_username(&state.db, &new_username)
            .await?
            .is_some()
    {
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let email_changed = new_email != user.email;
    if email_changed {
        if !is_valid_email(&new_email) {
            return Err(ApiError::Validation("Invalid email format".into()));
        }
        if User::find_by_email(&state.db, &new_email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".into()));
        }
    }

    validate_password_policy(&payload.password)?;
    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;

    User::update_credentials(&state.db, user.id, &new_username, &new_email, &hash).await?;

    if email_changed && state.config.email_verification_enabled {
        issue_and_send_verification(&state, user.id, &new_username, &new_email).await?;
    }

    info!(user_id, "credentials updated");
    Ok(Json(MessageResponse::new(
        "Credentials updated successfully",
    )))
}
