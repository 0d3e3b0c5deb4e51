use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use time::macros::format_description;
use tracing::{info, instrument};

use crate::{
    auth::{dto::MessageResponse, jwt::AuthUser, repo::User},
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/backup/create", get(create_backup))
        .route("/backup/restore", post(restore_backup))
}

/// Backup and restore move the whole deployment's data; only administrators
/// get to touch them.
async fn require_admin(state: &AppState, user_id: i64) -> ApiResult<User> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    if !user.is_admin {
        return Err(ApiError::Forbidden("Administrator access required".into()));
    }
    Ok(user)
}

#[instrument(skip(state))]
pub async fn create_backup(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<(HeaderMap, Vec<u8>)> {
    require_admin(&state, user_id).await?;

    let store_path = state.config.store_path();
    let uploads_dir = state.config.uploads_dir.clone();
    let archive = tokio::task::spawn_blocking(move || {
        services::create_backup_archive(&store_path, &uploads_dir)
    })
    .await
    .map_err(|e| ApiError::Internal(e.into()))?
    .map_err(ApiError::Storage)?;

    let stamp = time::OffsetDateTime::now_utc()
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .map_err(|e| ApiError::Internal(e.into()))?;
    let filename = format!("garagekeep_backup_{stamp}.zip");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/zip"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    info!(user_id, "backup downloaded");
    Ok((headers, archive))
}

#[instrument(skip(state, multipart))]
pub async fn restore_backup(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&state, user_id).await?;

    let mut archive = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("backup") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_lowercase();
        if !filename.ends_with(".zip") {
            return Err(ApiError::Validation(
                "Invalid file type. Please upload a .zip file.".into(),
            ));
        }
        archive = Some(
            field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read upload: {e}")))?,
        );
        break;
    }
    let archive = archive.ok_or_else(|| ApiError::Validation("No backup file provided".into()))?;

    let store_path = state.config.store_path();
    let uploads_dir = state.config.uploads_dir.clone();
    tokio::task::spawn_blocking(move || {
        services::restore_backup_archive(&archive, &store_path, &uploads_dir)
    })
    .await
    .map_err(|e| ApiError::Internal(e.into()))??;

    info!(user_id, "backup restored; restart recommended");
    Ok(Json(MessageResponse::new(
        "Backup restored successfully. Please restart the application.",
    )))
}
