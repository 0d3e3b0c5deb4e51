use std::path::{Component, Path as FsPath, PathBuf};

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::services::{is_allowed, stored_name, ATTACHMENT_EXTENSIONS, IMAGE_EXTENSIONS};

pub const ATTACHMENTS_SUBDIR: &str = "attachments";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload/photo", post(upload_photo))
        .route("/upload/attachment", post(upload_attachment))
        .route("/attachments/download", get(download_attachment))
}

#[derive(Debug, Serialize)]
pub struct PhotoUploadResponse {
    pub photo_url: String,
}

#[derive(Debug, Serialize)]
pub struct AttachmentUploadResponse {
    pub file_path: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub path: String,
}

async fn read_field(
    multipart: &mut Multipart,
    expected: &str,
) -> ApiResult<(String, bytes::Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(expected) {
            continue;
        }
        let filename = field
            .file_name()
            .map(|f| f.to_string())
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ApiError::Validation("No file selected".into()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read upload: {e}")))?;
        return Ok((filename, data));
    }
    Err(ApiError::Validation(format!("No {expected} provided")))
}

async fn persist(path: &FsPath, data: &[u8]) -> ApiResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ApiError::Storage(e.into()))?;
    }
    tokio::fs::write(path, data)
        .await
        .map_err(|e| ApiError::Storage(e.into()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
            .await
            .map_err(|e| ApiError::Storage(e.into()))?;
    }
    Ok(())
}

#[instrument(skip(state, multipart))]
pub async fn upload_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<PhotoUploadResponse>> {
    let (filename, data) = read_field(&mut multipart, "photo").await?;
    if !is_allowed(&filename, IMAGE_EXTENSIONS) {
        return Err(ApiError::Validation(
            "Invalid file type. Only images are allowed.".into(),
        ));
    }

    let name = stored_name(&filename);
    let path = state.config.uploads_dir.join(&name);
    persist(&path, &data).await?;

    info!(user_id, %name, "photo uploaded");
    Ok(Json(PhotoUploadResponse {
        photo_url: format!("/uploads/{name}"),
    }))
}

#[instrument(skip(state, multipart))]
pub async fn upload_attachment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<AttachmentUploadResponse>> {
    let (filename, data) = read_field(&mut multipart, "attachment").await?;
    if !is_allowed(&filename, ATTACHMENT_EXTENSIONS) {
        return Err(ApiError::Validation("Invalid file type".into()));
    }

    let name = stored_name(&filename);
    let path = state
        .config
        .uploads_dir
        .join(ATTACHMENTS_SUBDIR)
        .join(&name);
    persist(&path, &data).await?;

    info!(user_id, %name, "attachment uploaded");
    Ok(Json(AttachmentUploadResponse {
        file_path: format!("{ATTACHMENTS_SUBDIR}/{name}"),
    }))
}

/// Resolve a stored relative path against the uploads root, rejecting any
/// component that would climb out of it.
fn resolve_download(uploads_dir: &FsPath, relative: &str) -> ApiResult<PathBuf> {
    let rel = FsPath::new(relative);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(ApiError::Forbidden("Invalid file path".into()));
    }
    Ok(uploads_dir.join(rel))
}

#[instrument(skip(state))]
pub async fn download_attachment(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<(HeaderMap, bytes::Bytes)> {
    if query.path.is_empty() {
        return Err(ApiError::Validation("No file path provided".into()));
    }

    let path = resolve_download(&state.config.uploads_dir, &query.path)?;
    let data = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound("File not found".into()))?;

    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("download");
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    Ok((headers, bytes::Bytes::from(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_rejects_parent_traversal() {
        let root = FsPath::new("/data/uploads");
        assert!(resolve_download(root, "../secrets.db").is_err());
        assert!(resolve_download(root, "attachments/../../etc/passwd").is_err());
        assert!(resolve_download(root, "/etc/passwd").is_err());
    }

    #[test]
    fn download_accepts_nested_relative_paths() {
        let root = FsPath::new("/data/uploads");
        let resolved = resolve_download(root, "attachments/20240101_aa_receipt.pdf");
        assert_eq!(
            resolved.ok(),
            Some(PathBuf::from(
                "/data/uploads/attachments/20240101_aa_receipt.pdf"
            ))
        );
    }
}
