use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{dto::MessageResponse, jwt::AuthUser},
    error::{ApiError, ApiResult},
    state::AppState,
    vehicles::{dto::CreatedResponse, handlers::require_owned},
};

use super::dto::{CreateReminderRequest, ReminderPatch};
use super::repo::{apply_patch, Reminder};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicles/:vehicle_id/reminders",
            get(list_reminders).post(create_reminder),
        )
        .route(
            "/vehicles/:vehicle_id/reminders/:reminder_id",
            get(get_reminder)
                .put(update_reminder)
                .delete(delete_reminder),
        )
}

async fn require_reminder(
    state: &AppState,
    user_id: i64,
    vehicle_id: i64,
    reminder_id: i64,
) -> ApiResult<Reminder> {
    require_owned(state, vehicle_id, user_id).await?;
    Reminder::find_in_vehicle(&state.db, reminder_id, vehicle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reminder not found".into()))
}

#[instrument(skip(state))]
pub async fn list_reminders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> ApiResult<Json<Vec<Reminder>>> {
    require_owned(&state, vehicle_id, user_id).await?;
    let reminders = Reminder::list_open(&state.db, vehicle_id).await?;
    Ok(Json(reminders))
}

#[instrument(skip(state, payload))]
pub async fn create_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
    Json(payload): Json<CreateReminderRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    require_owned(&state, vehicle_id, user_id).await?;
    if payload.description.trim().is_empty() {
        return Err(ApiError::Validation("Description is required".into()));
    }
    let id = Reminder::create(&state.db, vehicle_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Reminder added successfully".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, reminder_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Reminder>> {
    let reminder = require_reminder(&state, user_id, vehicle_id, reminder_id).await?;
    Ok(Json(reminder))
}

#[instrument(skip(state, payload))]
pub async fn update_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, reminder_id)): Path<(i64, i64)>,
    Json(payload): Json<ReminderPatch>,
) -> ApiResult<Json<MessageResponse>> {
    let mut reminder = require_reminder(&state, user_id, vehicle_id, reminder_id).await?;
    apply_patch(&mut reminder, payload);
    reminder.update(&state.db).await?;
    Ok(Json(MessageResponse::new("Reminder updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, reminder_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let reminder = require_reminder(&state, user_id, vehicle_id, reminder_id).await?;
    Reminder::delete(&state.db, reminder.id).await?;
    Ok(Json(MessageResponse::new("Reminder deleted successfully")))
}
