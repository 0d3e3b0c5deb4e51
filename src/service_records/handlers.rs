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
    vehicles::dto::CreatedResponse,
    vehicles::handlers::require_owned,
};

use super::dto::{CreateServiceRecordRequest, ServiceRecordPatch};
use super::repo::{apply_patch, ServiceRecord};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicles/:vehicle_id/service-records",
            get(list_records).post(create_record),
        )
        .route(
            "/vehicles/:vehicle_id/service-records/:record_id",
            get(get_record).put(update_record).delete(delete_record),
        )
}

async fn require_record(
    state: &AppState,
    user_id: i64,
    vehicle_id: i64,
    record_id: i64,
) -> ApiResult<ServiceRecord> {
    require_owned(state, vehicle_id, user_id).await?;
    ServiceRecord::find_in_vehicle(&state.db, record_id, vehicle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service record not found".into()))
}

#[instrument(skip(state))]
pub async fn list_records(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> ApiResult<Json<Vec<ServiceRecord>>> {
    require_owned(&state, vehicle_id, user_id).await?;
    let records = ServiceRecord::list_by_vehicle(&state.db, vehicle_id).await?;
    Ok(Json(records))
}

#[instrument(skip(state, payload))]
pub async fn create_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
    Json(payload): Json<CreateServiceRecordRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    require_owned(&state, vehicle_id, user_id).await?;
    if payload.description.trim().is_empty() {
        return Err(ApiError::Validation("Description is required".into()));
    }
    let id = ServiceRecord::create(&state.db, vehicle_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Service record added successfully".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, record_id)): Path<(i64, i64)>,
) -> ApiResult<Json<ServiceRecord>> {
    let record = require_record(&state, user_id, vehicle_id, record_id).await?;
    Ok(Json(record))
}

#[instrument(skip(state, payload))]
pub async fn update_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, record_id)): Path<(i64, i64)>,
    Json(payload): Json<ServiceRecordPatch>,
) -> ApiResult<Json<MessageResponse>> {
    let mut record = require_record(&state, user_id, vehicle_id, record_id).await?;
    apply_patch(&mut record, payload);
    record.update(&state.db).await?;
    Ok(Json(MessageResponse::new(
        "Service record updated successfully",
    )))
}

#[instrument(skip(state))]
pub async fn delete_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, record_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let record = require_record(&state, user_id, vehicle_id, record_id).await?;
    ServiceRecord::delete(&state.db, record.id).await?;
    Ok(Json(MessageResponse::new(
        "Service record deleted successfully",
    )))
}
