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
    vehicles::handlers::require_owned,
};

use super::dto::{CreateFuelRecordRequest, FuelCreatedResponse, FuelRecordPatch};
use super::repo::{apply_patch, FuelRecord};
use super::services::{compute_economy, distance_since};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicles/:vehicle_id/fuel-records",
            get(list_records).post(create_record),
        )
        .route(
            "/vehicles/:vehicle_id/fuel-records/:record_id",
            get(get_record).put(update_record).delete(delete_record),
        )
}

async fn require_record(
    state: &AppState,
    user_id: i64,
    vehicle_id: i64,
    record_id: i64,
) -> ApiResult<FuelRecord> {
    require_owned(state, vehicle_id, user_id).await?;
    FuelRecord::find_in_vehicle(&state.db, record_id, vehicle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Fuel record not found".into()))
}

#[instrument(skip(state))]
pub async fn list_records(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> ApiResult<Json<Vec<FuelRecord>>> {
    require_owned(&state, vehicle_id, user_id).await?;
    let records = FuelRecord::list_by_vehicle(&state.db, vehicle_id).await?;
    Ok(Json(records))
}

#[instrument(skip(state, payload))]
pub async fn create_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
    Json(payload): Json<CreateFuelRecordRequest>,
) -> ApiResult<(StatusCode, Json<FuelCreatedResponse>)> {
    require_owned(&state, vehicle_id, user_id).await?;
    if payload.fuel_amount <= 0.0 {
        return Err(ApiError::Validation("Fuel amount must be positive".into()));
    }

    let unit = payload.unit.as_deref().unwrap_or("MPG");
    let previous = FuelRecord::last_odometer(&state.db, vehicle_id).await?;
    let distance = distance_since(previous, payload.odometer);
    let fuel_economy = compute_economy(distance, payload.fuel_amount, unit);

    let id = FuelRecord::create(&state.db, vehicle_id, &payload, distance, fuel_economy, unit)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(FuelCreatedResponse {
            id,
            message: "Fuel record added successfully".into(),
            fuel_economy,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, record_id)): Path<(i64, i64)>,
) -> ApiResult<Json<FuelRecord>> {
    let record = require_record(&state, user_id, vehicle_id, record_id).await?;
    Ok(Json(record))
}

#[instrument(skip(state, payload))]
pub async fn update_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, record_id)): Path<(i64, i64)>,
    Json(payload): Json<FuelRecordPatch>,
) -> ApiResult<Json<MessageResponse>> {
    let mut record = require_record(&state, user_id, vehicle_id, record_id).await?;
    apply_patch(&mut record, payload);
    record.update(&state.db).await?;
    Ok(Json(MessageResponse::new("Fuel record updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_record(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, record_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let record = require_record(&state, user_id, vehicle_id, record_id).await?;
    FuelRecord::delete(&state.db, record.id).await?;
    Ok(Json(MessageResponse::new("Fuel record deleted successfully")))
}
