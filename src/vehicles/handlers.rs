use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{dto::MessageResponse, jwt::AuthUser},
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::dto::{CreateVehicleRequest, CreatedResponse, VehiclePatch};
use super::repo::{apply_patch, Vehicle};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/vehicles/:vehicle_id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

pub(crate) async fn require_owned(
    state: &AppState,
    vehicle_id: i64,
    user_id: i64,
) -> ApiResult<Vehicle> {
    Vehicle::find_owned(&state.db, vehicle_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vehicle not found".into()))
}

#[instrument(skip(state))]
pub async fn list_vehicles(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Vehicle>>> {
    let vehicles = Vehicle::list_by_user(&state.db, user_id).await?;
    Ok(Json(vehicles))
}

#[instrument(skip(state, payload))]
pub async fn create_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateVehicleRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    if payload.make.trim().is_empty() || payload.model.trim().is_empty() {
        return Err(ApiError::Validation("Make and model are required".into()));
    }
    let id = Vehicle::create(&state.db, user_id, &payload).await?;
    info!(user_id, vehicle_id = id, "vehicle added");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Vehicle added successfully".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> ApiResult<Json<Vehicle>> {
    let vehicle = require_owned(&state, vehicle_id, user_id).await?;
    Ok(Json(vehicle))
}

#[instrument(skip(state, payload))]
pub async fn update_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
    Json(payload): Json<VehiclePatch>,
) -> ApiResult<Json<MessageResponse>> {
    let mut vehicle = require_owned(&state, vehicle_id, user_id).await?;
    apply_patch(&mut vehicle, payload);
    vehicle.update(&state.db).await?;
    Ok(Json(MessageResponse::new("Vehicle updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let vehicle = require_owned(&state, vehicle_id, user_id).await?;
    Vehicle::delete(&state.db, vehicle.id).await?;
    info!(user_id, vehicle_id, "vehicle deleted");
    Ok(Json(MessageResponse::new("Vehicle deleted successfully")))
}
