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

use super::dto::{CreateExpenseRequest, ExpensePatch};
use super::repo::{apply_patch, RecurringExpense};
use super::services::first_due_date;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicles/:vehicle_id/recurring-expenses",
            get(list_expenses).post(create_expense),
        )
        .route(
            "/vehicles/:vehicle_id/recurring-expenses/:expense_id",
            get(get_expense).put(update_expense).delete(cancel_expense),
        )
}

async fn require_expense(
    state: &AppState,
    user_id: i64,
    vehicle_id: i64,
    expense_id: i64,
) -> ApiResult<RecurringExpense> {
    require_owned(state, vehicle_id, user_id).await?;
    RecurringExpense::find_in_vehicle(&state.db, expense_id, vehicle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recurring expense not found".into()))
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> ApiResult<Json<Vec<RecurringExpense>>> {
    require_owned(&state, vehicle_id, user_id).await?;
    let expenses = RecurringExpense::list_active(&state.db, vehicle_id).await?;
    Ok(Json(expenses))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
    Json(payload): Json<CreateExpenseRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    require_owned(&state, vehicle_id, user_id).await?;
    if payload.amount <= 0.0 {
        return Err(ApiError::Validation("Amount must be positive".into()));
    }
    let next_due = first_due_date(payload.start_date, &payload.frequency);
    let id = RecurringExpense::create(&state.db, vehicle_id, &payload, next_due).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Recurring expense added successfully".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, expense_id)): Path<(i64, i64)>,
) -> ApiResult<Json<RecurringExpense>> {
    let expense = require_expense(&state, user_id, vehicle_id, expense_id).await?;
    Ok(Json(expense))
}

#[instrument(skip(state, payload))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, expense_id)): Path<(i64, i64)>,
    Json(payload): Json<ExpensePatch>,
) -> ApiResult<Json<MessageResponse>> {
    let mut expense = require_expense(&state, user_id, vehicle_id, expense_id).await?;
    apply_patch(&mut expense, payload);
    expense.update(&state.db).await?;
    Ok(Json(MessageResponse::new(
        "Recurring expense updated successfully",
    )))
}

#[instrument(skip(state))]
pub async fn cancel_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, expense_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let expense = require_expense(&state, user_id, vehicle_id, expense_id).await?;
    RecurringExpense::deactivate(&state.db, expense.id).await?;
    Ok(Json(MessageResponse::new(
        "Recurring expense cancelled successfully",
    )))
}
