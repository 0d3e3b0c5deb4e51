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

use super::dto::{CreateTodoRequest, TodoPatch};
use super::repo::{apply_patch, Todo};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicles/:vehicle_id/todos",
            get(list_todos).post(create_todo),
        )
        .route(
            "/vehicles/:vehicle_id/todos/:todo_id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}

async fn require_todo(
    state: &AppState,
    user_id: i64,
    vehicle_id: i64,
    todo_id: i64,
) -> ApiResult<Todo> {
    require_owned(state, vehicle_id, user_id).await?;
    Todo::find_in_vehicle(&state.db, todo_id, vehicle_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Todo not found".into()))
}

#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> ApiResult<Json<Vec<Todo>>> {
    require_owned(&state, vehicle_id, user_id).await?;
    let todos = Todo::list_by_vehicle(&state.db, vehicle_id).await?;
    Ok(Json(todos))
}

#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
    Json(payload): Json<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    require_owned(&state, vehicle_id, user_id).await?;
    if payload.description.trim().is_empty() {
        return Err(ApiError::Validation("Description is required".into()));
    }
    let id = Todo::create(&state.db, vehicle_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Todo added successfully".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, todo_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Todo>> {
    let todo = require_todo(&state, user_id, vehicle_id, todo_id).await?;
    Ok(Json(todo))
}

#[instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, todo_id)): Path<(i64, i64)>,
    Json(payload): Json<TodoPatch>,
) -> ApiResult<Json<MessageResponse>> {
    let mut todo = require_todo(&state, user_id, vehicle_id, todo_id).await?;
    apply_patch(&mut todo, payload);
    todo.update(&state.db).await?;
    Ok(Json(MessageResponse::new("Todo updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((vehicle_id, todo_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let todo = require_todo(&state, user_id, vehicle_id, todo_id).await?;
    Todo::delete(&state.db, todo.id).await?;
    Ok(Json(MessageResponse::new("Todo deleted successfully")))
}
