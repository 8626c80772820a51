//! Routes for individual tasks.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::task::{Task, TaskStatus, TaskWithUsers};
use serde::{Deserialize, Serialize};
use services::services::tasks::{CreateTaskData, TaskService};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
    pub solution: Option<String>,
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateTaskData>,
) -> Result<ResponseJson<ApiResponse<TaskWithUsers>>, ApiError> {
    let task = TaskService::create(&state.db().pool, payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// GET /api/tasks/{task_id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<TaskWithUsers>>, ApiError> {
    let task = TaskService::get_details(&state.db().pool, task_id).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// PUT /api/tasks/{task_id}/status
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateTaskStatusRequest>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = TaskService::change_status(
        &state.db().pool,
        task_id,
        payload.status,
        payload.solution,
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(task)))
}

/// DELETE /api/tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    TaskService::delete(&state.db().pool, task_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/tasks",
        Router::new()
            .route("/", post(create_task))
            .route("/{task_id}", get(get_task).delete(delete_task))
            .route("/{task_id}/status", put(update_task_status)),
    )
}
