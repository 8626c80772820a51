//! Routes for projects, membership and progress.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    project::{CreateProject, ProjectWithDetail},
    task::{TaskStatus, TaskWithUsers},
};
use serde::{Deserialize, Serialize};
use services::services::{
    progress::{ProjectProgress, TaskFilter},
    projects::ProjectService,
    tasks::TaskService,
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub email: String,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct JoinProjectRequest {
    pub invite_code: String,
    pub email: String,
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct GetProjectQuery {
    #[serde(default)]
    pub include_tasks: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub assigned: bool,
    pub email: Option<String>,
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateProjectRequest>,
) -> Result<ResponseJson<ApiResponse<ProjectWithDetail>>, ApiError> {
    let data = CreateProject {
        name: payload.name,
        description: payload.description,
    };
    let project = ProjectService::create(
        &state.db().pool,
        &data,
        &payload.email,
        payload.user_name.as_deref(),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(project)))
}

/// GET /api/projects?email=...
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ProjectWithDetail>>>, ApiError> {
    let projects = ProjectService::list_created_by(&state.db().pool, &query.email).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

/// GET /api/projects/{project_id}?include_tasks=...
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<GetProjectQuery>,
) -> Result<ResponseJson<ApiResponse<ProjectWithDetail>>, ApiError> {
    let include_tasks = query.include_tasks.unwrap_or(true);
    let project = ProjectService::get(&state.db().pool, project_id, include_tasks).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// DELETE /api/projects/{project_id}
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ProjectService::delete(&state.db().pool, project_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/projects/join
pub async fn join_project(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<JoinProjectRequest>,
) -> Result<ResponseJson<ApiResponse<ProjectWithDetail>>, ApiError> {
    let project = ProjectService::join_by_code(
        &state.db().pool,
        &payload.invite_code,
        &payload.email,
        payload.user_name.as_deref(),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(project)))
}

/// GET /api/projects/{project_id}/progress?email=...
pub async fn get_project_progress(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ProgressQuery>,
) -> Result<ResponseJson<ApiResponse<ProjectProgress>>, ApiError> {
    let progress =
        ProjectService::progress(&state.db().pool, project_id, query.email.as_deref()).await?;
    Ok(ResponseJson(ApiResponse::success(progress)))
}

/// GET /api/projects/{project_id}/tasks?status=...&assigned=...&email=...
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ListTasksQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskWithUsers>>>, ApiError> {
    let filter = TaskFilter {
        status: query.status,
        assigned_only: query.assigned,
    };
    let tasks = TaskService::list_for_project(
        &state.db().pool,
        project_id,
        &filter,
        query.email.as_deref(),
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/projects",
        Router::new()
            .route("/", post(create_project).get(list_projects))
            .route("/join", post(join_project))
            .route("/{project_id}", get(get_project).delete(delete_project))
            .route("/{project_id}/progress", get(get_project_progress))
            .route("/{project_id}/tasks", get(list_project_tasks)),
    )
}
