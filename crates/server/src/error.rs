use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use services::services::{projects::ProjectServiceError, tasks::TaskServiceError};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Project(#[from] ProjectServiceError),
    #[error(transparent)]
    Task(#[from] TaskServiceError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Project(ProjectServiceError::NotFound)
            | ApiError::Project(ProjectServiceError::UnknownInviteCode)
            | ApiError::Task(TaskServiceError::TaskNotFound)
            | ApiError::Task(TaskServiceError::ProjectNotFound) => StatusCode::NOT_FOUND,
            ApiError::Task(TaskServiceError::MissingSolution)
            | ApiError::Task(TaskServiceError::UnknownAssignee(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Project(ProjectServiceError::Database(_))
            | ApiError::Task(TaskServiceError::Database(_))
            | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
