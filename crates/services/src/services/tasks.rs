//! Task lifecycle: creation, status transitions, deletion, filtered listing.

use chrono::{DateTime, Utc};
use db::models::{
    project::Project,
    task::{CreateTask, Task, TaskStatus, TaskWithUsers},
    user::User,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::progress::TaskFilter;

#[derive(Debug, Error)]
pub enum TaskServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("task not found")]
    TaskNotFound,
    #[error("project not found")]
    ProjectNotFound,
    #[error("unknown assignee: {0}")]
    UnknownAssignee(String),
    #[error("closing a task requires a non-empty solution")]
    MissingSolution,
}

/// Input for task creation. The assignee is referenced by email and must
/// already be known; the author is upserted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTaskData {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee_email: Option<String>,
    pub created_by_email: Option<String>,
}

pub struct TaskService;

impl TaskService {
    pub async fn create(
        pool: &SqlitePool,
        data: CreateTaskData,
    ) -> Result<TaskWithUsers, TaskServiceError> {
        if Project::find_by_id(pool, data.project_id).await?.is_none() {
            return Err(TaskServiceError::ProjectNotFound);
        }

        let assignee_id = match &data.assignee_email {
            Some(email) => Some(
                User::find_by_email(pool, email)
                    .await?
                    .ok_or_else(|| TaskServiceError::UnknownAssignee(email.clone()))?
                    .id,
            ),
            None => None,
        };

        let created_by = match &data.created_by_email {
            Some(email) => Some(User::upsert_by_email(pool, email, None).await?.id),
            None => None,
        };

        let create = CreateTask {
            project_id: data.project_id,
            name: data.name,
            description: data.description,
            status: Some(TaskStatus::Todo),
            assignee_id,
            created_by,
            due_date: data.due_date,
        };

        let task = Task::create(pool, &create, Uuid::new_v4()).await?;
        info!(task_id = %task.id, project_id = %task.project_id, "created task");

        Task::find_by_id_with_users(pool, task.id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound)
    }

    /// Task with its assignee and author resolved.
    pub async fn get_details(
        pool: &SqlitePool,
        task_id: Uuid,
    ) -> Result<TaskWithUsers, TaskServiceError> {
        Task::find_by_id_with_users(pool, task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound)
    }

    /// Moving a task to Done requires a non-empty solution write-up;
    /// whitespace does not count.
    pub async fn change_status(
        pool: &SqlitePool,
        task_id: Uuid,
        new_status: TaskStatus,
        solution: Option<String>,
    ) -> Result<Task, TaskServiceError> {
        let solution = solution
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if new_status == TaskStatus::Done && solution.is_none() {
            return Err(TaskServiceError::MissingSolution);
        }

        let task = Task::update_status(pool, task_id, new_status.clone(), solution)
            .await?
            .ok_or(TaskServiceError::TaskNotFound)?;

        info!(task_id = %task.id, status = %new_status, "task status changed");
        Ok(task)
    }

    pub async fn delete(pool: &SqlitePool, task_id: Uuid) -> Result<(), TaskServiceError> {
        let rows_affected = Task::delete(pool, task_id).await?;
        if rows_affected == 0 {
            return Err(TaskServiceError::TaskNotFound);
        }
        info!(task_id = %task_id, "deleted task");
        Ok(())
    }

    /// Fetch the project's tasks and apply the pure filter over them.
    pub async fn list_for_project(
        pool: &SqlitePool,
        project_id: Uuid,
        filter: &TaskFilter,
        current_user: Option<&str>,
    ) -> Result<Vec<TaskWithUsers>, TaskServiceError> {
        if Project::find_by_id(pool, project_id).await?.is_none() {
            return Err(TaskServiceError::ProjectNotFound);
        }
        let tasks = Task::find_by_project_id_with_users(pool, project_id).await?;
        Ok(filter.apply(&tasks, current_user))
    }
}
