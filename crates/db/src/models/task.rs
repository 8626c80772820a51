use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::user::UserRef;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid, // Foreign key to Project
    pub name: String,
    pub description: Option<String>, // Rich text blob
    pub solution: Option<String>,    // Closing write-up, required once Done
    pub status: TaskStatus,
    pub assignee_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task joined with its assignee and author for display and filtering.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TaskWithUsers {
    #[serde(flatten)]
    #[ts(flatten)]
    pub task: Task,
    pub assignee: Option<UserRef>,
    pub author: Option<UserRef>,
}

impl std::ops::Deref for TaskWithUsers {
    type Target = Task;
    fn deref(&self) -> &Self::Target {
        &self.task
    }
}

impl std::ops::DerefMut for TaskWithUsers {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.task
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTask {
    pub fn from_name_description(
        project_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> Self {
        Self {
            project_id,
            name,
            description,
            status: Some(TaskStatus::Todo),
            assignee_id: None,
            created_by: None,
            due_date: None,
        }
    }
}

/// Flat row shape for the user-joined task queries.
#[derive(FromRow)]
struct TaskWithUsersRow {
    id: Uuid,
    project_id: Uuid,
    name: String,
    description: Option<String>,
    solution: Option<String>,
    status: TaskStatus,
    assignee_id: Option<Uuid>,
    created_by: Option<Uuid>,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assignee_email: Option<String>,
    assignee_name: Option<String>,
    author_email: Option<String>,
    author_name: Option<String>,
}

impl From<TaskWithUsersRow> for TaskWithUsers {
    fn from(rec: TaskWithUsersRow) -> Self {
        let assignee = match (rec.assignee_id, rec.assignee_email) {
            (Some(id), Some(email)) => Some(UserRef {
                id,
                email,
                name: rec.assignee_name,
            }),
            _ => None,
        };
        let author = match (rec.created_by, rec.author_email) {
            (Some(id), Some(email)) => Some(UserRef {
                id,
                email,
                name: rec.author_name,
            }),
            _ => None,
        };
        TaskWithUsers {
            task: Task {
                id: rec.id,
                project_id: rec.project_id,
                name: rec.name,
                description: rec.description,
                solution: rec.solution,
                status: rec.status,
                assignee_id: rec.assignee_id,
                created_by: rec.created_by,
                due_date: rec.due_date,
                created_at: rec.created_at,
                updated_at: rec.updated_at,
            },
            assignee,
            author,
        }
    }
}

const TASK_WITH_USERS_SELECT: &str = r#"SELECT
  t.id, t.project_id, t.name, t.description, t.solution, t.status,
  t.assignee_id, t.created_by, t.due_date, t.created_at, t.updated_at,
  a.email AS assignee_email, a.name AS assignee_name,
  c.email AS author_email,  c.name AS author_name
FROM tasks t
LEFT JOIN users a ON a.id = t.assignee_id
LEFT JOIN users c ON c.id = t.created_by"#;

impl Task {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"SELECT id, project_id, name, description, solution, status,
                      assignee_id, created_by, due_date, created_at, updated_at
               FROM tasks
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_with_users(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<TaskWithUsers>, sqlx::Error> {
        let record = sqlx::query_as::<_, TaskWithUsersRow>(&format!(
            "{TASK_WITH_USERS_SELECT}\nWHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record.map(TaskWithUsers::from))
    }

    /// All tasks of a project in creation order. Counts and filtered views
    /// are derived from this collection, so the ordering is part of the
    /// contract.
    pub async fn find_by_project_id_with_users(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<TaskWithUsers>, sqlx::Error> {
        let records = sqlx::query_as::<_, TaskWithUsersRow>(&format!(
            "{TASK_WITH_USERS_SELECT}\nWHERE t.project_id = $1\nORDER BY t.created_at ASC, t.id ASC"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(records.into_iter().map(TaskWithUsers::from).collect())
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let status = data.status.clone().unwrap_or_default();
        sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks (id, project_id, name, description, status, assignee_id, created_by, due_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id, project_id, name, description, solution, status,
                         assignee_id, created_by, due_date, created_at, updated_at"#,
        )
        .bind(task_id)
        .bind(data.project_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(status)
        .bind(data.assignee_id)
        .bind(data.created_by)
        .bind(data.due_date)
        .fetch_one(pool)
        .await
    }

    /// Move a task to `status`, storing the closing solution when one is
    /// given. The Done-requires-solution rule lives in the task service;
    /// this is the raw write.
    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: TaskStatus,
        solution: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks
               SET status = $2,
                   solution = COALESCE($3, solution),
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, project_id, name, description, solution, status,
                         assignee_id, created_by, due_date, created_at, updated_at"#,
        )
        .bind(id)
        .bind(status)
        .bind(solution)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
