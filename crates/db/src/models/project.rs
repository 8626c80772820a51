use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    task::{Task, TaskWithUsers},
    user::{User, UserRef},
};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub invite_code: String, // Opaque token granting collaborator access
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

/// Project with its owner, members and tasks resolved. `tasks` and
/// `members` are always present, possibly empty.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ProjectWithDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub project: Project,
    pub owner: Option<UserRef>,
    pub members: Vec<UserRef>,
    pub tasks: Vec<TaskWithUsers>,
}

impl std::ops::Deref for ProjectWithDetail {
    type Target = Project;
    fn deref(&self) -> &Self::Target {
        &self.project
    }
}

impl Project {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"SELECT id, name, description, invite_code, owner_id, created_at, updated_at
               FROM projects
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_invite_code(
        pool: &SqlitePool,
        invite_code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"SELECT id, name, description, invite_code, owner_id, created_at, updated_at
               FROM projects
               WHERE invite_code = $1"#,
        )
        .bind(invite_code)
        .fetch_optional(pool)
        .await
    }

    /// Projects owned by the user with the given email, newest first.
    pub async fn find_by_owner_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"SELECT p.id, p.name, p.description, p.invite_code, p.owner_id,
                      p.created_at, p.updated_at
               FROM projects p
               JOIN users u ON u.id = p.owner_id
               WHERE u.email = $1
               ORDER BY p.created_at DESC"#,
        )
        .bind(email)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProject,
        project_id: Uuid,
        owner_id: Uuid,
        invite_code: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"INSERT INTO projects (id, name, description, invite_code, owner_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, name, description, invite_code, owner_id, created_at, updated_at"#,
        )
        .bind(project_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(invite_code)
        .bind(owner_id)
        .fetch_one(pool)
        .await
    }

    /// Deleting a project cascades to its tasks and memberships.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn members(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<UserRef>, sqlx::Error> {
        sqlx::query_as::<_, UserRef>(
            r#"SELECT u.id, u.email, u.name
               FROM project_members pm
               JOIN users u ON u.id = pm.user_id
               WHERE pm.project_id = $1
               ORDER BY pm.joined_at ASC"#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn add_member(
        pool: &SqlitePool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO project_members (project_id, user_id)
               VALUES ($1, $2)
               ON CONFLICT(project_id, user_id) DO NOTHING"#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn is_member(
        pool: &SqlitePool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.is_some())
    }

    /// Resolve owner, members and (optionally) tasks for this project.
    pub async fn with_detail(
        self,
        pool: &SqlitePool,
        include_tasks: bool,
    ) -> Result<ProjectWithDetail, sqlx::Error> {
        let owner = User::find_by_id(pool, self.owner_id).await?.map(UserRef::from);
        let members = Self::members(pool, self.id).await?;
        let tasks = if include_tasks {
            Task::find_by_project_id_with_users(pool, self.id).await?
        } else {
            Vec::new()
        };

        Ok(ProjectWithDetail {
            project: self,
            owner,
            members,
            tasks,
        })
    }
}
