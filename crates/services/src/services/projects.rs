//! Project CRUD and invite-code membership.

use db::models::{
    project::{CreateProject, Project, ProjectWithDetail},
    task::Task,
    user::User,
};
use rand::{Rng, distributions::Alphanumeric};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::progress::ProjectProgress;

const INVITE_CODE_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum ProjectServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("project not found")]
    NotFound,
    #[error("unknown invite code")]
    UnknownInviteCode,
}

pub struct ProjectService;

impl ProjectService {
    /// Create a project for `owner_email`, enrolling the owner as the first
    /// member. The owner record is upserted; identity comes from the caller.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProject,
        owner_email: &str,
        owner_name: Option<&str>,
    ) -> Result<ProjectWithDetail, ProjectServiceError> {
        let owner = User::upsert_by_email(pool, owner_email, owner_name).await?;
        let invite_code = Self::unique_invite_code(pool).await?;

        let project = Project::create(pool, data, Uuid::new_v4(), owner.id, &invite_code).await?;
        Project::add_member(pool, project.id, owner.id).await?;

        info!(
            project_id = %project.id,
            owner = %owner.email,
            "created project"
        );

        Ok(project.with_detail(pool, true).await?)
    }

    /// Every project owned by the user, with nested tasks and members.
    pub async fn list_created_by(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Vec<ProjectWithDetail>, ProjectServiceError> {
        let projects = Project::find_by_owner_email(pool, email).await?;
        let mut detailed = Vec::with_capacity(projects.len());
        for project in projects {
            detailed.push(project.with_detail(pool, true).await?);
        }
        Ok(detailed)
    }

    pub async fn get(
        pool: &SqlitePool,
        id: Uuid,
        include_tasks: bool,
    ) -> Result<ProjectWithDetail, ProjectServiceError> {
        let project = Project::find_by_id(pool, id)
            .await?
            .ok_or(ProjectServiceError::NotFound)?;
        Ok(project.with_detail(pool, include_tasks).await?)
    }

    /// Delete a project; its tasks and memberships go with it.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), ProjectServiceError> {
        let rows_affected = Project::delete(pool, id).await?;
        if rows_affected == 0 {
            return Err(ProjectServiceError::NotFound);
        }
        info!(project_id = %id, "deleted project");
        Ok(())
    }

    /// Redeem an invite code: upsert the joining user and enroll them.
    /// Joining twice is a no-op.
    pub async fn join_by_code(
        pool: &SqlitePool,
        invite_code: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<ProjectWithDetail, ProjectServiceError> {
        let project = Project::find_by_invite_code(pool, invite_code)
            .await?
            .ok_or(ProjectServiceError::UnknownInviteCode)?;

        let user = User::upsert_by_email(pool, email, name).await?;
        Project::add_member(pool, project.id, user.id).await?;

        info!(
            project_id = %project.id,
            user = %user.email,
            "user joined project via invite code"
        );

        Ok(project.with_detail(pool, true).await?)
    }

    /// Aggregated progress over the project's current task collection.
    pub async fn progress(
        pool: &SqlitePool,
        project_id: Uuid,
        current_user: Option<&str>,
    ) -> Result<ProjectProgress, ProjectServiceError> {
        if Project::find_by_id(pool, project_id).await?.is_none() {
            return Err(ProjectServiceError::NotFound);
        }
        let tasks = Task::find_by_project_id_with_users(pool, project_id).await?;
        Ok(ProjectProgress::compute(&tasks, current_user))
    }

    /// Generate an invite code no other project uses, regenerating on the
    /// rare collision.
    async fn unique_invite_code(pool: &SqlitePool) -> Result<String, ProjectServiceError> {
        loop {
            let code = generate_invite_code();
            if Project::find_by_invite_code(pool, &code).await?.is_none() {
                return Ok(code);
            }
        }
    }
}

fn generate_invite_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_CODE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_code_shape() {
        let code = generate_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_invite_codes_differ() {
        assert_ne!(generate_invite_code(), generate_invite_code());
    }
}
