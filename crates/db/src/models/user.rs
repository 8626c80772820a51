use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Typed reference to a user: stable identifier plus denormalized display
/// fields for list rendering.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct UserRef {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl From<User> for UserRef {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

impl User {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, name, created_at, updated_at
               FROM users
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, name, created_at, updated_at
               FROM users
               WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Insert the user if the email is new, otherwise refresh the display
    /// name. Identity arrives from the caller (the auth layer is external).
    pub async fn upsert_by_email(
        pool: &SqlitePool,
        email: &str,
        name: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, email, name)
               VALUES ($1, $2, $3)
               ON CONFLICT(email) DO UPDATE SET
                   name = COALESCE(excluded.name, users.name),
                   updated_at = datetime('now', 'subsec')
               RETURNING id, email, name, created_at, updated_at"#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .fetch_one(pool)
        .await
    }
}
