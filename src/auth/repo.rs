use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::claims::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, name, password_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
    }

    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, name, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, name, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with hashed password. New accounts always start
    /// with the USER role; admins are promoted out of band.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: Option<&str>,
        name: &str,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, name, password_hash, role, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Update the display name, returning the fresh row so callers can
    /// re-sign tokens from persisted state.
    pub async fn update_name(db: &PgPool, id: Uuid, name: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2
            WHERE id = $1
            RETURNING id, username, email, name, password_hash, role, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_one(db)
        .await
    }

    pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(())
    }
}
