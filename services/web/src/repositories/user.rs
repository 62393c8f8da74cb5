//! User repository.

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::{credentials, models::{NewUser, User}};

const USER_COLUMNS: &str =
    "id, username, password_hash, email, is_admin, first_name, family_name, created_at, updated_at";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        email: row.get("email"),
        is_admin: row.get("is_admin"),
        first_name: row.get("first_name"),
        family_name: row.get("family_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// User repository over the entity store.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user. The plaintext password is hashed here; nothing
    /// unhashed ever reaches the store.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = credentials::hash_password(&new_user.password)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, password_hash, email, is_admin, first_name, family_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new_user.username)
        .bind(&password_hash)
        .bind(&new_user.email)
        .bind(new_user.is_admin)
        .bind(&new_user.first_name)
        .bind(&new_user.family_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(&row))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1
            "#,
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// All users, ordered by first name.
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY first_name ASC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Replace a user's fields. The submitted password is re-hashed;
    /// the stored hash is never overwritten with plaintext.
    pub async fn update(&self, id: Uuid, new_user: &NewUser) -> Result<Option<User>> {
        info!(%id, "Updating user");

        let password_hash = credentials::hash_password(&new_user.password)?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET username = $2, password_hash = $3, email = $4, is_admin = $5,
                first_name = $6, family_name = $7, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&new_user.username)
        .bind(&password_hash)
        .bind(&new_user.email)
        .bind(new_user.is_admin)
        .bind(&new_user.first_name)
        .bind(&new_user.family_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Delete a user. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!(%id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
