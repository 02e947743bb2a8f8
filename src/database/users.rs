// ABOUTME: User account database operations
// ABOUTME: Registration with a hashed API token, lookup by id or token hash, paginated listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{count_from_i64, parse_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::pagination::PageRequest;

/// User queries
#[derive(Clone)]
pub struct UsersManager {
    pool: SqlitePool,
}

impl UsersManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a user whose API token hashes to `token_hash`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for bad fields, `ResourceAlreadyExists` when the
    /// username or email is taken, or a database error
    pub async fn create(&self, request: &NewUser, token_hash: &str) -> AppResult<User> {
        request.validate()?;
        let user = User {
            id: Uuid::new_v4(),
            username: request.username.clone(),
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            avatar: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO users (id, username, email, first_name, last_name, token_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(token_hash)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::already_exists(
                format!("User with username '{}' or email '{}' already exists", user.username, user.email),
            ),
            other => AppError::database(format!("Failed to create user: {other}")),
        })?;

        Ok(user)
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, first_name, last_name, avatar, created_at
            FROM users WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Get the user owning the API token with this SHA-256 hex digest
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_by_token_hash(&self, token_hash: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, first_name, last_name, avatar, created_at
            FROM users WHERE token_hash = $1
            ",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up token: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Replace or clear a user's avatar
    ///
    /// Returns the updated user, or `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn set_avatar(&self, user_id: Uuid, avatar: Option<&str>) -> AppResult<Option<User>> {
        let result = sqlx::query("UPDATE users SET avatar = $1 WHERE id = $2")
            .bind(avatar)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update avatar: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(user_id).await
    }

    /// One page of users ordered by username, plus the total count
    ///
    /// # Errors
    ///
    /// Returns an error if either query fails
    pub async fn list(&self, page: PageRequest) -> AppResult<(Vec<User>, u64)> {
        let rows = sqlx::query(
            r"
            SELECT id, username, email, first_name, last_name, avatar, created_at
            FROM users
            ORDER BY username
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(i64::from(page.limit))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?;

        let users = rows.iter().map(row_to_user).collect::<AppResult<Vec<_>>>()?;
        Ok((users, count_from_i64(count)))
    }
}

/// Map a row selecting the public user columns
pub(super) fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id_str: String = row.get("id");
    let created_at_str: String = row.get("created_at");

    Ok(User {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar: row.get("avatar"),
        created_at: parse_timestamp(&created_at_str)?,
    })
}
