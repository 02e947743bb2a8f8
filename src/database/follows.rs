// ABOUTME: User subscription (follow) database operations
// ABOUTME: Follow/unfollow, membership checks and a paginated list of followed users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::count_from_i64;
use super::users::row_to_user;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::pagination::PageRequest;

/// Follow queries
#[derive(Clone)]
pub struct FollowsManager {
    pool: SqlitePool,
}

impl FollowsManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Follow `following_id`; `false` if already following
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a self-follow, or a database error
    pub async fn follow(&self, user_id: Uuid, following_id: Uuid) -> AppResult<bool> {
        if user_id == following_id {
            return Err(AppError::invalid_input("You cannot subscribe to yourself"));
        }
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO follows (user_id, following_id, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user_id.to_string())
        .bind(following_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to follow user: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Stop following; `false` if not following
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn unfollow(&self, user_id: Uuid, following_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND following_id = $2")
            .bind(user_id.to_string())
            .bind(following_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to unfollow user: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `user_id` follows `following_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn is_following(&self, user_id: Uuid, following_id: Uuid) -> AppResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM follows WHERE user_id = $1 AND following_id = $2")
                .bind(user_id.to_string())
                .bind(following_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to check follow: {e}")))?;
        Ok(found.is_some())
    }

    /// One page of users followed by `user_id`, by username, plus the total count
    ///
    /// # Errors
    ///
    /// Returns an error if either query fails
    pub async fn list_following(&self, user_id: Uuid, page: PageRequest) -> AppResult<(Vec<User>, u64)> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.avatar, u.created_at
            FROM follows f
            JOIN users u ON u.id = f.following_id
            WHERE f.user_id = $1
            ORDER BY u.username
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(page.limit))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list subscriptions: {e}")))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count subscriptions: {e}")))?;

        let users = rows.iter().map(row_to_user).collect::<AppResult<Vec<_>>>()?;
        Ok((users, count_from_i64(count)))
    }
}
