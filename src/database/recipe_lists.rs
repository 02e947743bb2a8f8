// ABOUTME: Per-user recipe lists: favorites and the shopping cart
// ABOUTME: Both are (user, recipe) membership tables with identical add/remove/contains semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::RecipeId;

/// Which per-user list an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeList {
    /// Favorited recipes
    Favorites,
    /// Recipes whose ingredients go on the shopping list
    ShoppingCart,
}

impl RecipeList {
    /// Backing table
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping_cart",
        }
    }

    /// Human readable name for messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

/// Membership queries for favorites and the shopping cart
#[derive(Clone)]
pub struct RecipeListsManager {
    pool: SqlitePool,
}

impl RecipeListsManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a recipe to a user's list; `false` if it was already there
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including unknown user/recipe)
    pub async fn add(&self, list: RecipeList, user_id: Uuid, recipe_id: RecipeId) -> AppResult<bool> {
        let table = list.table();
        let result = sqlx::query(&format!(
            "INSERT OR IGNORE INTO {table} (user_id, recipe_id, created_at) VALUES ($1, $2, $3)"
        ))
        .bind(user_id.to_string())
        .bind(recipe_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add to {}: {e}", list.label())))?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a recipe from a user's list; `false` if it was not there
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn remove(
        &self,
        list: RecipeList,
        user_id: Uuid,
        recipe_id: RecipeId,
    ) -> AppResult<bool> {
        let table = list.table();
        let result = sqlx::query(&format!(
            "DELETE FROM {table} WHERE user_id = $1 AND recipe_id = $2"
        ))
        .bind(user_id.to_string())
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to remove from {}: {e}", list.label())))?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a recipe is in a user's list
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn contains(
        &self,
        list: RecipeList,
        user_id: Uuid,
        recipe_id: RecipeId,
    ) -> AppResult<bool> {
        let table = list.table();
        let found: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT 1 FROM {table} WHERE user_id = $1 AND recipe_id = $2"
        ))
        .bind(user_id.to_string())
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check {}: {e}", list.label())))?;
        Ok(found.is_some())
    }

    /// Recipe ids in a user's list, oldest entry first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn recipe_ids(&self, list: RecipeList, user_id: Uuid) -> AppResult<Vec<RecipeId>> {
        let table = list.table();
        sqlx::query_scalar(&format!(
            "SELECT recipe_id FROM {table} WHERE user_id = $1 ORDER BY created_at, recipe_id"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list {}: {e}", list.label())))
    }
}
