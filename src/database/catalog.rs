// ABOUTME: Ingredient and tag catalog database operations
// ABOUTME: Administrative inserts, prefix search, lookups and existence checks for recipe validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use std::collections::HashSet;

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::transactions::TransactionGuard;
use crate::errors::{AppError, AppResult};
use crate::models::{Ingredient, NewIngredient, NewTag, Tag};

/// Catalog queries
#[derive(Clone)]
pub struct CatalogManager {
    pool: SqlitePool,
}

impl CatalogManager {
    /// Create a manager over `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ================================
    // Ingredients
    // ================================

    /// Insert an ingredient unless the (name, unit) pair already exists
    ///
    /// Returns `true` when a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for bad fields or a database error
    pub async fn insert_ingredient(&self, request: &NewIngredient) -> AppResult<bool> {
        request.validate()?;
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO ingredients (name, name_folded, measurement_unit)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(request.name.trim())
        .bind(request.name.trim().to_lowercase())
        .bind(request.measurement_unit.trim())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert ingredient: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Bulk-load ingredients in one transaction, skipping existing pairs
    ///
    /// Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any entry is invalid (nothing is inserted)
    /// or a database error
    pub async fn load_ingredients(&self, ingredients: &[NewIngredient]) -> AppResult<usize> {
        for ingredient in ingredients {
            ingredient.validate()?;
        }

        let mut tx = TransactionGuard::new(
            self.pool
                .begin()
                .await
                .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?,
        );
        let mut inserted = 0;
        for ingredient in ingredients {
            let result = sqlx::query(
                r"
                INSERT OR IGNORE INTO ingredients (name, name_folded, measurement_unit)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(ingredient.name.trim())
            .bind(ingredient.name.trim().to_lowercase())
            .bind(ingredient.measurement_unit.trim())
            .execute(tx.executor()?)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert ingredient: {e}")))?;
            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// Get an ingredient by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_ingredient(&self, id: i64) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        Ok(row.as_ref().map(row_to_ingredient))
    }

    /// Ingredients whose name starts with `prefix` (case-insensitive), by name
    ///
    /// Matches against the stored lower-cased name with an index range scan:
    /// every folded name starting with `p` sorts in `[p, p + U+10FFFF)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn search_ingredients(&self, prefix: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let prefix = prefix
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_lowercase);

        let rows = match prefix {
            Some(folded) => {
                let upper = format!("{folded}{}", char::MAX);
                sqlx::query(
                    r"
                    SELECT id, name, measurement_unit FROM ingredients
                    WHERE name_folded >= $1 AND name_folded < $2
                    ORDER BY name, measurement_unit
                    ",
                )
                .bind(folded)
                .bind(upper)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, name, measurement_unit FROM ingredients ORDER BY name, measurement_unit",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to search ingredients: {e}")))?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }

    /// Ids from `ids` that have no catalog ingredient
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn missing_ingredient_ids(&self, ids: &[i64]) -> AppResult<Vec<i64>> {
        self.missing_ids("ingredients", ids).await
    }

    // ================================
    // Tags
    // ================================

    /// Create a tag
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for bad fields, `ResourceAlreadyExists` for a
    /// duplicate slug, or a database error
    pub async fn create_tag(&self, request: &NewTag) -> AppResult<Tag> {
        request.validate()?;
        let row = sqlx::query(
            r"
            INSERT INTO tags (name, slug) VALUES ($1, $2)
            RETURNING id, name, slug
            ",
        )
        .bind(request.name.trim())
        .bind(&request.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::already_exists(format!("Tag with slug '{}' already exists", request.slug))
            }
            other => AppError::database(format!("Failed to create tag: {other}")),
        })?;

        Ok(row_to_tag(&row))
    }

    /// All tags ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, slug FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list tags: {e}")))?;
        Ok(rows.iter().map(row_to_tag).collect())
    }

    /// Get a tag by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_tag(&self, id: i64) -> AppResult<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, slug FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get tag: {e}")))?;
        Ok(row.as_ref().map(row_to_tag))
    }

    /// Ids from `ids` that have no tag
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn missing_tag_ids(&self, ids: &[i64]) -> AppResult<Vec<i64>> {
        self.missing_ids("tags", ids).await
    }

    async fn missing_ids(&self, table: &'static str, ids: &[i64]) -> AppResult<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!("SELECT id FROM {table} WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let found: HashSet<i64> = builder
            .build_query_scalar::<i64>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check {table}: {e}")))?
            .into_iter()
            .collect();

        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }
}

pub(super) fn row_to_ingredient(row: &SqliteRow) -> Ingredient {
    Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
    }
}

pub(super) fn row_to_tag(row: &SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}
