// ABOUTME: Recipe database operations including short-code assignment on insert
// ABOUTME: Handles filtered listing, ingredient/tag set replacement, update and delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::catalog::{row_to_ingredient, row_to_tag, CatalogManager};
use super::transactions::{retry_transaction, TransactionGuard, DEFAULT_WRITE_ATTEMPTS};
use super::{count_from_i64, parse_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{
    IngredientAmount, NewRecipe, Recipe, RecipeId, RecipeIngredientInput, RecipeUpdate, ShortCode,
    Tag,
};
use crate::pagination::PageRequest;
use crate::short_codes::{CodeCommit, ShortCodeGenerator};

const RECIPE_COLUMNS: &str =
    "r.id, r.author_id, r.name, r.text, r.cooking_time, r.image, r.short_code, r.created_at";

/// Recipe list filters
///
/// Membership filters carry the viewing user and whether the recipe must
/// (`true`) or must not (`false`) be in that user's list.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Only recipes by this author
    pub author: Option<Uuid>,
    /// Recipes carrying any of these tag slugs
    pub tags: Vec<String>,
    /// Favorited (or not) by a user
    pub favorited: Option<(Uuid, bool)>,
    /// In (or not in) a user's shopping cart
    pub in_shopping_cart: Option<(Uuid, bool)>,
}

/// Recipe queries
#[derive(Clone)]
pub struct RecipesManager {
    pool: SqlitePool,
    short_codes: ShortCodeGenerator,
}

impl RecipesManager {
    /// Create a manager over `pool` assigning codes with `short_codes`
    #[must_use]
    pub const fn new(pool: SqlitePool, short_codes: ShortCodeGenerator) -> Self {
        Self { pool, short_codes }
    }

    /// Create a recipe and assign its short code
    ///
    /// Each candidate code is inserted inside its own transaction. The unique
    /// index on `short_code` rejects a taken code, the transaction is rolled
    /// back and the generator draws again.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for bad fields or unknown ingredients/tags,
    /// `ShortCodeSpaceExhausted` if no code could be claimed, or a database error
    pub async fn create(&self, author_id: Uuid, fields: &NewRecipe) -> AppResult<Recipe> {
        fields.validate()?;
        let ingredient_ids: Vec<i64> = fields.ingredients.iter().map(|line| line.id).collect();
        self.check_catalog(&ingredient_ids, &fields.tags).await?;

        let recipe = self
            .short_codes
            .assign(|code| async move {
                retry_transaction(
                    || self.try_insert(author_id, fields, &code),
                    DEFAULT_WRITE_ATTEMPTS,
                )
                .await
            })
            .await?;

        info!(
            recipe_id = recipe.id,
            author_id = %author_id,
            short_code = %recipe.short_code,
            "Recipe created"
        );
        Ok(recipe)
    }

    async fn try_insert(
        &self,
        author_id: Uuid,
        fields: &NewRecipe,
        code: &ShortCode,
    ) -> AppResult<CodeCommit<Recipe>> {
        let created_at = Utc::now();
        let mut tx = TransactionGuard::new(
            self.pool
                .begin()
                .await
                .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?,
        );

        let inserted = sqlx::query(
            r"
            INSERT INTO recipes (author_id, name, text, cooking_time, image, short_code, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(author_id.to_string())
        .bind(fields.name.trim())
        .bind(&fields.text)
        .bind(i64::from(fields.cooking_time))
        .bind(&fields.image)
        .bind(code.as_str())
        .bind(created_at.to_rfc3339())
        .fetch_one(tx.executor()?)
        .await;

        let id: RecipeId = match inserted {
            Ok(row) => row.get("id"),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                debug!(short_code = %code, "Short code already stored");
                tx.rollback().await?;
                return Ok(CodeCommit::CodeTaken);
            }
            Err(e) => return Err(AppError::database(format!("Failed to insert recipe: {e}"))),
        };

        replace_ingredients(tx.executor()?, id, &fields.ingredients).await?;
        replace_tags(tx.executor()?, id, &fields.tags).await?;
        tx.commit().await?;

        Ok(CodeCommit::Committed(Recipe {
            id,
            author_id,
            name: fields.name.trim().to_owned(),
            text: fields.text.clone(),
            cooking_time: fields.cooking_time,
            image: fields.image.clone(),
            short_code: code.clone(),
            created_at,
        }))
    }

    /// Apply a partial update; the short code is never touched
    ///
    /// Returns `None` if the recipe does not exist.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for bad fields or unknown ingredients/tags, or a
    /// database error
    pub async fn update(&self, id: RecipeId, update: &RecipeUpdate) -> AppResult<Option<Recipe>> {
        update.validate()?;
        let ingredient_ids: Vec<i64> = update
            .ingredients
            .iter()
            .flatten()
            .map(|line| line.id)
            .collect();
        self.check_catalog(&ingredient_ids, update.tags.as_deref().unwrap_or_default())
            .await?;

        let mut tx = TransactionGuard::new(
            self.pool
                .begin()
                .await
                .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?,
        );

        let result = sqlx::query(
            r"
            UPDATE recipes SET
                name = COALESCE($1, name),
                text = COALESCE($2, text),
                cooking_time = COALESCE($3, cooking_time),
                image = COALESCE($4, image)
            WHERE id = $5
            ",
        )
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.text.as_deref())
        .bind(update.cooking_time.map(i64::from))
        .bind(update.image.as_deref())
        .bind(id)
        .execute(tx.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        if let Some(ingredients) = &update.ingredients {
            replace_ingredients(tx.executor()?, id, ingredients).await?;
        }
        if let Some(tags) = &update.tags {
            replace_tags(tx.executor()?, id, tags).await?;
        }
        tx.commit().await?;

        self.get(id).await
    }

    /// Delete a recipe; returns whether it existed
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn delete(&self, id: RecipeId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Get a recipe by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get(&self, id: RecipeId) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;
        row.map(|r| row_to_recipe(&r)).transpose()
    }

    /// Get the recipe owning a short code
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn get_by_code(&self, code: &ShortCode) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.short_code = $1"
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to resolve short code: {e}")))?;
        row.map(|r| row_to_recipe(&r)).transpose()
    }

    /// Ingredient lines of a recipe in the order they were given
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn ingredients(&self, recipe_id: RecipeId) -> AppResult<Vec<IngredientAmount>> {
        let rows = sqlx::query(
            r"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.position
            ",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list recipe ingredients: {e}")))?;

        rows.iter()
            .map(|row| {
                let amount: i64 = row.get("amount");
                Ok(IngredientAmount {
                    ingredient: row_to_ingredient(row),
                    amount: u32::try_from(amount)
                        .map_err(|e| AppError::internal(format!("Invalid stored amount: {e}")))?,
                })
            })
            .collect()
    }

    /// Tags of a recipe ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn tags(&self, recipe_id: RecipeId) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query(
            r"
            SELECT t.id, t.name, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            ",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list recipe tags: {e}")))?;
        Ok(rows.iter().map(row_to_tag).collect())
    }

    /// One page of recipes matching `filter`, newest first, plus the total count
    ///
    /// # Errors
    ///
    /// Returns an error if either query fails
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Recipe>, u64)> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE 1 = 1"
        ));
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM recipes r WHERE 1 = 1");
        push_filters(&mut count_query, filter);
        let count: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count recipes: {e}")))?;

        let recipes = rows.iter().map(row_to_recipe).collect::<AppResult<Vec<_>>>()?;
        Ok((recipes, count_from_i64(count)))
    }

    /// Recipes by one author, newest first, optionally truncated
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_by_author(&self, author_id: Uuid, limit: Option<u32>) -> AppResult<Vec<Recipe>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map_or(-1, i64::from);
        let rows = sqlx::query(&format!(
            r"
            SELECT {RECIPE_COLUMNS} FROM recipes r
            WHERE r.author_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $2
            "
        ))
        .bind(author_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list author recipes: {e}")))?;
        rows.iter().map(row_to_recipe).collect()
    }

    /// Number of recipes by one author
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_by_author(&self, author_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count author recipes: {e}")))?;
        Ok(count_from_i64(count))
    }

    async fn check_catalog(&self, ingredient_ids: &[i64], tag_ids: &[i64]) -> AppResult<()> {
        let catalog = CatalogManager::new(self.pool.clone());

        let missing = catalog.missing_ingredient_ids(ingredient_ids).await?;
        if !missing.is_empty() {
            return Err(AppError::invalid_input(format!(
                "Unknown ingredient ids: {missing:?}"
            )));
        }
        let missing = catalog.missing_tag_ids(tag_ids).await?;
        if !missing.is_empty() {
            return Err(AppError::invalid_input(format!("Unknown tag ids: {missing:?}")));
        }
        Ok(())
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &RecipeFilter) {
    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author.to_string());
    }

    if !filter.tags.is_empty() {
        query.push(
            " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = r.id AND t.slug IN (",
        );
        let mut slugs = query.separated(", ");
        for slug in &filter.tags {
            slugs.push_bind(slug.clone());
        }
        slugs.push_unseparated("))");
    }

    for (membership, table) in [
        (filter.favorited, "favorites"),
        (filter.in_shopping_cart, "shopping_cart"),
    ] {
        if let Some((user_id, present)) = membership {
            query
                .push(if present { " AND EXISTS" } else { " AND NOT EXISTS" })
                .push(format!(
                    " (SELECT 1 FROM {table} m WHERE m.recipe_id = r.id AND m.user_id = "
                ))
                .push_bind(user_id.to_string())
                .push(")");
        }
    }
}

async fn replace_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: RecipeId,
    lines: &[RecipeIngredientInput],
) -> AppResult<()> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear recipe ingredients: {e}")))?;

    for (position, line) in lines.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount, position)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(recipe_id)
        .bind(line.id)
        .bind(i64::from(line.amount))
        .bind(i64::try_from(position).unwrap_or(i64::MAX))
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to add recipe ingredient: {e}")))?;
    }
    Ok(())
}

async fn replace_tags(conn: &mut SqliteConnection, recipe_id: RecipeId, tags: &[i64]) -> AppResult<()> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear recipe tags: {e}")))?;

    for tag_id in tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to add recipe tag: {e}")))?;
    }
    Ok(())
}

fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
    let author_id_str: String = row.get("author_id");
    let short_code_str: String = row.get("short_code");
    let created_at_str: String = row.get("created_at");
    let cooking_time: i64 = row.get("cooking_time");

    Ok(Recipe {
        id: row.get("id"),
        author_id: Uuid::parse_str(&author_id_str)
            .map_err(|e| AppError::internal(format!("Invalid UUID: {e}")))?,
        name: row.get("name"),
        text: row.get("text"),
        cooking_time: u32::try_from(cooking_time)
            .map_err(|e| AppError::internal(format!("Invalid stored cooking time: {e}")))?,
        image: row.get("image"),
        short_code: ShortCode::parse(&short_code_str).ok_or_else(|| {
            AppError::internal(format!("Invalid stored short code '{short_code_str}'"))
        })?,
        created_at: parse_timestamp(&created_at_str)?,
    })
}
