// ABOUTME: SQLite database handle, schema migrations and accessors for per-area managers
// ABOUTME: Users, catalog, recipes, favorites/cart lists and follows share one pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! # Database Management
//!
//! One `SQLite` pool shared by small managers, each owning the queries for one
//! area. Migrations are idempotent `CREATE ... IF NOT EXISTS` statements run
//! on every start.

mod catalog;
mod follows;
mod recipe_lists;
mod recipes;
/// Transaction guard and retry helpers
pub mod transactions;
mod users;

pub use catalog::CatalogManager;
pub use follows::FollowsManager;
pub use recipe_lists::{RecipeList, RecipeListsManager};
pub use recipes::{RecipeFilter, RecipesManager};
pub use users::UsersManager;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::short_codes::ShortCodeGenerator;

/// Pool size for file-backed databases
const FILE_POOL_CONNECTIONS: u32 = 8;

/// Database handle
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
    short_codes: ShortCodeGenerator,
}

impl Database {
    /// Open (creating if needed) the database at `database_url` and run migrations
    ///
    /// `sqlite::memory:` databases use a single long-lived connection so every
    /// query sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails or a
    /// migration fails
    pub async fn new(database_url: &str, short_codes: ShortCodeGenerator) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));
            SqlitePoolOptions::new().max_connections(FILE_POOL_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {database_url}"))?;

        let db = Self { pool, short_codes };
        db.migrate().await?;
        info!(in_memory = in_memory, "Database ready");
        Ok(db)
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Short code generator used for new recipes
    #[must_use]
    pub const fn short_codes(&self) -> &ShortCodeGenerator {
        &self.short_codes
    }

    /// User accounts
    #[must_use]
    pub fn users(&self) -> UsersManager {
        UsersManager::new(self.pool.clone())
    }

    /// Ingredients and tags
    #[must_use]
    pub fn catalog(&self) -> CatalogManager {
        CatalogManager::new(self.pool.clone())
    }

    /// Recipes and their ingredient/tag associations
    #[must_use]
    pub fn recipes(&self) -> RecipesManager {
        RecipesManager::new(self.pool.clone(), self.short_codes.clone())
    }

    /// Favorites and shopping cart memberships
    #[must_use]
    pub fn recipe_lists(&self) -> RecipeListsManager {
        RecipeListsManager::new(self.pool.clone())
    }

    /// User subscriptions
    #[must_use]
    pub fn follows(&self) -> FollowsManager {
        FollowsManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_catalog().await?;
        self.migrate_recipes().await?;
        self.migrate_recipe_lists().await?;
        self.migrate_follows().await?;
        Ok(())
    }

    async fn execute_all(&self, statements: &[&str]) -> Result<()> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Migration statement failed: {statement}"))?;
        }
        Ok(())
    }

    async fn migrate_users(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                avatar TEXT,
                token_hash TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)",
        ])
        .await?;
        self.add_column_if_missing("users", "avatar", "TEXT").await
    }

    /// Add a column to a table created before the column existed
    async fn add_column_if_missing(
        &self,
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    ) -> Result<()> {
        let present: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info($1) WHERE name = $2")
                .bind(table)
                .bind(column)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("Failed to inspect table {table}"))?;
        if present == 0 {
            sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to add {table}.{column}"))?;
            info!(table, column, "Added missing column");
        }
        Ok(())
    }

    async fn migrate_catalog(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                name_folded TEXT,
                measurement_unit TEXT NOT NULL,
                UNIQUE (name, measurement_unit)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE
            )
            ",
        ])
        .await?;
        self.add_column_if_missing("ingredients", "name_folded", "TEXT")
            .await?;
        self.backfill_folded_names().await?;
        self.execute_all(&[
            "CREATE INDEX IF NOT EXISTS idx_ingredients_name_folded ON ingredients(name_folded)",
        ])
        .await
    }

    /// Fill `name_folded` for rows inserted before the column existed
    async fn backfill_folded_names(&self) -> Result<()> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM ingredients WHERE name_folded IS NULL")
                .fetch_all(&self.pool)
                .await
                .context("Failed to read ingredients for name folding")?;
        for (id, name) in rows {
            sqlx::query("UPDATE ingredients SET name_folded = $1 WHERE id = $2")
                .bind(name.to_lowercase())
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to fold ingredient name")?;
        }
        Ok(())
    }

    async fn migrate_recipes(&self) -> Result<()> {
        self.execute_all(&[
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                text TEXT NOT NULL,
                cooking_time INTEGER NOT NULL CHECK (cooking_time >= 1),
                image TEXT NOT NULL,
                short_code TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_recipes_short_code ON recipes(short_code)",
            "CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes(author_id)",
            "CREATE INDEX IF NOT EXISTS idx_recipes_created_at ON recipes(created_at DESC)",
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
                amount INTEGER NOT NULL CHECK (amount >= 1),
                position INTEGER NOT NULL,
                UNIQUE (recipe_id, ingredient_id)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS recipe_tags (
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                UNIQUE (recipe_id, tag_id)
            )
            ",
        ])
        .await
    }

    async fn migrate_recipe_lists(&self) -> Result<()> {
        for list in [RecipeList::Favorites, RecipeList::ShoppingCart] {
            let table = list.table();
            let create = format!(
                r"
                CREATE TABLE IF NOT EXISTS {table} (
                    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL,
                    UNIQUE (user_id, recipe_id)
                )
                "
            );
            let index = format!("CREATE INDEX IF NOT EXISTS idx_{table}_recipe ON {table}(recipe_id)");
            self.execute_all(&[create.as_str(), index.as_str()])
                .await?;
        }
        Ok(())
    }

    async fn migrate_follows(&self) -> Result<()> {
        self.execute_all(&[r"
            CREATE TABLE IF NOT EXISTS follows (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                following_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, following_id),
                CHECK (user_id <> following_id)
            )
            "])
        .await
    }
}

/// Parse an RFC 3339 timestamp column
pub(crate) fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid timestamp '{raw}': {e}")))
}

/// Convert a non-negative SQLite integer into `u64`
pub(crate) fn count_from_i64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}
