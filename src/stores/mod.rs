// ABOUTME: Storage seams consumed by the shopping list aggregator and short-code resolver
// ABOUTME: Implemented by the SQLite database and by an in-memory store for tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Storage traits
//!
//! Only what aggregation, short-code assignment and resolution need. The
//! HTTP layer talks to the concrete database managers for everything else.

/// DashMap-backed store
pub mod memory;
/// `SQLite` implementations of the store traits
mod sqlite;

pub use memory::MemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{IngredientAmount, NewRecipe, Recipe, RecipeId, ShortCode};

/// Read and create access to recipes
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Recipe by primary key, `None` if it does not exist (or was deleted)
    async fn get_recipe(&self, id: RecipeId) -> AppResult<Option<Recipe>>;

    /// Recipe owning `code`, if any
    async fn get_recipe_by_code(&self, code: &ShortCode) -> AppResult<Option<Recipe>>;

    /// Persist a new recipe with a freshly assigned unique short code
    async fn create_recipe(&self, author_id: Uuid, fields: &NewRecipe) -> AppResult<Recipe>;

    /// Ingredient lines of a recipe, empty if it has none or does not exist
    async fn list_ingredients(&self, recipe_id: RecipeId) -> AppResult<Vec<IngredientAmount>>;
}

/// Read access to shopping carts
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Recipe ids in a user's cart
    ///
    /// May contain ids of recipes that have since been deleted; callers
    /// must tolerate them.
    async fn list_cart_recipes(&self, user_id: Uuid) -> AppResult<Vec<RecipeId>>;
}
