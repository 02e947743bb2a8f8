// ABOUTME: RecipeStore and CartStore implemented over the SQLite database managers
// ABOUTME: Recipe creation claims short codes through the unique index on insert
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use async_trait::async_trait;
use uuid::Uuid;

use super::{CartStore, RecipeStore};
use crate::database::{Database, RecipeList};
use crate::errors::AppResult;
use crate::models::{IngredientAmount, NewRecipe, Recipe, RecipeId, ShortCode};

#[async_trait]
impl RecipeStore for Database {
    async fn get_recipe(&self, id: RecipeId) -> AppResult<Option<Recipe>> {
        self.recipes().get(id).await
    }

    async fn get_recipe_by_code(&self, code: &ShortCode) -> AppResult<Option<Recipe>> {
        self.recipes().get_by_code(code).await
    }

    async fn create_recipe(&self, author_id: Uuid, fields: &NewRecipe) -> AppResult<Recipe> {
        self.recipes().create(author_id, fields).await
    }

    async fn list_ingredients(&self, recipe_id: RecipeId) -> AppResult<Vec<IngredientAmount>> {
        self.recipes().ingredients(recipe_id).await
    }
}

#[async_trait]
impl CartStore for Database {
    async fn list_cart_recipes(&self, user_id: Uuid) -> AppResult<Vec<RecipeId>> {
        self.recipe_lists()
            .recipe_ids(RecipeList::ShoppingCart, user_id)
            .await
    }
}
