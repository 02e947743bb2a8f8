// ABOUTME: In-memory recipe, catalog and cart store built on DashMap
// ABOUTME: Short codes are claimed through a map entry so concurrent creates never share one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::{CartStore, RecipeStore};
use crate::errors::{AppError, AppResult};
use crate::models::{Ingredient, IngredientAmount, NewRecipe, Recipe, RecipeId, ShortCode};
use crate::short_codes::{CodeCommit, ShortCodeGenerator};

/// Thread-safe store with no persistence
///
/// Carts hold plain recipe ids and are not cleaned up when a recipe is
/// removed, so they can go stale exactly like a cart row written before a
/// concurrent delete.
#[derive(Debug, Default)]
pub struct MemoryStore {
    short_codes: ShortCodeGenerator,
    next_recipe_id: AtomicI64,
    next_ingredient_id: AtomicI64,
    recipes: DashMap<RecipeId, Recipe>,
    codes: DashMap<ShortCode, RecipeId>,
    recipe_ingredients: DashMap<RecipeId, Vec<IngredientAmount>>,
    ingredients: DashMap<i64, Ingredient>,
    carts: DashMap<Uuid, Vec<RecipeId>>,
}

impl MemoryStore {
    /// Empty store using `short_codes` for code assignment
    #[must_use]
    pub fn new(short_codes: ShortCodeGenerator) -> Self {
        Self {
            short_codes,
            ..Self::default()
        }
    }

    /// Add a catalog ingredient
    pub fn add_ingredient(&self, name: &str, measurement_unit: &str) -> Ingredient {
        let id = self.next_ingredient_id.fetch_add(1, Ordering::SeqCst) + 1;
        let ingredient = Ingredient {
            id,
            name: name.to_owned(),
            measurement_unit: measurement_unit.to_owned(),
        };
        self.ingredients.insert(id, ingredient.clone());
        ingredient
    }

    /// Append a recipe id to a user's cart; duplicates are kept as given
    pub fn add_to_cart(&self, user_id: Uuid, recipe_id: RecipeId) {
        self.carts.entry(user_id).or_default().push(recipe_id);
    }

    /// Remove a recipe and its code; cart entries are left behind
    pub fn remove_recipe(&self, recipe_id: RecipeId) -> Option<Recipe> {
        let (_, recipe) = self.recipes.remove(&recipe_id)?;
        self.codes.remove(&recipe.short_code);
        self.recipe_ingredients.remove(&recipe_id);
        Some(recipe)
    }

    /// Number of stored recipes
    #[must_use]
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    fn resolve_lines(&self, fields: &NewRecipe) -> AppResult<Vec<IngredientAmount>> {
        fields
            .ingredients
            .iter()
            .map(|line| {
                let ingredient = self
                    .ingredients
                    .get(&line.id)
                    .map(|entry| entry.value().clone())
                    .ok_or_else(|| {
                        AppError::invalid_input(format!("Ingredient {} does not exist", line.id))
                    })?;
                Ok(IngredientAmount {
                    ingredient,
                    amount: line.amount,
                })
            })
            .collect()
    }

    /// Claim `code` for a new recipe id, or report that it is taken
    fn claim_code(&self, code: ShortCode) -> CodeCommit<(RecipeId, ShortCode)> {
        match self.codes.entry(code) {
            Entry::Occupied(_) => CodeCommit::CodeTaken,
            Entry::Vacant(vacant) => {
                let id = self.next_recipe_id.fetch_add(1, Ordering::SeqCst) + 1;
                let code = vacant.key().clone();
                vacant.insert(id);
                CodeCommit::Committed((id, code))
            }
        }
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn get_recipe(&self, id: RecipeId) -> AppResult<Option<Recipe>> {
        Ok(self.recipes.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_recipe_by_code(&self, code: &ShortCode) -> AppResult<Option<Recipe>> {
        let Some(id) = self.codes.get(code).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        self.get_recipe(id).await
    }

    async fn create_recipe(&self, author_id: Uuid, fields: &NewRecipe) -> AppResult<Recipe> {
        fields.validate()?;
        let lines = self.resolve_lines(fields)?;

        let (id, short_code) = self
            .short_codes
            .assign(|code| std::future::ready(Ok(self.claim_code(code))))
            .await?;

        let recipe = Recipe {
            id,
            author_id,
            name: fields.name.clone(),
            text: fields.text.clone(),
            cooking_time: fields.cooking_time,
            image: fields.image.clone(),
            short_code,
            created_at: Utc::now(),
        };
        self.recipe_ingredients.insert(id, lines);
        self.recipes.insert(id, recipe.clone());
        Ok(recipe)
    }

    async fn list_ingredients(&self, recipe_id: RecipeId) -> AppResult<Vec<IngredientAmount>> {
        Ok(self
            .recipe_ingredients
            .get(&recipe_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn list_cart_recipes(&self, user_id: Uuid) -> AppResult<Vec<RecipeId>> {
        Ok(self
            .carts
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
