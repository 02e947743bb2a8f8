// ABOUTME: Recipe model plus creation and partial-update requests with validation
// ABOUTME: A NewRecipe has no short code yet; a persisted Recipe always carries one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use crate::constants::limits::{MIN_AMOUNT, MIN_COOKING_TIME, RECIPE_NAME_MAX};
use crate::errors::{AppError, AppResult};
use crate::models::short_code::ShortCode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Recipe primary key
pub type RecipeId = i64;

/// A persisted recipe
///
/// The short code is assigned exactly once when the recipe is first stored and
/// no update path ever changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Primary key
    pub id: RecipeId,
    /// Author
    pub author_id: Uuid,
    /// Title
    pub name: String,
    /// Preparation instructions
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
    /// Image as a base64 data URL
    pub image: String,
    /// Shareable short code
    pub short_code: ShortCode,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Ingredient reference inside a create/update request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientInput {
    /// Catalog ingredient id
    pub id: i64,
    /// Positive amount
    pub amount: u32,
}

/// Request to create a recipe (no short code assigned yet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    /// Title
    pub name: String,
    /// Preparation instructions
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
    /// Image as a base64 data URL
    pub image: String,
    /// Tag ids
    pub tags: Vec<i64>,
    /// Ingredient lines
    pub ingredients: Vec<RecipeIngredientInput>,
}

impl NewRecipe {
    /// Validate request shape; catalog membership is checked by the store
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` describing the first violated rule
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_text(&self.text)?;
        validate_cooking_time(self.cooking_time)?;
        validate_image(&self.image)?;
        validate_ingredients(&self.ingredients)?;
        validate_tags(&self.tags)
    }
}

/// Partial update of a recipe; given ingredient/tag lists replace the old sets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    /// New title
    pub name: Option<String>,
    /// New instructions
    pub text: Option<String>,
    /// New cooking time
    pub cooking_time: Option<u32>,
    /// New image
    pub image: Option<String>,
    /// Replacement tag set
    pub tags: Option<Vec<i64>>,
    /// Replacement ingredient lines
    pub ingredients: Option<Vec<RecipeIngredientInput>>,
}

impl RecipeUpdate {
    /// Validate every provided field with the same rules as creation
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` describing the first violated rule
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(text) = &self.text {
            validate_text(text)?;
        }
        if let Some(cooking_time) = self.cooking_time {
            validate_cooking_time(cooking_time)?;
        }
        if let Some(image) = &self.image {
            validate_image(image)?;
        }
        if let Some(ingredients) = &self.ingredients {
            validate_ingredients(ingredients)?;
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() || name.chars().count() > RECIPE_NAME_MAX {
        return Err(AppError::invalid_input(format!(
            "Recipe name must be 1..={RECIPE_NAME_MAX} characters"
        )));
    }
    Ok(())
}

fn validate_text(text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::invalid_input("Recipe text must not be empty"));
    }
    Ok(())
}

fn validate_cooking_time(cooking_time: u32) -> AppResult<()> {
    if cooking_time < MIN_COOKING_TIME {
        return Err(AppError::invalid_input(format!(
            "cooking_time must be at least {MIN_COOKING_TIME}"
        )));
    }
    Ok(())
}

fn validate_ingredients(ingredients: &[RecipeIngredientInput]) -> AppResult<()> {
    if ingredients.is_empty() {
        return Err(AppError::invalid_input("Ingredient list must not be empty"));
    }
    let mut seen = HashSet::with_capacity(ingredients.len());
    for line in ingredients {
        if line.amount < MIN_AMOUNT {
            return Err(AppError::invalid_input(format!(
                "Amount of ingredient {} must be at least {MIN_AMOUNT}",
                line.id
            )));
        }
        if !seen.insert(line.id) {
            return Err(AppError::invalid_input(format!(
                "Ingredient {} is listed more than once",
                line.id
            )));
        }
    }
    Ok(())
}

fn validate_tags(tags: &[i64]) -> AppResult<()> {
    if tags.is_empty() {
        return Err(AppError::invalid_input("Tag list must not be empty"));
    }
    let unique: HashSet<_> = tags.iter().collect();
    if unique.len() != tags.len() {
        return Err(AppError::invalid_input("Tags must be unique"));
    }
    Ok(())
}

/// Accepts `data:image/<type>;base64,<payload>` with a decodable payload
pub(crate) fn validate_image(image: &str) -> AppResult<()> {
    let payload = image
        .strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| AppError::invalid_input("image must be a base64 data:image URL"))?;

    STANDARD
        .decode(payload)
        .map_err(|e| AppError::invalid_input(format!("image payload is not valid base64: {e}")))?;
    Ok(())
}
