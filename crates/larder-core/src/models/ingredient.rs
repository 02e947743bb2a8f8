// ABOUTME: Ingredient catalog model keyed by the (name, measurement unit) pair
// ABOUTME: Also carries the per-recipe amount association used by shopping lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use crate::constants::limits::INGREDIENT_FIELD_MAX;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Catalog ingredient; (name, `measurement_unit`) is unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Primary key
    pub id: i64,
    /// Display name, e.g. `Flour`
    pub name: String,
    /// Unit the amounts are expressed in, e.g. `g`
    pub measurement_unit: String,
}

/// Catalog entry as loaded from an ingredient fixture file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIngredient {
    /// Display name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
}

impl NewIngredient {
    /// Check field presence and length
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when a field is blank or too long
    pub fn validate(&self) -> AppResult<()> {
        for (field, value) in [("name", &self.name), ("measurement_unit", &self.measurement_unit)] {
            if value.trim().is_empty() {
                return Err(AppError::invalid_input(format!("Ingredient {field} must not be empty")));
            }
            if value.chars().count() > INGREDIENT_FIELD_MAX {
                return Err(AppError::invalid_input(format!(
                    "Ingredient {field} must be at most {INGREDIENT_FIELD_MAX} characters"
                )));
            }
        }
        Ok(())
    }
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// The catalog ingredient
    pub ingredient: Ingredient,
    /// Positive amount in the ingredient's unit
    pub amount: u32,
}
