// ABOUTME: Core domain models for recipes, the ingredient catalog, tags and users
// ABOUTME: Includes request shapes with validation and the short code newtype
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Domain models shared by the storage layer, the core algorithms and the routes.

/// Ingredient catalog entries and per-recipe amounts
pub mod ingredient;
/// Recipes, creation and update requests
pub mod recipe;
/// Shopping list rows
pub mod shopping;
/// Shareable short codes
pub mod short_code;
/// Recipe tags
pub mod tag;
/// Users
pub mod user;

pub use ingredient::{Ingredient, IngredientAmount, NewIngredient};
pub use recipe::{NewRecipe, Recipe, RecipeId, RecipeIngredientInput, RecipeUpdate};
pub use shopping::ShoppingListItem;
pub use short_code::ShortCode;
pub use tag::{NewTag, Tag};
pub use user::{AvatarUpdate, NewUser, User};
