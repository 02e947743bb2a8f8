// ABOUTME: Route module organization for the Larder HTTP API
// ABOUTME: Each domain module exposes a routes() constructor over shared server resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Route module for the Larder API
//!
//! Each domain module contains only route definitions and thin handlers that
//! delegate to the database managers, the aggregator and the short-code
//! resolver.

/// Health check and readiness routes
pub mod health;
/// Ingredient catalog routes
pub mod ingredients;
/// Favorites, shopping cart and shopping list download routes
pub mod recipe_lists;
/// Recipe CRUD and short-link creation routes
pub mod recipes;
/// Short-link redirect route
pub mod short_links;
/// Tag catalog routes
pub mod tags;
/// User and subscription routes
pub mod users;
/// Response shapes and their builders
pub mod views;

pub use health::HealthRoutes;
pub use ingredients::IngredientRoutes;
pub use recipe_lists::RecipeListRoutes;
pub use recipes::RecipeRoutes;
pub use short_links::ShortLinkRoutes;
pub use tags::TagRoutes;
pub use users::UserRoutes;

use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::RecipeId;

/// Parse a recipe id path segment; anything unparsable names no recipe
pub(crate) fn parse_recipe_id(raw: &str) -> AppResult<RecipeId> {
    raw.parse()
        .map_err(|_| AppError::not_found(format!("Recipe {raw}")))
}

/// Parse a user id path segment; anything unparsable names no user
pub(crate) fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(format!("User {raw}")))
}

/// Parse a catalog id path segment
pub(crate) fn parse_catalog_id(raw: &str, resource: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::not_found(format!("{resource} {raw}")))
}
