// ABOUTME: Route handlers for favorites, the shopping cart and the shopping list download
// ABOUTME: Adding twice or removing an absent entry is a 400; unknown recipes are a 404
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use super::parse_recipe_id;
use super::views::RecipeSummary;
use crate::constants::shopping_list::{CONTENT_TYPE as LIST_CONTENT_TYPE, FILENAME};
use crate::database::RecipeList;
use crate::errors::{AppError, AppResult};
use crate::models::Recipe;
use crate::resources::ServerResources;
use crate::shopping_list::{aggregate_shopping_list, render_shopping_list};

/// Favorites and shopping cart routes
pub struct RecipeListRoutes;

impl RecipeListRoutes {
    /// Create favorites, cart and download routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/recipes/download_shopping_cart",
                get(Self::handle_download),
            )
            .route(
                "/api/recipes/:id/favorite",
                post(Self::handle_add_favorite).delete(Self::handle_remove_favorite),
            )
            .route(
                "/api/recipes/:id/shopping_cart",
                post(Self::handle_add_to_cart).delete(Self::handle_remove_from_cart),
            )
            .with_state(resources)
    }

    async fn add(
        resources: &ServerResources,
        headers: &HeaderMap,
        raw_id: &str,
        list: RecipeList,
    ) -> AppResult<Response> {
        let user = resources.auth.require_user(headers).await?;
        let recipe = Self::load_recipe(resources, raw_id).await?;

        let added = resources
            .database
            .recipe_lists()
            .add(list, user.id, recipe.id)
            .await?;
        if !added {
            return Err(AppError::invalid_input(format!(
                "Recipe {} is already in your {}",
                recipe.id,
                list.label()
            )));
        }
        info!(user_id = %user.id, recipe_id = recipe.id, list = list.label(), "Recipe added to list");
        Ok((StatusCode::CREATED, Json(RecipeSummary::from(recipe))).into_response())
    }

    async fn remove(
        resources: &ServerResources,
        headers: &HeaderMap,
        raw_id: &str,
        list: RecipeList,
    ) -> AppResult<Response> {
        let user = resources.auth.require_user(headers).await?;
        let recipe = Self::load_recipe(resources, raw_id).await?;

        let removed = resources
            .database
            .recipe_lists()
            .remove(list, user.id, recipe.id)
            .await?;
        if !removed {
            return Err(AppError::invalid_input(format!(
                "Recipe {} is not in your {}",
                recipe.id,
                list.label()
            )));
        }
        info!(user_id = %user.id, recipe_id = recipe.id, list = list.label(), "Recipe removed from list");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn load_recipe(resources: &ServerResources, raw_id: &str) -> AppResult<Recipe> {
        let id = parse_recipe_id(raw_id)?;
        resources
            .database
            .recipes()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))
    }

    /// Handle POST /api/recipes/:id/favorite
    async fn handle_add_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::add(&resources, &headers, &id, RecipeList::Favorites).await
    }

    /// Handle DELETE /api/recipes/:id/favorite
    async fn handle_remove_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::remove(&resources, &headers, &id, RecipeList::Favorites).await
    }

    /// Handle POST /api/recipes/:id/shopping_cart
    async fn handle_add_to_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::add(&resources, &headers, &id, RecipeList::ShoppingCart).await
    }

    /// Handle DELETE /api/recipes/:id/shopping_cart
    async fn handle_remove_from_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        Self::remove(&resources, &headers, &id, RecipeList::ShoppingCart).await
    }

    /// Handle GET /api/recipes/download_shopping_cart
    async fn handle_download(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = resources.auth.require_user(&headers).await?;
        let db = &resources.database;
        let items = aggregate_shopping_list(db, db, user.id).await?;
        info!(user_id = %user.id, items = items.len(), "Shopping list generated");

        Ok((
            StatusCode::OK,
            [
                (CONTENT_TYPE, LIST_CONTENT_TYPE.to_owned()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{FILENAME}\""),
                ),
            ],
            render_shopping_list(&items),
        )
            .into_response())
    }
}
