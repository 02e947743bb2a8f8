// ABOUTME: Route handlers for recipe listing, CRUD and short-link creation
// ABOUTME: Anonymous callers may read; writes need a token and updates need authorship
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Recipe routes
//!
//! Listing supports page-number pagination and filters on author, tag slugs
//! (any of the repeated `tags` values) and the caller's favorites and cart.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::{Query, WithRejection};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::parse_recipe_id;
use super::views::{recipe_view, RecipeView};
use crate::database::RecipeFilter;
use crate::errors::{AppError, AppResult};
use crate::models::{NewRecipe, Recipe, RecipeId, RecipeUpdate, User};
use crate::pagination::Page;
use crate::resources::ServerResources;
use crate::stores::RecipeStore;

/// Query parameters for the recipe list
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
    /// Author id
    pub author: Option<String>,
    /// Tag slugs; a recipe matches if it has any of them
    #[serde(default)]
    pub tags: Vec<String>,
    /// `1`/`true` for favorites only, `0`/`false` to exclude favorites
    pub is_favorited: Option<String>,
    /// `1`/`true` for cart only, `0`/`false` to exclude the cart
    pub is_in_shopping_cart: Option<String>,
}

impl RecipeListQuery {
    /// Translate query parameters into a database filter
    ///
    /// Membership filters only apply to authenticated callers.
    fn to_filter(&self, viewer: Option<Uuid>) -> AppResult<RecipeFilter> {
        let author = self
            .author
            .as_deref()
            .map(|raw| {
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::invalid_input(format!("author '{raw}' is not a valid id")))
            })
            .transpose()?;

        let membership = |raw: Option<&str>, name: &str| -> AppResult<Option<(Uuid, bool)>> {
            match (viewer, raw) {
                (Some(user_id), Some(raw)) => Ok(Some((user_id, parse_flag(raw, name)?))),
                _ => Ok(None),
            }
        };

        Ok(RecipeFilter {
            author,
            tags: self
                .tags
                .iter()
                .map(|slug| slug.trim().to_owned())
                .filter(|slug| !slug.is_empty())
                .collect(),
            favorited: membership(self.is_favorited.as_deref(), "is_favorited")?,
            in_shopping_cart: membership(self.is_in_shopping_cart.as_deref(), "is_in_shopping_cart")?,
        })
    }
}

fn parse_flag(raw: &str, name: &str) -> AppResult<bool> {
    match raw {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(AppError::invalid_input(format!("{name} must be 0 or 1"))),
    }
}

/// Recipe routes
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create recipe routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/recipes",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/recipes/:id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/recipes/:id/get-link", get(Self::handle_get_link))
            .with_state(resources)
    }

    /// Load a recipe or fail with 404
    async fn load_recipe(resources: &ServerResources, raw_id: &str) -> AppResult<Recipe> {
        let id: RecipeId = parse_recipe_id(raw_id)?;
        resources
            .database
            .recipes()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))
    }

    /// Only the author may change a recipe
    fn ensure_author(user: &User, recipe: &Recipe) -> AppResult<()> {
        if recipe.author_id == user.id {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "Only the author can change this recipe",
            ))
        }
    }

    /// Handle GET /api/recipes
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
        WithRejection(Query(query), _): WithRejection<Query<RecipeListQuery>, AppError>,
    ) -> Result<Response, AppError> {
        let viewer = resources.auth.authenticate(&headers).await?;
        let filter = query.to_filter(viewer.as_ref().map(|user| user.id))?;
        let page_request = resources.page_request(query.page, query.limit);

        let (recipes, count) = resources
            .database
            .recipes()
            .list(&filter, page_request)
            .await?;

        let mut results: Vec<RecipeView> = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            results.push(recipe_view(&resources, viewer.as_ref(), recipe).await?);
        }

        let page = Page::new(
            results,
            count,
            page_request,
            resources.page_link(uri.path(), uri.query()),
        );
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Handle POST /api/recipes
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        WithRejection(Json(body), _): WithRejection<Json<NewRecipe>, AppError>,
    ) -> Result<Response, AppError> {
        let user = resources.auth.require_user(&headers).await?;
        let recipe = resources.database.create_recipe(user.id, &body).await?;
        let view = recipe_view(&resources, Some(&user), recipe).await?;
        Ok((StatusCode::CREATED, Json(view)).into_response())
    }

    /// Handle GET /api/recipes/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let viewer = resources.auth.authenticate(&headers).await?;
        let recipe = Self::load_recipe(&resources, &id).await?;
        let view = recipe_view(&resources, viewer.as_ref(), recipe).await?;
        Ok((StatusCode::OK, Json(view)).into_response())
    }

    /// Handle PATCH /api/recipes/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        WithRejection(Json(body), _): WithRejection<Json<RecipeUpdate>, AppError>,
    ) -> Result<Response, AppError> {
        let user = resources.auth.require_user(&headers).await?;
        let recipe = Self::load_recipe(&resources, &id).await?;
        Self::ensure_author(&user, &recipe)?;

        let updated = resources
            .database
            .recipes()
            .update(recipe.id, &body)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {}", recipe.id)))?;
        info!(recipe_id = updated.id, user_id = %user.id, "Recipe updated");

        let view = recipe_view(&resources, Some(&user), updated).await?;
        Ok((StatusCode::OK, Json(view)).into_response())
    }

    /// Handle DELETE /api/recipes/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let user = resources.auth.require_user(&headers).await?;
        let recipe = Self::load_recipe(&resources, &id).await?;
        Self::ensure_author(&user, &recipe)?;

        resources.database.recipes().delete(recipe.id).await?;
        info!(recipe_id = recipe.id, user_id = %user.id, "Recipe deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/recipes/:id/get-link
    async fn handle_get_link(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let recipe = Self::load_recipe(&resources, &id).await?;
        let link = resources.short_link(recipe.short_code.as_str());
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "short-link": link })),
        )
            .into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_filters_need_a_viewer() {
        let query = RecipeListQuery {
            is_favorited: Some("1".to_owned()),
            ..RecipeListQuery::default()
        };
        assert!(query.to_filter(None).unwrap().favorited.is_none());

        let viewer = Uuid::new_v4();
        assert_eq!(
            query.to_filter(Some(viewer)).unwrap().favorited,
            Some((viewer, true))
        );
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let query = RecipeListQuery {
            is_in_shopping_cart: Some("maybe".to_owned()),
            ..RecipeListQuery::default()
        };
        assert!(query.to_filter(Some(Uuid::new_v4())).is_err());
    }
}
