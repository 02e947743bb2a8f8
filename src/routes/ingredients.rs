// ABOUTME: Route handlers for the read-only ingredient catalog
// ABOUTME: Case-insensitive name prefix search and lookup by id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use super::parse_catalog_id;
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Query parameters for ingredient search
#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearchQuery {
    /// Name prefix, case-insensitive
    pub name: Option<String>,
}

/// Ingredient routes
pub struct IngredientRoutes;

impl IngredientRoutes {
    /// Create ingredient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/ingredients", get(Self::handle_list))
            .route("/api/ingredients/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/ingredients
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        WithRejection(Query(query), _): WithRejection<Query<IngredientSearchQuery>, AppError>,
    ) -> Result<Response, AppError> {
        let ingredients = resources
            .database
            .catalog()
            .search_ingredients(query.name.as_deref())
            .await?;
        Ok((StatusCode::OK, Json(ingredients)).into_response())
    }

    /// Handle GET /api/ingredients/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_catalog_id(&id, "Ingredient")?;
        let ingredient = resources
            .database
            .catalog()
            .get_ingredient(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;
        Ok((StatusCode::OK, Json(ingredient)).into_response())
    }
}
