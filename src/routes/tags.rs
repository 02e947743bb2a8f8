// ABOUTME: Route handlers for the read-only tag catalog
// ABOUTME: Lists all tags and looks up one by id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::parse_catalog_id;
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Tag routes
pub struct TagRoutes;

impl TagRoutes {
    /// Create tag routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/tags", get(Self::handle_list))
            .route("/api/tags/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/tags
    async fn handle_list(State(resources): State<Arc<ServerResources>>) -> Result<Response, AppError> {
        let tags = resources.database.catalog().list_tags().await?;
        Ok((StatusCode::OK, Json(tags)).into_response())
    }

    /// Handle GET /api/tags/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_catalog_id(&id, "Tag")?;
        let tag = resources
            .database
            .catalog()
            .get_tag(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tag {id}")))?;
        Ok((StatusCode::OK, Json(tag)).into_response())
    }
}
