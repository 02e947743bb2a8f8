// ABOUTME: Short-link redirect route
// ABOUTME: Resolves /s/{code} to the recipe and redirects to its canonical API path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::debug;

use crate::constants::endpoints::{RECIPE_DETAIL_PREFIX, SHORT_LINK_PREFIX};
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::short_codes::resolve;

/// Short-link routes
pub struct ShortLinkRoutes;

impl ShortLinkRoutes {
    /// Create the redirect route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(&format!("{SHORT_LINK_PREFIX}/:code"), get(Self::handle_redirect))
            .with_state(resources)
    }

    /// Handle GET /s/:code
    async fn handle_redirect(
        State(resources): State<Arc<ServerResources>>,
        Path(code): Path<String>,
    ) -> Result<Response, AppError> {
        let recipe = resolve(&resources.database, &code).await?;
        let location = format!("{RECIPE_DETAIL_PREFIX}/{}", recipe.id);
        debug!(short_code = %code, recipe_id = recipe.id, "Short link resolved");
        Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
    }
}
