// ABOUTME: Route handlers for user profiles and subscriptions
// ABOUTME: Lists users, shows the caller's profile and manages follow relationships
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::info;

use super::parse_user_id;
use super::views::{subscription_view, user_view, SubscriptionView, UserView};
use crate::errors::{AppError, AppResult};
use crate::models::{AvatarUpdate, User};
use crate::pagination::Page;
use crate::resources::ServerResources;

/// Pagination parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

/// Parameters for subscription responses
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
    /// Truncate each user's recipe preview to this many recipes
    pub recipes_limit: Option<u32>,
}

/// User routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create user routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users", get(Self::handle_list))
            .route("/api/users/me", get(Self::handle_me))
            .route(
                "/api/users/me/avatar",
                put(Self::handle_update_avatar).delete(Self::handle_delete_avatar),
            )
            .route("/api/users/subscriptions", get(Self::handle_subscriptions))
            .route("/api/users/:id", get(Self::handle_get))
            .route(
                "/api/users/:id/subscribe",
                post(Self::handle_subscribe).delete(Self::handle_unsubscribe),
            )
            .with_state(resources)
    }

    async fn load_user(resources: &ServerResources, raw_id: &str) -> AppResult<User> {
        let id = parse_user_id(raw_id)?;
        resources
            .database
            .users()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id}")))
    }

    /// Handle GET /api/users
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
        WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
    ) -> Result<Response, AppError> {
        let viewer = resources.auth.authenticate(&headers).await?;
        let page_request = resources.page_request(query.page, query.limit);
        let (users, count) = resources.database.users().list(page_request).await?;

        let mut results: Vec<UserView> = Vec::with_capacity(users.len());
        for user in users {
            results.push(user_view(&resources, viewer.as_ref(), user).await?);
        }
        let page = Page::new(
            results,
            count,
            page_request,
            resources.page_link(uri.path(), uri.query()),
        );
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Handle GET /api/users/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = resources.auth.require_user(&headers).await?;
        let view = user_view(&resources, None, user).await?;
        Ok((StatusCode::OK, Json(view)).into_response())
    }

    /// Handle PUT /api/users/me/avatar
    async fn handle_update_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        WithRejection(Json(body), _): WithRejection<Json<AvatarUpdate>, AppError>,
    ) -> Result<Response, AppError> {
        let user = resources.auth.require_user(&headers).await?;
        body.validate()?;
        let updated = resources
            .database
            .users()
            .set_avatar(user.id, Some(&body.avatar))
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", user.id)))?;
        info!(user_id = %user.id, "Avatar updated");
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "avatar": updated.avatar })),
        )
            .into_response())
    }

    /// Handle DELETE /api/users/me/avatar
    async fn handle_delete_avatar(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = resources.auth.require_user(&headers).await?;
        resources.database.users().set_avatar(user.id, None).await?;
        info!(user_id = %user.id, "Avatar removed");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/users/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let viewer = resources.auth.authenticate(&headers).await?;
        let user = Self::load_user(&resources, &id).await?;
        let view = user_view(&resources, viewer.as_ref(), user).await?;
        Ok((StatusCode::OK, Json(view)).into_response())
    }

    /// Handle GET /api/users/subscriptions
    async fn handle_subscriptions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        uri: Uri,
        WithRejection(Query(query), _): WithRejection<Query<SubscriptionQuery>, AppError>,
    ) -> Result<Response, AppError> {
        let viewer = resources.auth.require_user(&headers).await?;
        let page_request = resources.page_request(query.page, query.limit);
        let (users, count) = resources
            .database
            .follows()
            .list_following(viewer.id, page_request)
            .await?;

        let mut results: Vec<SubscriptionView> = Vec::with_capacity(users.len());
        for user in users {
            results.push(subscription_view(&resources, Some(&viewer), user, query.recipes_limit).await?);
        }
        let page = Page::new(
            results,
            count,
            page_request,
            resources.page_link(uri.path(), uri.query()),
        );
        Ok((StatusCode::OK, Json(page)).into_response())
    }

    /// Handle POST /api/users/:id/subscribe
    async fn handle_subscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        WithRejection(Query(query), _): WithRejection<Query<SubscriptionQuery>, AppError>,
    ) -> Result<Response, AppError> {
        let viewer = resources.auth.require_user(&headers).await?;
        let target = Self::load_user(&resources, &id).await?;

        let followed = resources.database.follows().follow(viewer.id, target.id).await?;
        if !followed {
            return Err(AppError::invalid_input(format!(
                "You are already subscribed to {}",
                target.username
            )));
        }
        info!(user_id = %viewer.id, following_id = %target.id, "User subscribed");

        let view = subscription_view(&resources, Some(&viewer), target, query.recipes_limit).await?;
        Ok((StatusCode::CREATED, Json(view)).into_response())
    }

    /// Handle DELETE /api/users/:id/subscribe
    async fn handle_unsubscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let viewer = resources.auth.require_user(&headers).await?;
        let target = Self::load_user(&resources, &id).await?;

        let removed = resources.database.follows().unfollow(viewer.id, target.id).await?;
        if !removed {
            return Err(AppError::invalid_input(format!(
                "You are not subscribed to {}",
                target.username
            )));
        }
        info!(user_id = %viewer.id, following_id = %target.id, "User unsubscribed");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
