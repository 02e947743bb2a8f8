// ABOUTME: Shared server resources handed to every route as axum state
// ABOUTME: Bundles the database, the auth manager and the loaded configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::pagination::{PageLink, PageRequest};

/// Centralized resource container for route handlers
#[derive(Clone)]
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// Request authentication
    pub auth: AuthManager,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Bundle resources for the router
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>) -> Self {
        let auth = AuthManager::new(database.users());
        Self {
            database,
            auth,
            config,
        }
    }

    /// Page request honoring the configured default and maximum page size
    #[must_use]
    pub fn page_request(&self, page: Option<u32>, limit: Option<u32>) -> PageRequest {
        PageRequest::new(
            page,
            limit,
            self.config.pagination.page_size,
            self.config.pagination.max_page_size,
        )
    }

    /// Link builder for a paginated resource at `path`
    #[must_use]
    pub fn page_link<'a>(&'a self, path: &'a str, query: Option<&'a str>) -> PageLink<'a> {
        PageLink {
            base_url: &self.config.public_base_url,
            path,
            query,
        }
    }

    /// Absolute short link for a code
    #[must_use]
    pub fn short_link(&self, code: &str) -> String {
        format!(
            "{}{}/{code}",
            self.config.public_base_url.trim_end_matches('/'),
            crate::constants::endpoints::SHORT_LINK_PREFIX
        )
    }
}
