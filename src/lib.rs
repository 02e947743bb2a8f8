// ABOUTME: Main library entry point for the Larder recipe sharing API
// ABOUTME: Wires storage, shopping list aggregation, short links and the HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

#![deny(unsafe_code)]

//! # Larder Server
//!
//! A recipe sharing backend: users publish recipes, tag and search them,
//! favorite them, follow other users and download shopping lists built from
//! the recipes in their cart.
//!
//! ## Features
//!
//! - **Shopping lists**: cart recipes are merged into one list, summing
//!   amounts per ingredient name and unit
//! - **Short links**: every recipe gets a unique numeric code at creation,
//!   resolved by `/s/{code}` into a redirect
//! - **Stores**: `RecipeStore`/`CartStore` seams backed by `SQLite` or memory
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use larder_server::config::ServerConfig;
//! use larder_server::database::Database;
//! use larder_server::resources::ServerResources;
//! use larder_server::short_codes::ShortCodeGenerator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let generator = ShortCodeGenerator::new(config.short_code_policy()?);
//!     let database = Database::new(&config.database_url, generator).await?;
//!     let resources = Arc::new(ServerResources::new(database, Arc::new(config)));
//!     larder_server::server::run(resources).await
//! }
//! ```

pub use larder_core::{constants, errors, models, pagination};

/// Token issuance helpers and request authentication
pub mod auth;

/// Environment configuration
pub mod config;

/// `SQLite` storage: schema, managers and transactions
pub mod database;

/// Tracing subscriber setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Shared state for route handlers
pub mod resources;

/// HTTP routes
pub mod routes;

/// Router assembly and serving
pub mod server;

/// Shopping list aggregation and rendering
pub mod shopping_list;

/// Short code generation and resolution
pub mod short_codes;

/// Recipe and cart store seams with their implementations
pub mod stores;
