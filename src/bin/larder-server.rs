// ABOUTME: Server binary for the Larder recipe sharing API
// ABOUTME: Loads configuration, opens the database and serves the HTTP router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! # Larder API Server Binary
//!
//! Starts the HTTP API with token authentication, short links and shopping
//! list downloads.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use larder_server::{
    config::ServerConfig, database::Database, logging, resources::ServerResources, server,
    short_codes::ShortCodeGenerator,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "larder-server")]
#[command(about = "Larder - recipe sharing API with shopping lists and short links")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    config.validate()?;

    logging::init_from_env()?;
    info!("Starting Larder API server");
    info!("{}", config.summary());

    ensure_database_dir(&config.database_url).await?;
    let generator = ShortCodeGenerator::new(config.short_code_policy()?);
    let database = Database::new(&config.database_url, generator).await?;
    info!("Database URL: {}", config.database_url);

    let resources = Arc::new(ServerResources::new(database, Arc::new(config)));
    display_available_endpoints(&resources.config.public_base_url);

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}

/// Create the parent directory of a file-backed `SQLite` database
async fn ensure_database_dir(database_url: &str) -> Result<()> {
    if database_url.contains(":memory:") {
        return Ok(());
    }
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(base: &str) {
    info!("=== Available API Endpoints ===");
    info!("   Health:        GET  {base}/health, {base}/ready");
    info!("   Recipes:       GET/POST {base}/api/recipes");
    info!("   Recipe:        GET/PATCH/DELETE {base}/api/recipes/{{id}}");
    info!("   Short link:    GET  {base}/api/recipes/{{id}}/get-link -> {base}/s/{{code}}");
    info!("   Favorites:     POST/DELETE {base}/api/recipes/{{id}}/favorite");
    info!("   Cart:          POST/DELETE {base}/api/recipes/{{id}}/shopping_cart");
    info!("   Shopping list: GET  {base}/api/recipes/download_shopping_cart");
    info!("   Catalog:       GET  {base}/api/ingredients, {base}/api/tags");
    info!("   Users:         GET  {base}/api/users, {base}/api/users/me, {base}/api/users/subscriptions");
    info!("=== End of Endpoint List ===");
}
