// ABOUTME: Administrative command line tool for users, ingredients and tags
// ABOUTME: Issues API tokens out of band and bulk-loads the ingredient catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Out-of-band administration for the Larder API.
//!
//! Usage:
//! ```bash
//! # Register a user and print their API token
//! cargo run --bin larder-admin -- create-user alice alice@example.com Alice Liddell
//!
//! # Load ingredients from a JSON fixture
//! cargo run --bin larder-admin -- load-ingredients data/ingredients.json
//!
//! # Create a tag
//! cargo run --bin larder-admin -- create-tag --name Breakfast --slug breakfast
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use larder_server::{
    auth::issue_token,
    config::ServerConfig,
    database::Database,
    models::{NewIngredient, NewTag, NewUser},
    short_codes::ShortCodeGenerator,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "larder-admin",
    about = "Larder administration",
    long_about = "Manage users, the ingredient catalog and tags directly against the Larder database."
)]
struct AdminArgs {
    #[command(subcommand)]
    command: AdminCommand,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Register a user and print a freshly issued API token
    CreateUser {
        /// Login name
        username: String,
        /// Email address
        email: String,
        /// Given name
        first_name: String,
        /// Family name
        last_name: String,
    },

    /// Load ingredients from a JSON array of `{name, measurement_unit}`
    LoadIngredients {
        /// Fixture file
        file: PathBuf,
    },

    /// Create a tag
    CreateTag {
        /// Display name
        #[arg(long)]
        name: String,
        /// URL-safe slug
        #[arg(long)]
        slug: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminArgs::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let mut config = ServerConfig::from_env()?;
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!("Connecting to database: {}", config.database_url);
    let generator = ShortCodeGenerator::new(config.short_code_policy()?);
    let database = Database::new(&config.database_url, generator).await?;

    match args.command {
        AdminCommand::CreateUser {
            username,
            email,
            first_name,
            last_name,
        } => {
            let request = NewUser {
                username,
                email,
                first_name,
                last_name,
            };
            create_user_command(&database, &request).await?;
        }
        AdminCommand::LoadIngredients { file } => {
            load_ingredients_command(&database, &file).await?;
        }
        AdminCommand::CreateTag { name, slug } => {
            let tag = database.catalog().create_tag(&NewTag { name, slug }).await?;
            info!(tag_id = tag.id, slug = %tag.slug, "Tag created");
            println!("Created tag {} ({})", tag.name, tag.slug);
        }
    }

    Ok(())
}

async fn create_user_command(database: &Database, request: &NewUser) -> Result<()> {
    let issued = issue_token();
    let user = database.users().create(request, &issued.token_hash).await?;
    info!(user_id = %user.id, username = %user.username, "User created");

    println!("Created user {} ({})", user.username, user.id);
    println!("API token (shown once): {}", issued.token);
    println!("Use it as: Authorization: Token {}", issued.token);
    Ok(())
}

async fn load_ingredients_command(database: &Database, file: &PathBuf) -> Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let ingredients: Vec<NewIngredient> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of ingredients", file.display()))?;

    let inserted = database.catalog().load_ingredients(&ingredients).await?;
    info!(
        total = ingredients.len(),
        inserted,
        skipped = ingredients.len() - inserted,
        "Ingredients loaded"
    );
    println!(
        "Loaded {inserted} new ingredients ({} already present)",
        ingredients.len() - inserted
    );
    Ok(())
}
