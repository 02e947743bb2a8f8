// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory databases, users with API tokens, a seeded catalog and recipe builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `larder_server`

use std::sync::{Arc, Mutex, Once};

use larder_server::{
    auth::issue_token,
    config::ServerConfig,
    database::Database,
    models::{Ingredient, NewIngredient, NewRecipe, NewTag, NewUser, RecipeIngredientInput, Tag, User},
    resources::ServerResources,
    short_codes::{CodeSource, ShortCodeGenerator},
};

static INIT_LOGGER: Once = Once::new();

/// 1x1 transparent PNG as a data URL
pub const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Base URL used for short links and pagination links in tests
pub const BASE_URL: &str = "http://larder.test";

/// Replays a fixed list of values, then repeats the last one
///
/// Forces specific short code collisions.
#[derive(Debug)]
pub struct ScriptedCodeSource {
    values: Mutex<Vec<u64>>,
    last: Mutex<u64>,
}

impl ScriptedCodeSource {
    pub fn new(mut values: Vec<u64>) -> Self {
        values.reverse();
        Self {
            values: Mutex::new(values),
            last: Mutex::new(0),
        }
    }
}

impl CodeSource for ScriptedCodeSource {
    fn next_value(&self, upper: u64) -> u64 {
        let mut last = self.last.lock().unwrap();
        if let Some(value) = self.values.lock().unwrap().pop() {
            *last = value;
        }
        *last % upper
    }
}

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// In-memory database with the default random code generator
pub async fn create_test_database() -> Database {
    create_test_database_with(ShortCodeGenerator::default()).await
}

/// In-memory database with a specific code generator
pub async fn create_test_database_with(generator: ShortCodeGenerator) -> Database {
    init_test_logging();
    Database::new("sqlite::memory:", generator).await.unwrap()
}

/// Server configuration for router tests
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "sqlite::memory:".to_owned(),
        public_base_url: BASE_URL.to_owned(),
        ..ServerConfig::default()
    }
}

/// Shared resources around `database`
pub fn create_test_resources(database: Database) -> Arc<ServerResources> {
    Arc::new(ServerResources::new(database, Arc::new(test_config())))
}

/// A registered user with their plain API token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    /// `Authorization` header value for this user
    pub fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }
}

/// Register `username` with a fresh token
pub async fn create_test_user(database: &Database, username: &str) -> TestUser {
    let issued = issue_token();
    let user = database
        .users()
        .create(
            &NewUser {
                username: username.to_owned(),
                email: format!("{username}@example.com"),
                first_name: "Test".to_owned(),
                last_name: username.to_owned(),
            },
            &issued.token_hash,
        )
        .await
        .unwrap();
    TestUser {
        user,
        token: issued.token,
    }
}

/// Catalog rows created by [`seed_catalog`]
pub struct Catalog {
    pub flour: Ingredient,
    pub sugar: Ingredient,
    pub egg: Ingredient,
    pub milk: Ingredient,
    pub breakfast: Tag,
    pub dinner: Tag,
}

/// Insert a small ingredient and tag catalog
pub async fn seed_catalog(database: &Database) -> Catalog {
    let catalog = database.catalog();
    catalog
        .load_ingredients(&[
            NewIngredient {
                name: "Flour".to_owned(),
                measurement_unit: "g".to_owned(),
            },
            NewIngredient {
                name: "Sugar".to_owned(),
                measurement_unit: "g".to_owned(),
            },
            NewIngredient {
                name: "Egg".to_owned(),
                measurement_unit: "pcs".to_owned(),
            },
            NewIngredient {
                name: "Milk".to_owned(),
                measurement_unit: "ml".to_owned(),
            },
        ])
        .await
        .unwrap();

    let all = catalog.search_ingredients(None).await.unwrap();
    let find = |name: &str| all.iter().find(|i| i.name == name).cloned().unwrap();

    let breakfast = catalog
        .create_tag(&NewTag {
            name: "Breakfast".to_owned(),
            slug: "breakfast".to_owned(),
        })
        .await
        .unwrap();
    let dinner = catalog
        .create_tag(&NewTag {
            name: "Dinner".to_owned(),
            slug: "dinner".to_owned(),
        })
        .await
        .unwrap();

    Catalog {
        flour: find("Flour"),
        sugar: find("Sugar"),
        egg: find("Egg"),
        milk: find("Milk"),
        breakfast,
        dinner,
    }
}

/// Recipe request with the given ingredient lines and tags
pub fn recipe_request(name: &str, lines: &[(&Ingredient, u32)], tags: &[&Tag]) -> NewRecipe {
    NewRecipe {
        name: name.to_owned(),
        text: format!("How to make {name}"),
        cooking_time: 10,
        image: PIXEL.to_owned(),
        tags: tags.iter().map(|tag| tag.id).collect(),
        ingredients: lines
            .iter()
            .map(|(ingredient, amount)| RecipeIngredientInput {
                id: ingredient.id,
                amount: *amount,
            })
            .collect(),
    }
}
