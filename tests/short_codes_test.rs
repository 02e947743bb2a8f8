// ABOUTME: Integration tests for short code assignment and resolution
// ABOUTME: Concurrent uniqueness, forced collisions, widening, exhaustion and lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

// Test files: allow missing_docs (rustc lint) and unwrap (valid in tests)
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{
    create_test_database, create_test_database_with, create_test_user, recipe_request,
    seed_catalog, ScriptedCodeSource,
};
use larder_server::{
    errors::ErrorCode,
    models::{NewRecipe, RecipeIngredientInput, RecipeUpdate},
    short_codes::{resolve, ShortCodeGenerator, ShortCodePolicy},
    stores::{MemoryStore, RecipeStore},
};
use tokio::task::JoinSet;
use uuid::Uuid;

fn scripted(initial: usize, max: usize, attempts: u32, values: Vec<u64>) -> ShortCodeGenerator {
    ShortCodeGenerator::with_source(
        ShortCodePolicy::new(initial, max, attempts).unwrap(),
        Arc::new(ScriptedCodeSource::new(values)),
    )
}

fn memory_recipe(ingredient_id: i64) -> NewRecipe {
    NewRecipe {
        name: "Toast".to_owned(),
        text: "Toast the bread.".to_owned(),
        cooking_time: 3,
        image: common::PIXEL.to_owned(),
        tags: vec![1],
        ingredients: vec![RecipeIngredientInput {
            id: ingredient_id,
            amount: 1,
        }],
    }
}

// ============================================================================
// Uniqueness under load
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_ten_thousand_concurrent_codes_are_unique() {
    let generator = ShortCodeGenerator::new(ShortCodePolicy::new(6, 6, 8).unwrap());
    let store = Arc::new(MemoryStore::new(generator));
    let bread_id = store.add_ingredient("Bread", "slices").id;
    let author = Uuid::new_v4();

    let mut tasks = JoinSet::new();
    for _ in 0..10_000 {
        let store = Arc::clone(&store);
        tasks.spawn(async move {
            store
                .create_recipe(author, &memory_recipe(bread_id))
                .await
                .unwrap()
                .short_code
        });
    }

    let mut codes = HashSet::new();
    while let Some(code) = tasks.join_next().await {
        let code = code.unwrap();
        assert_eq!(code.len(), 6);
        assert!(codes.insert(code), "duplicate short code assigned");
    }
    assert_eq!(codes.len(), 10_000);
    assert_eq!(store.recipe_count(), 10_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crowded_sqlite_space_stays_unique() {
    let db = create_test_database_with(ShortCodeGenerator::new(
        ShortCodePolicy::new(2, 3, 8).unwrap(),
    ))
    .await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    let request = recipe_request("Crepes", &[(&catalog.flour, 250)], &[&catalog.breakfast]);

    let mut tasks = JoinSet::new();
    for _ in 0..60 {
        let db = db.clone();
        let request = request.clone();
        let author = cook.user.id;
        tasks.spawn(async move { db.create_recipe(author, &request).await.unwrap().short_code });
    }

    let mut codes = HashSet::new();
    while let Some(code) = tasks.join_next().await {
        assert!(codes.insert(code.unwrap()));
    }
    assert_eq!(codes.len(), 60);
}

// ============================================================================
// Collisions, widening and exhaustion
// ============================================================================

#[tokio::test]
async fn test_collision_on_insert_draws_again() {
    let db = create_test_database_with(scripted(6, 6, 3, vec![42, 42, 7])).await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    let request = recipe_request("Bread", &[(&catalog.flour, 500)], &[&catalog.dinner]);

    let first = db.create_recipe(cook.user.id, &request).await.unwrap();
    let second = db.create_recipe(cook.user.id, &request).await.unwrap();

    assert_eq!(first.short_code.as_str(), "000042");
    assert_eq!(second.short_code.as_str(), "000007");
}

#[tokio::test]
async fn test_full_width_moves_to_wider_codes() {
    let db = create_test_database_with(scripted(1, 2, 2, vec![3])).await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    let request = recipe_request("Porridge", &[(&catalog.milk, 200)], &[&catalog.breakfast]);

    let narrow = db.create_recipe(cook.user.id, &request).await.unwrap();
    let wide = db.create_recipe(cook.user.id, &request).await.unwrap();

    assert_eq!(narrow.short_code.as_str(), "3");
    assert_eq!(wide.short_code.as_str(), "03");
}

#[tokio::test]
async fn test_exhausted_space_is_an_internal_error() {
    let db = create_test_database_with(scripted(1, 2, 2, vec![3])).await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    let request = recipe_request("Porridge", &[(&catalog.milk, 200)], &[&catalog.breakfast]);

    db.create_recipe(cook.user.id, &request).await.unwrap();
    db.create_recipe(cook.user.id, &request).await.unwrap();
    let err = db.create_recipe(cook.user.id, &request).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ShortCodeSpaceExhausted);
    assert_eq!(err.http_status(), 500);
    assert_eq!(db.recipes().count_by_author(cook.user.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_generate_unique_code_skips_taken_codes() {
    let store = MemoryStore::new(scripted(6, 6, 4, vec![5]));
    let bread = store.add_ingredient("Bread", "slices");
    let recipe = store
        .create_recipe(Uuid::new_v4(), &memory_recipe(bread.id))
        .await
        .unwrap();
    assert_eq!(recipe.short_code.as_str(), "000005");

    let advisory = scripted(6, 6, 4, vec![5, 9]);
    let code = advisory.generate_unique_code(&store).await.unwrap();
    assert_eq!(code.as_str(), "000009");
}

// ============================================================================
// Resolution
// ============================================================================

#[tokio::test]
async fn test_resolve_own_code_and_unknown_codes() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    let recipe = db
        .create_recipe(
            cook.user.id,
            &recipe_request("Soup", &[(&catalog.milk, 500)], &[&catalog.dinner]),
        )
        .await
        .unwrap();

    let resolved = resolve(&db, recipe.short_code.as_str()).await.unwrap();
    assert_eq!(resolved.id, recipe.id);

    let unused = if recipe.short_code.as_str() == "999999" {
        "000000"
    } else {
        "999999"
    };
    for raw in [unused, "12ab56", "", "1234567890123456789012"] {
        let err = resolve(&db, raw).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound, "code {raw:?}");
    }
}

#[tokio::test]
async fn test_code_survives_updates() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    let recipe = db
        .create_recipe(
            cook.user.id,
            &recipe_request("Stew", &[(&catalog.milk, 100)], &[&catalog.dinner]),
        )
        .await
        .unwrap();

    let updated = db
        .recipes()
        .update(
            recipe.id,
            &RecipeUpdate {
                name: Some("Hearty stew".to_owned()),
                ingredients: Some(vec![RecipeIngredientInput {
                    id: catalog.flour.id,
                    amount: 30,
                }]),
                ..RecipeUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Hearty stew");
    assert_eq!(updated.short_code, recipe.short_code);
    assert_eq!(
        resolve(&db, recipe.short_code.as_str()).await.unwrap().id,
        recipe.id
    );
}
