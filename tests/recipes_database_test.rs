// ABOUTME: Integration tests for the SQLite recipe, catalog, list and follow managers
// ABOUTME: CRUD, catalog validation, list filters, pagination and subscriptions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

// Test files: allow missing_docs (rustc lint) and unwrap (valid in tests)
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::{create_test_database, create_test_user, recipe_request, seed_catalog};
use larder_server::{
    database::{RecipeFilter, RecipeList},
    errors::ErrorCode,
    models::{NewIngredient, NewTag, RecipeIngredientInput, RecipeUpdate},
    pagination::PageRequest,
    stores::RecipeStore,
};

fn page(page: u32, limit: u32) -> PageRequest {
    PageRequest::new(Some(page), Some(limit), 6, 100)
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_load_ingredients_skips_existing_pairs() {
    let db = create_test_database().await;
    seed_catalog(&db).await;

    let inserted = db
        .catalog()
        .load_ingredients(&[
            NewIngredient {
                name: "Flour".to_owned(),
                measurement_unit: "g".to_owned(),
            },
            NewIngredient {
                name: "Flour".to_owned(),
                measurement_unit: "kg".to_owned(),
            },
        ])
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(db.catalog().search_ingredients(None).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_ingredient_search_is_case_insensitive_prefix() {
    let db = create_test_database().await;
    seed_catalog(&db).await;

    let found = db.catalog().search_ingredients(Some("fl")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Flour");

    let none = db.catalog().search_ingredients(Some("our")).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_ingredient_search_folds_non_ascii_case() {
    let db = create_test_database().await;
    db.catalog()
        .load_ingredients(&[
            NewIngredient {
                name: "Мука пшеничная".to_owned(),
                measurement_unit: "г".to_owned(),
            },
            NewIngredient {
                name: "Молоко".to_owned(),
                measurement_unit: "мл".to_owned(),
            },
            NewIngredient {
                name: "Яйцо".to_owned(),
                measurement_unit: "шт".to_owned(),
            },
        ])
        .await
        .unwrap();

    let found = db.catalog().search_ingredients(Some("МУ")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Мука пшеничная");

    let both = db.catalog().search_ingredients(Some("м")).await.unwrap();
    let names: Vec<&str> = both.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Молоко", "Мука пшеничная"]);
}

#[tokio::test]
async fn test_duplicate_tag_slug_is_rejected() {
    let db = create_test_database().await;
    seed_catalog(&db).await;

    let err = db
        .catalog()
        .create_tag(&NewTag {
            name: "Morning".to_owned(),
            slug: "breakfast".to_owned(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

// ============================================================================
// Recipe CRUD
// ============================================================================

#[tokio::test]
async fn test_create_and_read_recipe() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;

    let recipe = db
        .create_recipe(
            cook.user.id,
            &recipe_request(
                "Pancakes",
                &[(&catalog.milk, 250), (&catalog.flour, 200), (&catalog.egg, 2)],
                &[&catalog.breakfast],
            ),
        )
        .await
        .unwrap();

    let stored = db.recipes().get(recipe.id).await.unwrap().unwrap();
    assert_eq!(stored, recipe);

    let lines = db.recipes().ingredients(recipe.id).await.unwrap();
    let names: Vec<&str> = lines.iter().map(|l| l.ingredient.name.as_str()).collect();
    assert_eq!(names, vec!["Milk", "Flour", "Egg"]);
    assert_eq!(lines[0].amount, 250);

    let tags = db.recipes().tags(recipe.id).await.unwrap();
    assert_eq!(tags, vec![catalog.breakfast.clone()]);

    let by_code = db.recipes().get_by_code(&recipe.short_code).await.unwrap();
    assert_eq!(by_code.map(|r| r.id), Some(recipe.id));
}

#[tokio::test]
async fn test_unknown_catalog_ids_are_invalid_input() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;

    let mut request = recipe_request("Ghost", &[(&catalog.flour, 1)], &[&catalog.dinner]);
    request.ingredients.push(RecipeIngredientInput {
        id: 9_999,
        amount: 1,
    });
    let err = db.create_recipe(cook.user.id, &request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let mut request = recipe_request("Ghost", &[(&catalog.flour, 1)], &[&catalog.dinner]);
    request.tags.push(9_999);
    let err = db.create_recipe(cook.user.id, &request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    assert_eq!(db.recipes().count_by_author(cook.user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_repeated_ingredient_is_rejected() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;

    let request = recipe_request(
        "Double",
        &[(&catalog.flour, 1), (&catalog.flour, 2)],
        &[&catalog.dinner],
    );
    let err = db.create_recipe(cook.user.id, &request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_update_replaces_given_sets_only() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    let recipe = db
        .create_recipe(
            cook.user.id,
            &recipe_request("Bake", &[(&catalog.flour, 300)], &[&catalog.dinner]),
        )
        .await
        .unwrap();

    let updated = db
        .recipes()
        .update(
            recipe.id,
            &RecipeUpdate {
                cooking_time: Some(45),
                tags: Some(vec![catalog.breakfast.id, catalog.dinner.id]),
                ..RecipeUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.cooking_time, 45);
    assert_eq!(updated.name, "Bake");
    assert_eq!(db.recipes().tags(recipe.id).await.unwrap().len(), 2);
    let lines = db.recipes().ingredients(recipe.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].amount, 300);

    let missing = db
        .recipes()
        .update(recipe.id + 100, &RecipeUpdate::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_delete_removes_recipe() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    let recipe = db
        .create_recipe(
            cook.user.id,
            &recipe_request("Gone", &[(&catalog.egg, 1)], &[&catalog.dinner]),
        )
        .await
        .unwrap();

    assert!(db.recipes().delete(recipe.id).await.unwrap());
    assert!(!db.recipes().delete(recipe.id).await.unwrap());
    assert!(db.recipes().get(recipe.id).await.unwrap().is_none());
    assert!(db.recipes().get_by_code(&recipe.short_code).await.unwrap().is_none());
}

// ============================================================================
// Listing and filters
// ============================================================================

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let alice = create_test_user(&db, "alice").await;
    let bob = create_test_user(&db, "bob").await;

    let mut alice_ids = Vec::new();
    for name in ["One", "Two", "Three"] {
        let recipe = db
            .create_recipe(
                alice.user.id,
                &recipe_request(name, &[(&catalog.egg, 1)], &[&catalog.breakfast]),
            )
            .await
            .unwrap();
        alice_ids.push(recipe.id);
    }
    let bobs = db
        .create_recipe(
            bob.user.id,
            &recipe_request("Four", &[(&catalog.milk, 1)], &[&catalog.dinner]),
        )
        .await
        .unwrap();

    let recipes = db.recipes();

    let (all, count) = recipes.list(&RecipeFilter::default(), page(1, 10)).await.unwrap();
    assert_eq!(count, 4);
    assert_eq!(all[0].id, bobs.id, "newest first");

    let (first_page, count) = recipes.list(&RecipeFilter::default(), page(1, 3)).await.unwrap();
    let (second_page, _) = recipes.list(&RecipeFilter::default(), page(2, 3)).await.unwrap();
    let (beyond, _) = recipes.list(&RecipeFilter::default(), page(5, 3)).await.unwrap();
    assert_eq!(count, 4);
    assert_eq!(first_page.len(), 3);
    assert_eq!(second_page.len(), 1);
    assert!(beyond.is_empty());

    let by_author = RecipeFilter {
        author: Some(alice.user.id),
        ..RecipeFilter::default()
    };
    assert_eq!(recipes.list(&by_author, page(1, 10)).await.unwrap().1, 3);

    let by_tags = RecipeFilter {
        tags: vec!["dinner".to_owned(), "unknown".to_owned()],
        ..RecipeFilter::default()
    };
    let (tagged, count) = recipes.list(&by_tags, page(1, 10)).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(tagged[0].id, bobs.id);

    let lists = db.recipe_lists();
    lists
        .add(RecipeList::Favorites, bob.user.id, alice_ids[0])
        .await
        .unwrap();
    lists
        .add(RecipeList::ShoppingCart, bob.user.id, alice_ids[1])
        .await
        .unwrap();

    let favorites = RecipeFilter {
        favorited: Some((bob.user.id, true)),
        ..RecipeFilter::default()
    };
    let (favs, _) = recipes.list(&favorites, page(1, 10)).await.unwrap();
    assert_eq!(favs.iter().map(|r| r.id).collect::<Vec<_>>(), vec![alice_ids[0]]);

    let not_in_cart = RecipeFilter {
        in_shopping_cart: Some((bob.user.id, false)),
        ..RecipeFilter::default()
    };
    assert_eq!(recipes.list(&not_in_cart, page(1, 10)).await.unwrap().1, 3);
}

#[tokio::test]
async fn test_list_by_author_limit() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    for name in ["A", "B", "C"] {
        db.create_recipe(
            cook.user.id,
            &recipe_request(name, &[(&catalog.sugar, 5)], &[&catalog.dinner]),
        )
        .await
        .unwrap();
    }

    let recipes = db.recipes();
    assert_eq!(recipes.list_by_author(cook.user.id, Some(2)).await.unwrap().len(), 2);
    assert_eq!(recipes.list_by_author(cook.user.id, None).await.unwrap().len(), 3);
    assert_eq!(recipes.count_by_author(cook.user.id).await.unwrap(), 3);
}

// ============================================================================
// Favorites, cart and follows
// ============================================================================

#[tokio::test]
async fn test_recipe_list_membership() {
    let db = create_test_database().await;
    let catalog = seed_catalog(&db).await;
    let cook = create_test_user(&db, "cook").await;
    let recipe = db
        .create_recipe(
            cook.user.id,
            &recipe_request("Salad", &[(&catalog.egg, 2)], &[&catalog.dinner]),
        )
        .await
        .unwrap();

    let lists = db.recipe_lists();
    assert!(lists.add(RecipeList::Favorites, cook.user.id, recipe.id).await.unwrap());
    assert!(!lists.add(RecipeList::Favorites, cook.user.id, recipe.id).await.unwrap());
    assert!(lists.contains(RecipeList::Favorites, cook.user.id, recipe.id).await.unwrap());
    assert!(!lists.contains(RecipeList::ShoppingCart, cook.user.id, recipe.id).await.unwrap());
    assert!(lists.remove(RecipeList::Favorites, cook.user.id, recipe.id).await.unwrap());
    assert!(!lists.remove(RecipeList::Favorites, cook.user.id, recipe.id).await.unwrap());
}

#[tokio::test]
async fn test_follow_rules() {
    let db = create_test_database().await;
    let alice = create_test_user(&db, "alice").await;
    let bob = create_test_user(&db, "bob").await;
    let carol = create_test_user(&db, "carol").await;
    let follows = db.follows();

    let err = follows.follow(alice.user.id, alice.user.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    assert!(follows.follow(alice.user.id, bob.user.id).await.unwrap());
    assert!(!follows.follow(alice.user.id, bob.user.id).await.unwrap());
    assert!(follows.follow(alice.user.id, carol.user.id).await.unwrap());
    assert!(follows.is_following(alice.user.id, bob.user.id).await.unwrap());
    assert!(!follows.is_following(bob.user.id, alice.user.id).await.unwrap());

    let (following, count) = follows.list_following(alice.user.id, page(1, 10)).await.unwrap();
    assert_eq!(count, 2);
    let names: Vec<&str> = following.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["bob", "carol"]);

    assert!(follows.unfollow(alice.user.id, bob.user.id).await.unwrap());
    assert!(!follows.unfollow(alice.user.id, bob.user.id).await.unwrap());
}

#[tokio::test]
async fn test_users_are_unique_and_listed_by_username() {
    let db = create_test_database().await;
    create_test_user(&db, "zed").await;
    create_test_user(&db, "amy").await;

    let (users, count) = db.users().list(page(1, 10)).await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(users[0].username, "amy");

    let err = db
        .users()
        .create(
            &larder_server::models::NewUser {
                username: "amy".to_owned(),
                email: "other@example.com".to_owned(),
                first_name: "Amy".to_owned(),
                last_name: "Again".to_owned(),
            },
            "hash",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

// ============================================================================
// File-backed database
// ============================================================================

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("larder.db").display());

    let code = {
        let db = larder_server::database::Database::new(
            &url,
            larder_server::short_codes::ShortCodeGenerator::default(),
        )
        .await
        .unwrap();
        let catalog = seed_catalog(&db).await;
        let cook = create_test_user(&db, "cook").await;
        let recipe = db
            .create_recipe(
                cook.user.id,
                &recipe_request("Kept", &[(&catalog.flour, 1)], &[&catalog.dinner]),
            )
            .await
            .unwrap();
        db.pool().close().await;
        recipe.short_code
    };

    let reopened = larder_server::database::Database::new(
        &url,
        larder_server::short_codes::ShortCodeGenerator::default(),
    )
    .await
    .unwrap();
    let recipe = reopened.recipes().get_by_code(&code).await.unwrap().unwrap();
    assert_eq!(recipe.name, "Kept");
}

#[tokio::test]
async fn test_reopen_folds_names_of_legacy_rows() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("larder.db").display());

    {
        let db = larder_server::database::Database::new(
            &url,
            larder_server::short_codes::ShortCodeGenerator::default(),
        )
        .await
        .unwrap();
        sqlx::query("INSERT INTO ingredients (name, measurement_unit) VALUES ('Сахар', 'г')")
            .execute(db.pool())
            .await
            .unwrap();
        assert!(db
            .catalog()
            .search_ingredients(Some("са"))
            .await
            .unwrap()
            .is_empty());
        db.pool().close().await;
    }

    let reopened = larder_server::database::Database::new(
        &url,
        larder_server::short_codes::ShortCodeGenerator::default(),
    )
    .await
    .unwrap();
    let found = reopened
        .catalog()
        .search_ingredients(Some("са"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Сахар");
}

#[tokio::test]
async fn test_avatar_set_and_clear() {
    let db = create_test_database().await;
    let cook = create_test_user(&db, "cook").await;
    assert!(cook.user.avatar.is_none());

    let updated = db
        .users()
        .set_avatar(cook.user.id, Some(common::PIXEL))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.avatar.as_deref(), Some(common::PIXEL));
    let listed = db.users().list(page(1, 10)).await.unwrap().0;
    assert_eq!(listed[0].avatar.as_deref(), Some(common::PIXEL));

    let cleared = db
        .users()
        .set_avatar(cook.user.id, None)
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.avatar.is_none());

    let missing = db
        .users()
        .set_avatar(uuid::Uuid::new_v4(), None)
        .await
        .unwrap();
    assert!(missing.is_none());
}
