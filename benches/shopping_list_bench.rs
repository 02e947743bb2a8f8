// ABOUTME: Criterion benchmarks for shopping list grouping and end-to-end aggregation
// ABOUTME: Measures merge cost for growing carts over a shared ingredient catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Criterion benchmarks for shopping list aggregation.
//!
//! `group` measures the pure merge step; `aggregate` drives the full path
//! through the in-memory store.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use larder_server::models::{Ingredient, IngredientAmount, NewRecipe, RecipeIngredientInput};
use larder_server::shopping_list::{aggregate_shopping_list, group_ingredients, render_shopping_list};
use larder_server::stores::{MemoryStore, RecipeStore};
use tokio::runtime::Runtime;
use uuid::Uuid;

const CATALOG_SIZE: i64 = 200;
const LINES_PER_RECIPE: i64 = 8;
const IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

fn catalog_line(id: i64, amount: u32) -> IngredientAmount {
    IngredientAmount {
        ingredient: Ingredient {
            id,
            name: format!("Ingredient {}", id % CATALOG_SIZE),
            measurement_unit: if id % 3 == 0 { "g" } else { "pcs" }.to_owned(),
        },
        amount,
    }
}

fn cart_lines(recipes: i64) -> Vec<IngredientAmount> {
    (0..recipes)
        .flat_map(|recipe| {
            (0..LINES_PER_RECIPE).map(move |line| catalog_line(recipe * 7 + line * 13, 10))
        })
        .collect()
}

fn bench_group(c: &mut Criterion) {
    let mut group = c.benchmark_group("group");
    for recipes in [1_i64, 10, 100, 1_000] {
        let lines = cart_lines(recipes);
        group.throughput(Throughput::Elements(lines.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(recipes), &lines, |b, lines| {
            b.iter(|| {
                let items = group_ingredients(black_box(lines.clone()));
                black_box(render_shopping_list(&items))
            });
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("aggregate");

    for recipes in [10_i64, 100] {
        let store = MemoryStore::default();
        let ids: Vec<i64> = (0..CATALOG_SIZE)
            .map(|i| store.add_ingredient(&format!("Ingredient {i}"), "g").id)
            .collect();
        let user = Uuid::new_v4();

        rt.block_on(async {
            for recipe in 0..recipes {
                let request = NewRecipe {
                    name: format!("Recipe {recipe}"),
                    text: "Cook.".to_owned(),
                    cooking_time: 10,
                    image: IMAGE.to_owned(),
                    tags: vec![1],
                    ingredients: (0..LINES_PER_RECIPE)
                        .map(|line| RecipeIngredientInput {
                            id: ids[((recipe * 7 + line * 13) % CATALOG_SIZE) as usize],
                            amount: 5,
                        })
                        .collect(),
                };
                let created = store.create_recipe(user, &request).await.unwrap();
                store.add_to_cart(user, created.id);
            }
        });

        group.bench_function(BenchmarkId::from_parameter(recipes), |b| {
            b.to_async(&rt).iter(|| async {
                black_box(aggregate_shopping_list(&store, &store, user).await.unwrap())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_group, bench_aggregate);
criterion_main!(benches);
