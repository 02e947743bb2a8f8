// ABOUTME: Consolidates the ingredients of every recipe in a cart into one shopping list
// ABOUTME: Duplicates and stale cart entries are tolerated; output order is deterministic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! # Shopping List Aggregation
//!
//! A cart is a set of recipe references. The shopping list groups every
//! ingredient line of those recipes by `(name, measurement_unit)` and sums
//! the amounts. Each distinct recipe contributes once, however many times
//! it appears in the cart. Entries pointing at recipes that no longer exist
//! are skipped. Items are sorted by name, then unit.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use tracing::debug;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{IngredientAmount, RecipeId, ShoppingListItem};
use crate::stores::{CartStore, RecipeStore};

/// Aggregate the cart of `user_id` into shopping list items
///
/// # Errors
///
/// Propagates storage errors from either store
pub async fn aggregate_shopping_list(
    carts: &dyn CartStore,
    recipes: &dyn RecipeStore,
    user_id: Uuid,
) -> AppResult<Vec<ShoppingListItem>> {
    let recipe_ids: BTreeSet<RecipeId> = carts.list_cart_recipes(user_id).await?.into_iter().collect();

    let mut lines = Vec::new();
    for recipe_id in recipe_ids {
        if recipes.get_recipe(recipe_id).await?.is_none() {
            debug!(
                user_id = %user_id,
                recipe_id = recipe_id,
                "Skipping cart entry for missing recipe"
            );
            continue;
        }
        lines.extend(recipes.list_ingredients(recipe_id).await?);
    }

    Ok(group_ingredients(lines))
}

/// Group ingredient lines by `(name, measurement_unit)` and sum their amounts
#[must_use]
pub fn group_ingredients<I>(lines: I) -> Vec<ShoppingListItem>
where
    I: IntoIterator<Item = IngredientAmount>,
{
    let mut totals: BTreeMap<(String, String), u64> = BTreeMap::new();
    for line in lines {
        let key = (line.ingredient.name, line.ingredient.measurement_unit);
        let total = totals.entry(key).or_default();
        *total = total.saturating_add(u64::from(line.amount));
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListItem {
            name,
            measurement_unit,
            total_amount,
        })
        .collect()
}

/// Render items as the downloadable text file, one line per item
#[must_use]
pub fn render_shopping_list(items: &[ShoppingListItem]) -> String {
    let mut out = String::new();
    for item in items {
        // Writing into a String cannot fail
        let _ = writeln!(out, "{item}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    fn line(id: i64, name: &str, unit: &str, amount: u32) -> IngredientAmount {
        IngredientAmount {
            ingredient: Ingredient {
                id,
                name: name.to_owned(),
                measurement_unit: unit.to_owned(),
            },
            amount,
        }
    }

    #[test]
    fn test_same_name_different_units_stay_separate() {
        let items = group_ingredients(vec![
            line(1, "Milk", "ml", 200),
            line(2, "Milk", "cup", 1),
            line(1, "Milk", "ml", 50),
        ]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].measurement_unit, "cup");
        assert_eq!(items[1].total_amount, 250);
    }

    #[test]
    fn test_render_empty_list() {
        assert_eq!(render_shopping_list(&[]), "");
    }
}
