// ABOUTME: JSON response shapes for users, recipes and subscriptions
// ABOUTME: Builders resolve viewer-relative flags like is_favorited and is_subscribed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::RecipeList;
use crate::errors::{AppError, AppResult};
use crate::models::{IngredientAmount, Recipe, RecipeId, Tag, User};
use crate::resources::ServerResources;

/// Public user representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    /// Email address
    pub email: String,
    /// User id
    pub id: Uuid,
    /// Login name
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether the caller follows this user
    pub is_subscribed: bool,
    /// Avatar data URL, `null` when unset
    pub avatar: Option<String>,
}

/// Ingredient line inside a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLineView {
    /// Ingredient id
    pub id: i64,
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Amount in the unit
    pub amount: u32,
}

impl From<IngredientAmount> for IngredientLineView {
    fn from(line: IngredientAmount) -> Self {
        Self {
            id: line.ingredient.id,
            name: line.ingredient.name,
            measurement_unit: line.ingredient.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Full recipe representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeView {
    /// Recipe id
    pub id: RecipeId,
    /// Tags
    pub tags: Vec<Tag>,
    /// Author
    pub author: UserView,
    /// Ingredient lines in recipe order
    pub ingredients: Vec<IngredientLineView>,
    /// Whether the caller favorited the recipe
    pub is_favorited: bool,
    /// Whether the recipe is in the caller's cart
    pub is_in_shopping_cart: bool,
    /// Title
    pub name: String,
    /// Image data URL
    pub image: String,
    /// Instructions
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
}

/// Compact recipe representation used by favorites, cart and subscriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    /// Recipe id
    pub id: RecipeId,
    /// Title
    pub name: String,
    /// Image data URL
    pub image: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Followed user with a preview of their recipes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionView {
    /// The followed user
    #[serde(flatten)]
    pub user: UserView,
    /// Newest recipes, truncated to `recipes_limit` when given
    pub recipes: Vec<RecipeSummary>,
    /// Total number of recipes by the user
    pub recipes_count: u64,
}

/// Build the public view of `user` as seen by `viewer`
///
/// # Errors
///
/// Returns an error if the follow lookup fails
pub async fn user_view(
    resources: &ServerResources,
    viewer: Option<&User>,
    user: User,
) -> AppResult<UserView> {
    let is_subscribed = match viewer {
        Some(viewer) => {
            resources
                .database
                .follows()
                .is_following(viewer.id, user.id)
                .await?
        }
        None => false,
    };
    Ok(UserView {
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed,
        avatar: user.avatar,
    })
}

/// Build the full view of `recipe` as seen by `viewer`
///
/// # Errors
///
/// Returns an error if any lookup fails or the author row is missing
pub async fn recipe_view(
    resources: &ServerResources,
    viewer: Option<&User>,
    recipe: Recipe,
) -> AppResult<RecipeView> {
    let db = &resources.database;
    let author = db
        .users()
        .get(recipe.author_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Author {}", recipe.author_id)))?;
    let author = user_view(resources, viewer, author).await?;
    let tags = db.recipes().tags(recipe.id).await?;
    let ingredients = db
        .recipes()
        .ingredients(recipe.id)
        .await?
        .into_iter()
        .map(IngredientLineView::from)
        .collect();

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer) => {
            let lists = db.recipe_lists();
            (
                lists.contains(RecipeList::Favorites, viewer.id, recipe.id).await?,
                lists
                    .contains(RecipeList::ShoppingCart, viewer.id, recipe.id)
                    .await?,
            )
        }
        None => (false, false),
    };

    Ok(RecipeView {
        id: recipe.id,
        tags,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// Build the subscription view of `user`
///
/// # Errors
///
/// Returns an error if any lookup fails
pub async fn subscription_view(
    resources: &ServerResources,
    viewer: Option<&User>,
    user: User,
    recipes_limit: Option<u32>,
) -> AppResult<SubscriptionView> {
    let recipes_manager = resources.database.recipes();
    let recipes = recipes_manager
        .list_by_author(user.id, recipes_limit)
        .await?
        .into_iter()
        .map(RecipeSummary::from)
        .collect();
    let recipes_count = recipes_manager.count_by_author(user.id).await?;
    let user = user_view(resources, viewer, user).await?;
    Ok(SubscriptionView {
        user,
        recipes,
        recipes_count,
    })
}
