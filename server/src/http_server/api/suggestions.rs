use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use db::cooking::{InventoryItem, Recipe, RecipeIngredient};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    http_server::{errors::ServerError, ResponseResult},
    planner::{rank_by_completion, recipe_completion, RankedRecipe},
    recommendations::{
        ask, meal_suggestion_prompt, parse_meal_suggestions, MealSuggestion,
        MealSuggestionRequest,
    },
    AppState,
};

use super::extract::{Json, Path};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(inventory_suggestions))
        .route("/missing-ingredients/{id}", get(missing_ingredients))
        .route("/shopping-list/{id}", get(shopping_list))
        .route("/ai", post(ai_suggestions))
}

#[derive(Debug, Serialize)]
struct InventorySuggestions {
    suggested_recipes: Vec<RankedRecipe>,
}

#[derive(Debug, Serialize)]
struct MissingIngredients {
    recipe_id: Uuid,
    recipe_name: String,
    missing_ingredients: Vec<RecipeIngredient>,
}

#[derive(Debug, Serialize)]
struct ShoppingList {
    recipe_id: Uuid,
    recipe_name: String,
    /// Missing ingredients keyed by store section.
    shopping_list: BTreeMap<String, Vec<RecipeIngredient>>,
}

#[derive(Debug, Serialize)]
struct AiSuggestions {
    ai_suggestions: Vec<MealSuggestion>,
}

fn group_by_section(ingredients: Vec<RecipeIngredient>) -> BTreeMap<String, Vec<RecipeIngredient>> {
    let mut sections: BTreeMap<String, Vec<RecipeIngredient>> = BTreeMap::new();
    for ingredient in ingredients {
        sections
            .entry(ingredient.store_section.clone())
            .or_default()
            .push(ingredient);
    }
    sections
}

async fn load_recipe(state: &AppState, id: Uuid) -> ResponseResult<Recipe> {
    Recipe::get_by_id(state.db(), id)
        .await?
        .ok_or_else(|| ServerError::not_found("Recipe"))
}

#[axum_macros::debug_handler]
async fn inventory_suggestions(
    State(state): State<AppState>,
) -> ResponseResult<Json<InventorySuggestions>> {
    let on_hand = InventoryItem::list_in_stock(state.db()).await?;
    let recipes = Recipe::list_all(state.db()).await?;

    Ok(Json(InventorySuggestions {
        suggested_recipes: rank_by_completion(recipes, &on_hand),
    }))
}

#[axum_macros::debug_handler]
async fn missing_ingredients(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<MissingIngredients>> {
    let recipe = load_recipe(&state, id).await?;
    let on_hand = InventoryItem::list_in_stock(state.db()).await?;

    let completion = recipe_completion(&recipe.ingredients, &on_hand);

    Ok(Json(MissingIngredients {
        recipe_id: recipe.recipe_id,
        recipe_name: recipe.name,
        missing_ingredients: completion.missing_ingredients,
    }))
}

#[axum_macros::debug_handler]
async fn shopping_list(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<ShoppingList>> {
    let recipe = load_recipe(&state, id).await?;
    let on_hand = InventoryItem::list_in_stock(state.db()).await?;

    let completion = recipe_completion(&recipe.ingredients, &on_hand);

    Ok(Json(ShoppingList {
        recipe_id: recipe.recipe_id,
        recipe_name: recipe.name,
        shopping_list: group_by_section(completion.missing_ingredients),
    }))
}

#[axum_macros::debug_handler]
async fn ai_suggestions(
    State(state): State<AppState>,
    Json(request): Json<MealSuggestionRequest>,
) -> ResponseResult<Json<AiSuggestions>> {
    let on_hand = InventoryItem::list_in_stock(state.db()).await?;

    let prompt = meal_suggestion_prompt(&request, &on_hand);
    let reply = ask(&state.http, state.open_ai.as_ref(), prompt).await;

    Ok(Json(AiSuggestions {
        ai_suggestions: parse_meal_suggestions(&reply),
    }))
}
