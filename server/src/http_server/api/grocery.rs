use std::collections::HashMap;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use color_eyre::eyre::Context as _;
use db::cooking::{GroceryList, MealPlanEntry, Recipe};
use uuid::Uuid;

use crate::{
    http_server::{errors::ServerError, ResponseResult},
    planner::aggregate_grocery_items,
    AppState,
};

use super::extract::{Json, Path};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/grocery-list/{week_start_date}", post(generate_grocery_list))
        .route("/grocery-lists/{week_start_date}", get(get_grocery_list))
}

/// Rebuilds the week's list from its meal plan and stores it over any previous one.
#[axum_macros::debug_handler]
async fn generate_grocery_list(
    State(state): State<AppState>,
    Path(week_start_date): Path<NaiveDate>,
) -> ResponseResult<Json<GroceryList>> {
    let entries = MealPlanEntry::get_by_week(state.db(), week_start_date)
        .await
        .wrap_err("Failed to load meal plans")?;

    let mut recipe_ids = entries.iter().map(|e| e.recipe_id).collect::<Vec<_>>();
    recipe_ids.sort_unstable();
    recipe_ids.dedup();

    let recipes: HashMap<Uuid, Recipe> = Recipe::get_by_ids(state.db(), &recipe_ids)
        .await
        .wrap_err("Failed to load recipes")?
        .into_iter()
        .map(|recipe| (recipe.recipe_id, recipe))
        .collect();

    let items = aggregate_grocery_items(&entries, &recipes);
    tracing::info!(
        entries = entries.len(),
        recipes = recipes.len(),
        items = items.len(),
        "Aggregated grocery list"
    );

    let list = GroceryList::upsert(state.db(), week_start_date, &items)
        .await
        .wrap_err("Failed to store grocery list")?;

    Ok(Json(list))
}

#[axum_macros::debug_handler]
async fn get_grocery_list(
    State(state): State<AppState>,
    Path(week_start_date): Path<NaiveDate>,
) -> ResponseResult<Json<GroceryList>> {
    GroceryList::get_by_week(state.db(), week_start_date)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::not_found("Grocery list"))
}
