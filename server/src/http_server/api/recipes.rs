use axum::{extract::State, routing::get, Router};
use color_eyre::eyre::Context as _;
use db::cooking::{
    DietaryRestriction, FilterMode, MealType, Recipe, RecipeFilter, RecipeInput,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    http_server::{errors::ServerError, ResponseResult},
    AppState,
};

use super::{
    extract::{Json, Path, Query},
    Message,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route(
            "/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

/// Query string for `GET /recipes`. Restrictions arrive comma separated.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecipeQuery {
    dietary_restrictions: Option<String>,
    filter_mode: Option<FilterMode>,
    meal_type: Option<MealType>,
    search: Option<String>,
}

impl TryFrom<RecipeQuery> for RecipeFilter {
    type Error = ServerError;

    fn try_from(query: RecipeQuery) -> Result<Self, Self::Error> {
        let dietary_restrictions = query
            .dietary_restrictions
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse::<DietaryRestriction>()
                    .map_err(ServerError::bad_request)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RecipeFilter {
            dietary_restrictions,
            filter_mode: query.filter_mode.unwrap_or_default(),
            meal_type: query.meal_type,
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

pub(crate) fn validate_recipe(input: &RecipeInput) -> Result<(), ServerError> {
    if input.name.trim().is_empty() {
        return Err(ServerError::bad_request("Recipe name must not be empty"));
    }
    if input.servings <= 0 {
        return Err(ServerError::bad_request("Servings must be greater than 0"));
    }

    Ok(())
}

#[axum_macros::debug_handler]
async fn create_recipe(
    State(state): State<AppState>,
    Json(input): Json<RecipeInput>,
) -> ResponseResult<Json<Recipe>> {
    validate_recipe(&input)?;

    let recipe = Recipe::create(state.db(), &input)
        .await
        .wrap_err("Failed to create recipe")?;
    tracing::info!(recipe_id = %recipe.recipe_id, name = %recipe.name, "Created recipe");

    Ok(Json(recipe))
}

#[axum_macros::debug_handler]
async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<RecipeQuery>,
) -> ResponseResult<Json<Vec<Recipe>>> {
    let filter = RecipeFilter::try_from(query)?;

    Ok(Json(Recipe::list(state.db(), &filter).await?))
}

#[axum_macros::debug_handler]
async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<Recipe>> {
    Recipe::get_by_id(state.db(), id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::not_found("Recipe"))
}

#[axum_macros::debug_handler]
async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<RecipeInput>,
) -> ResponseResult<Json<Recipe>> {
    validate_recipe(&input)?;

    Recipe::update(state.db(), id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::not_found("Recipe"))
}

#[axum_macros::debug_handler]
async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<Message>> {
    if Recipe::delete(state.db(), id).await? {
        Ok(Message::json("Recipe deleted successfully"))
    } else {
        Err(ServerError::not_found("Recipe"))
    }
}
