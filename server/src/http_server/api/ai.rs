use axum::{extract::State, routing::post, Router};
use chrono::NaiveDate;
use db::{
    cooking::{FilterMode, GroceryList, MealType},
    family_members::FamilyMember,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    http_server::{errors::ServerError, ResponseResult},
    recommendations::{ask, family_recommendation_prompt, grocery_optimization_prompt},
    AppState,
};

use super::extract::{Json, Query};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/recipe-recommendations", post(recipe_recommendations))
        .route("/grocery-optimization", post(grocery_optimization))
}

#[derive(Debug, Deserialize)]
struct RecommendationRequest {
    #[serde(default)]
    family_member_ids: Vec<Uuid>,
    meal_type: MealType,
    #[serde(default)]
    filter_mode: FilterMode,
}

#[derive(Debug, Serialize)]
struct Recommendations {
    recommendations: String,
}

#[derive(Debug, Deserialize)]
struct OptimizationQuery {
    week_start_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct OptimizationSuggestions {
    optimization_suggestions: String,
}

#[axum_macros::debug_handler]
async fn recipe_recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> ResponseResult<Json<Recommendations>> {
    let members = FamilyMember::get_by_ids(state.db(), &request.family_member_ids).await?;

    let prompt = family_recommendation_prompt(&members, request.meal_type, request.filter_mode);
    let recommendations = ask(&state.http, state.open_ai.as_ref(), prompt).await;

    Ok(Json(Recommendations { recommendations }))
}

#[axum_macros::debug_handler]
async fn grocery_optimization(
    State(state): State<AppState>,
    Query(query): Query<OptimizationQuery>,
) -> ResponseResult<Json<OptimizationSuggestions>> {
    let list = GroceryList::get_by_week(state.db(), query.week_start_date)
        .await?
        .ok_or_else(|| ServerError::not_found("Grocery list for this week"))?;

    let prompt = grocery_optimization_prompt(&list);
    let optimization_suggestions = ask(&state.http, state.open_ai.as_ref(), prompt).await;

    Ok(Json(OptimizationSuggestions {
        optimization_suggestions,
    }))
}
