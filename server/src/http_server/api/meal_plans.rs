use axum::{
    extract::State,
    routing::{delete, get},
    Router,
};
use chrono::NaiveDate;
use db::{
    cooking::{MealPlanEntry, MealPlanEntryInput, Recipe},
    family_members::FamilyMember,
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
        .route("/", get(list_entries).post(create_entry))
        .route("/{id}", delete(delete_entry))
}

#[derive(Debug, Deserialize)]
struct MealPlanQuery {
    week_start_date: Option<NaiveDate>,
    family_member_id: Option<Uuid>,
}

#[axum_macros::debug_handler]
async fn create_entry(
    State(state): State<AppState>,
    Json(input): Json<MealPlanEntryInput>,
) -> ResponseResult<Json<MealPlanEntry>> {
    if input.servings <= 0 {
        return Err(ServerError::bad_request("Servings must be greater than 0"));
    }

    if FamilyMember::get_by_id(state.db(), input.family_member_id)
        .await?
        .is_none()
    {
        return Err(ServerError::not_found("Family member"));
    }
    if Recipe::get_by_id(state.db(), input.recipe_id)
        .await?
        .is_none()
    {
        return Err(ServerError::not_found("Recipe"));
    }

    let entry = MealPlanEntry::create(state.db(), &input).await?;
    tracing::info!(
        meal_plan_entry_id = %entry.meal_plan_entry_id,
        week_start_date = %entry.week_start_date,
        "Planned meal"
    );

    Ok(Json(entry))
}

#[axum_macros::debug_handler]
async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<MealPlanQuery>,
) -> ResponseResult<Json<Vec<MealPlanEntry>>> {
    let entries =
        MealPlanEntry::list(state.db(), query.week_start_date, query.family_member_id).await?;

    Ok(Json(entries))
}

#[axum_macros::debug_handler]
async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<Message>> {
    if MealPlanEntry::delete(state.db(), id).await? {
        Ok(Message::json("Meal plan deleted successfully"))
    } else {
        Err(ServerError::not_found("Meal plan"))
    }
}
