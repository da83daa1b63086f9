use axum::{routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;

pub(crate) mod admin;
pub(crate) mod ai;
pub(crate) mod bugs;
pub(crate) mod extract;
pub(crate) mod family_members;
pub(crate) mod grocery;
pub(crate) mod inventory;
pub(crate) mod meal_plans;
pub(crate) mod recipes;
pub(crate) mod seed;
pub(crate) mod suggestions;

use extract::Json;

/// `{"message": ..}` body for actions with nothing else to return.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Message {
    pub message: String,
}

impl Message {
    pub(crate) fn json(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .nest("/family-members", family_members::router())
        .nest("/recipes/suggestions", suggestions::router())
        .nest("/recipes", recipes::router())
        .nest("/meal-plans", meal_plans::router())
        .merge(grocery::router())
        .nest("/inventory", inventory::router())
        .nest("/ai", ai::router())
        .nest("/bugs", bugs::router())
        .nest("/admin", admin::router())
        .route("/seed-recipes", post(seed::seed_recipes))
}
