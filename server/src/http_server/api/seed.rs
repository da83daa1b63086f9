use axum::extract::State;

use crate::{
    http_server::{auth::AdminUser, ResponseResult},
    seed::reseed_recipes,
    AppState,
};

use super::{extract::Json, Message};

/// Replaces every recipe with the sample set.
#[axum_macros::debug_handler]
pub(crate) async fn seed_recipes(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ResponseResult<Json<Message>> {
    let recipes = reseed_recipes(state.db()).await?;

    Ok(Message::json(format!(
        "Seeded {} brain balance recipes successfully",
        recipes.len()
    )))
}
