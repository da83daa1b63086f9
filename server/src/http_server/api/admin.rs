use axum::{routing::get, Router};
use serde::Serialize;

use crate::{
    http_server::{auth::AdminUser, ResponseResult},
    AppState,
};

use super::extract::Json;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/verify", get(verify))
}

#[derive(Debug, Serialize)]
struct Verified {
    valid: bool,
}

#[axum_macros::debug_handler(state = AppState)]
async fn verify(_admin: AdminUser) -> ResponseResult<Json<Verified>> {
    Ok(Json(Verified { valid: true }))
}
