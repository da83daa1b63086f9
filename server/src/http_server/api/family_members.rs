use axum::{extract::State, routing::get, Router};
use db::family_members::{FamilyMember, FamilyMemberInput};
use uuid::Uuid;

use crate::{
    http_server::{errors::ServerError, ResponseResult},
    AppState,
};

use super::{
    extract::{Json, Path},
    Message,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route(
            "/{id}",
            get(get_member).put(update_member).delete(delete_member),
        )
}

fn validate(input: &FamilyMemberInput) -> Result<(), ServerError> {
    if input.name.trim().is_empty() {
        return Err(ServerError::bad_request("Name must not be empty"));
    }

    Ok(())
}

#[axum_macros::debug_handler]
async fn create_member(
    State(state): State<AppState>,
    Json(input): Json<FamilyMemberInput>,
) -> ResponseResult<Json<FamilyMember>> {
    validate(&input)?;

    let member = FamilyMember::create(state.db(), &input).await?;
    tracing::info!(family_member_id = %member.family_member_id, "Created family member");

    Ok(Json(member))
}

#[axum_macros::debug_handler]
async fn list_members(State(state): State<AppState>) -> ResponseResult<Json<Vec<FamilyMember>>> {
    Ok(Json(FamilyMember::list(state.db()).await?))
}

#[axum_macros::debug_handler]
async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<FamilyMember>> {
    FamilyMember::get_by_id(state.db(), id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::not_found("Family member"))
}

#[axum_macros::debug_handler]
async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<FamilyMemberInput>,
) -> ResponseResult<Json<FamilyMember>> {
    validate(&input)?;

    FamilyMember::update(state.db(), id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::not_found("Family member"))
}

#[axum_macros::debug_handler]
async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<Message>> {
    if FamilyMember::delete(state.db(), id).await? {
        Ok(Message::json("Family member deleted successfully"))
    } else {
        Err(ServerError::not_found("Family member"))
    }
}
