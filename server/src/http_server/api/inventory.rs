use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use db::cooking::{InventoryFilter, InventoryItem, InventoryItemInput, InventoryItemUpdate};
use uuid::Uuid;

use crate::{
    barcode::{fetch_open_food_facts, validate_barcode, ProductInfo},
    http_server::{
        errors::{ServerError, WithStatus as _},
        ResponseResult,
    },
    planner::{check_availability, Availability},
    AppState,
};

use super::{
    extract::{Json, Path, Query},
    Message,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/check-availability", post(check_ingredient_availability))
        .route("/barcode/{barcode}", post(lookup_barcode))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
}

fn validate_quantity(quantity: f64) -> Result<(), ServerError> {
    if quantity.is_finite() && quantity >= 0.0 {
        Ok(())
    } else {
        Err(ServerError::bad_request(
            "Quantity must be a non-negative number",
        ))
    }
}

#[axum_macros::debug_handler]
async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<InventoryItemInput>,
) -> ResponseResult<Json<InventoryItem>> {
    if input.name.trim().is_empty() {
        return Err(ServerError::bad_request("Name must not be empty"));
    }
    validate_quantity(input.quantity)?;

    let item = InventoryItem::create(state.db(), &input).await?;
    tracing::info!(inventory_item_id = %item.inventory_item_id, name = %item.name, "Added inventory item");

    Ok(Json(item))
}

#[axum_macros::debug_handler]
async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<InventoryFilter>,
) -> ResponseResult<Json<Vec<InventoryItem>>> {
    Ok(Json(InventoryItem::list(state.db(), &filter).await?))
}

#[axum_macros::debug_handler]
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<InventoryItem>> {
    InventoryItem::get_by_id(state.db(), id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::not_found("Inventory item"))
}

#[axum_macros::debug_handler]
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<InventoryItemUpdate>,
) -> ResponseResult<Json<InventoryItem>> {
    if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(ServerError::bad_request("Name must not be empty"));
    }
    if let Some(quantity) = update.quantity {
        validate_quantity(quantity)?;
    }

    InventoryItem::update(state.db(), id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::not_found("Inventory item"))
}

#[axum_macros::debug_handler]
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<Json<Message>> {
    if InventoryItem::delete(state.db(), id).await? {
        Ok(Message::json("Inventory item deleted successfully"))
    } else {
        Err(ServerError::not_found("Inventory item"))
    }
}

#[axum_macros::debug_handler]
async fn check_ingredient_availability(
    State(state): State<AppState>,
    Json(names): Json<Vec<String>>,
) -> ResponseResult<Json<BTreeMap<String, Availability>>> {
    let on_hand = InventoryItem::list_in_stock(state.db()).await?;

    let availability = names
        .into_iter()
        .map(|name| {
            let result = check_availability(&name, &on_hand);
            (name, result)
        })
        .collect();

    Ok(Json(availability))
}

/// Inventory first, then Open Food Facts, then a placeholder to fill in by hand.
#[axum_macros::debug_handler]
async fn lookup_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ResponseResult<Json<ProductInfo>> {
    let barcode = validate_barcode(&barcode).with_status(StatusCode::BAD_REQUEST)?;

    if let Some(item) = InventoryItem::find_by_barcode(state.db(), barcode).await? {
        tracing::info!(barcode, "Barcode found in inventory");
        return Ok(Json(ProductInfo::from_inventory(&item, barcode)));
    }

    match fetch_open_food_facts(&state.http, &state.open_food_facts, barcode).await {
        Ok(Some(product)) => return Ok(Json(product)),
        Ok(None) => tracing::info!(barcode, "Barcode unknown to Open Food Facts"),
        Err(e) => tracing::warn!(barcode, error = ?e, "Open Food Facts lookup failed"),
    }

    Ok(Json(ProductInfo::manual_entry(barcode)))
}
