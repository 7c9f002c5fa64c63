use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::handlers::{CreateItemRequest, DeleteItemRequest, UpdateItemRequest};
use crate::http::response::{body, created, ok, ApiResponse, ApiResult};
use crate::http::AppState;
use crate::models::{InventoryItem, InventoryRecord};

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> ApiResult<InventoryRecord> {
    let record = state.inventory.create(body(payload)?).await?;
    created("Inventory item added successfully", record)
}

pub async fn update_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> ApiResult<InventoryRecord> {
    let record = state.inventory.update(body(payload)?).await?;
    ok("Inventory item updated successfully", record)
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeleteItemRequest>, JsonRejection>,
) -> ApiResult<()> {
    state.inventory.delete(body(payload)?).await?;
    Ok((StatusCode::OK, Json(ApiResponse::message("Inventory item deleted successfully"))))
}

pub async fn list_items(State(state): State<Arc<AppState>>) -> ApiResult<Vec<InventoryItem>> {
    let items = state.inventory.list().await?;
    ok("Inventory items fetched", items)
}

/// Lookup by the item ID encoded in the item's QR label.
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> ApiResult<InventoryRecord> {
    let record = state.inventory.get(&item_id).await?;
    ok("Inventory item found", record)
}
