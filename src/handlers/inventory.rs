use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::run_workflow;
use crate::error::{InventoryError, Result};
use crate::models::{
    required, CategoryDetails, InventoryItem, InventoryRecord, InventoryUpdate, ItemData,
    ItemPatch, NewInventoryItem, User,
};
use crate::observability::WorkflowMetrics;
use crate::store::RecordStore;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub user_id: Option<String>,
    pub item_data: Option<ItemData>,
    #[serde(default)]
    pub category_specific_data: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub user_id: Option<String>,
    pub item_id: Option<String>,
    #[serde(default)]
    pub fields_to_update: ItemPatch,
    pub child_updates: Option<CategoryDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemRequest {
    pub user_id: Option<String>,
    pub item_id: Option<String>,
}

/// Admin-only inventory mutations plus the read paths used by the QR scanner.
pub struct InventoryHandler {
    store: Arc<dyn RecordStore>,
    metrics: Arc<WorkflowMetrics>,
}

impl InventoryHandler {
    pub fn new(store: Arc<dyn RecordStore>, metrics: Arc<WorkflowMetrics>) -> Self {
        Self { store, metrics }
    }

    async fn require_admin(&self, user_id: &str) -> Result<User> {
        match self.store.find_user(user_id).await? {
            Some(user) if user.is_admin() => Ok(user),
            _ => {
                warn!(user_id, "Inventory mutation attempted by a non-admin");
                Err(InventoryError::PermissionDenied(
                    "Only admins can modify inventory".to_string(),
                ))
            }
        }
    }

    pub async fn create(&self, request: CreateItemRequest) -> Result<InventoryRecord> {
        run_workflow("create_inventory_item", &self.metrics, async {
            let user_id = required(request.user_id, "userId")?;
            let item_data = request
                .item_data
                .ok_or_else(|| InventoryError::invalid_input("itemData is required"))?;
            let new_item = NewInventoryItem::from_form(item_data, request.category_specific_data)?;

            let admin = self.require_admin(&user_id).await?;
            let record = self.store.insert_inventory_item(&new_item, &admin.id).await?;

            self.metrics.record_created();
            info!(
                item_id = %record.item.item_id,
                category = %record.item.category,
                "Inventory item created"
            );
            Ok(record)
        })
        .await
    }

    pub async fn update(&self, request: UpdateItemRequest) -> Result<InventoryRecord> {
        run_workflow("update_inventory_item", &self.metrics, async {
            let user_id = required(request.user_id, "userId")?;
            let item_id = required(request.item_id, "itemId")?;
            request.fields_to_update.validate()?;
            if request.fields_to_update.is_empty() && request.child_updates.is_none() {
                return Err(InventoryError::invalid_input(
                    "fieldsToUpdate or childUpdates must name at least one field",
                ));
            }

            self.require_admin(&user_id).await?;

            let update = InventoryUpdate {
                fields: request.fields_to_update,
                extension: request.child_updates,
            };
            let record = self
                .store
                .update_inventory_item(&item_id, &update)
                .await?
                .ok_or_else(|| InventoryError::not_found("InventoryItem", &item_id))?;

            info!(item_id = %item_id, "Inventory item updated");
            Ok(record)
        })
        .await
    }

    pub async fn delete(&self, request: DeleteItemRequest) -> Result<()> {
        run_workflow("delete_inventory_item", &self.metrics, async {
            let user_id = required(request.user_id, "userId")?;
            let item_id = required(request.item_id, "itemId")?;

            self.require_admin(&user_id).await?;

            let deleted = self
                .store
                .delete_inventory_item(&item_id)
                .await
                .map_err(|e| match e {
                    InventoryError::Conflict(_) => InventoryError::Conflict(format!(
                        "Item {item_id} has maintenance history and cannot be deleted"
                    )),
                    other => other,
                })?;
            if !deleted {
                return Err(InventoryError::not_found("InventoryItem", &item_id));
            }

            info!(item_id = %item_id, "Inventory item deleted");
            Ok(())
        })
        .await
    }

    pub async fn get(&self, item_id: &str) -> Result<InventoryRecord> {
        self.store
            .find_inventory_item(item_id)
            .await?
            .ok_or_else(|| InventoryError::not_found("InventoryItem", item_id))
    }

    pub async fn list(&self) -> Result<Vec<InventoryItem>> {
        run_workflow("list_inventory_items", &self.metrics, self.store.list_inventory_items()).await
    }
}
