use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::run_workflow;
use crate::error::{InventoryError, Result};
use crate::models::{
    optional, required, MaintenanceAction, MaintenanceRequest, NewMaintenanceRequest,
};
use crate::observability::WorkflowMetrics;
use crate::store::RecordStore;
use crate::workflows::maintenance::apply;
use crate::workflows::{MaintenanceTransition, TransitionInput};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceRequest {
    pub user_id: Option<String>,
    pub item_id: Option<String>,
    pub issue_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub action: Option<String>,
    pub request_id: Option<String>,
    pub technician_id: Option<String>,
    pub resolution_details: Option<String>,
    pub is_repaired: Option<bool>,
    pub discard_reason: Option<String>,
}

pub struct MaintenanceHandler {
    store: Arc<dyn RecordStore>,
    metrics: Arc<WorkflowMetrics>,
}

impl MaintenanceHandler {
    pub fn new(store: Arc<dyn RecordStore>, metrics: Arc<WorkflowMetrics>) -> Self {
        Self { store, metrics }
    }

    pub async fn create(&self, request: CreateMaintenanceRequest) -> Result<MaintenanceRequest> {
        run_workflow("create_maintenance_request", &self.metrics, async {
            let new_request = NewMaintenanceRequest {
                user_id: required(request.user_id, "userId")?,
                item_id: required(request.item_id, "itemId")?,
                issue_description: required(request.issue_description, "issueDescription")?,
            };

            if self.store.find_inventory_item(&new_request.item_id).await?.is_none() {
                return Err(InventoryError::not_found("InventoryItem", &new_request.item_id));
            }
            if self.store.find_user(&new_request.user_id).await?.is_none() {
                return Err(InventoryError::not_found("User", &new_request.user_id));
            }

            let request = new_request.into_request(Utc::now());
            let request = self.store.insert_maintenance_request(&request).await?;

            self.metrics.record_created();
            info!(request_id = %request.id, item_id = %request.item_id, "Maintenance request created");
            Ok(request)
        })
        .await
    }

    /// Drive a request through its lifecycle. The action is validated before
    /// the store is consulted.
    pub async fn transition(&self, request: TransitionRequest) -> Result<MaintenanceRequest> {
        run_workflow("transition_maintenance_request", &self.metrics, async {
            let action: MaintenanceAction = required(request.action, "action")?.parse()?;
            let transition = MaintenanceTransition::from_action(
                action,
                TransitionInput {
                    technician_id: optional(request.technician_id),
                    resolution_details: optional(request.resolution_details),
                    is_repaired: request.is_repaired,
                    discard_reason: optional(request.discard_reason),
                },
            )?;
            let request_id = required(request.request_id, "requestId")?;

            let current = self
                .store
                .find_maintenance_request(&request_id)
                .await?
                .ok_or_else(|| InventoryError::not_found("MaintenanceRequest", &request_id))?;

            let next = apply(&current, &transition, Utc::now())?;
            if !self
                .store
                .save_maintenance_transition(&next, current.status)
                .await?
            {
                let from = self
                    .store
                    .find_maintenance_request(&request_id)
                    .await?
                    .map(|r| r.status)
                    .unwrap_or(current.status);
                return Err(InventoryError::IllegalTransition {
                    from: from.to_string(),
                    action: action.to_string(),
                });
            }

            self.metrics.record_transition();
            info!(
                request_id = %next.id,
                from = %current.status,
                to = %next.status,
                "Maintenance request transitioned"
            );
            Ok(next)
        })
        .await
    }

    pub async fn list(&self) -> Result<Vec<MaintenanceRequest>> {
        run_workflow("list_maintenance_requests", &self.metrics, self.store.list_maintenance_requests()).await
    }
}
