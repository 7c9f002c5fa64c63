use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::run_workflow;
use crate::error::{InventoryError, Result};
use crate::models::{
    optional, required, IssuanceDecision, IssuanceForm, IssuanceRequest, IssuanceStatus,
    NewIssuanceRequest, Role, User,
};
use crate::observability::WorkflowMetrics;
use crate::store::RecordStore;
use crate::workflows::issuance::apply_decision;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideIssuanceRequest {
    /// Government ID of the deciding incharge.
    pub incharge_id: Option<String>,
    pub request_id: Option<String>,
    pub decision: Option<String>,
    pub note: Option<String>,
}

/// Routes issuance requests to the incharge of the requested location and
/// records their decisions.
pub struct IssuanceHandler {
    store: Arc<dyn RecordStore>,
    metrics: Arc<WorkflowMetrics>,
}

impl IssuanceHandler {
    pub fn new(store: Arc<dyn RecordStore>, metrics: Arc<WorkflowMetrics>) -> Self {
        Self { store, metrics }
    }

    async fn find_incharge(&self, gov_id: &str) -> Result<User> {
        match self.store.find_user_by_gov_id(gov_id).await? {
            Some(user) if user.role == Role::Incharge => Ok(user),
            _ => Err(InventoryError::not_found("Incharge", gov_id)),
        }
    }

    pub async fn create(&self, form: IssuanceForm) -> Result<IssuanceRequest> {
        run_workflow("create_issuance_request", &self.metrics, async {
            let new_request = NewIssuanceRequest::try_from(form)?;

            let requester = self
                .store
                .find_user_by_gov_id(&new_request.requester_gov_id)
                .await?
                .ok_or_else(|| InventoryError::not_found("User", &new_request.requester_gov_id))?;

            let incharge = self
                .store
                .find_incharge_at(&new_request.location)
                .await?
                .ok_or_else(|| InventoryError::not_found("Incharge", &new_request.location))?;

            let request = new_request.into_request(&requester.id, &incharge.id, Utc::now());
            let request = self.store.insert_issuance_request(&request).await?;

            self.metrics.record_created();
            info!(
                request_id = %request.id,
                incharge_id = %incharge.id,
                priority = request.priority_level.as_str(),
                "Issuance request routed"
            );
            Ok(request)
        })
        .await
    }

    pub async fn decide(&self, request: DecideIssuanceRequest) -> Result<IssuanceRequest> {
        run_workflow("decide_issuance_request", &self.metrics, async {
            let decision: IssuanceDecision = required(request.decision, "decision")?.parse()?;
            let incharge_gov_id = required(request.incharge_id, "inchargeId")?;
            let request_id = required(request.request_id, "requestId")?;

            let incharge = self.find_incharge(&incharge_gov_id).await?;
            let current = self
                .store
                .find_issuance_request(&request_id)
                .await?
                .ok_or_else(|| InventoryError::not_found("IssuanceRequest", &request_id))?;

            if current.incharge_id != incharge.id {
                return Err(InventoryError::PermissionDenied(
                    "This request is routed to a different incharge".to_string(),
                ));
            }

            let next = apply_decision(&current, decision, optional(request.note), Utc::now())?;
            if !self
                .store
                .save_issuance_decision(&next, IssuanceStatus::Pending)
                .await?
            {
                let from = self
                    .store
                    .find_issuance_request(&request_id)
                    .await?
                    .map(|r| r.status)
                    .unwrap_or(current.status);
                return Err(InventoryError::IllegalTransition {
                    from: from.to_string(),
                    action: decision.as_str().to_string(),
                });
            }

            self.metrics.record_transition();
            info!(request_id = %next.id, status = %next.status, "Issuance request decided");
            Ok(next)
        })
        .await
    }

    /// The incharge's queue, newest first.
    pub async fn list_for_incharge(&self, gov_id: &str) -> Result<Vec<IssuanceRequest>> {
        let incharge = self.find_incharge(gov_id).await?;
        self.store.list_issuance_requests_for_incharge(&incharge.id).await
    }
}
