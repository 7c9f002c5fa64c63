use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::handlers::{CreateMaintenanceRequest, TransitionRequest};
use crate::http::response::{body, created, ok, ApiResult};
use crate::http::AppState;
use crate::models::MaintenanceRequest;

pub async fn create_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateMaintenanceRequest>, JsonRejection>,
) -> ApiResult<MaintenanceRequest> {
    let request = state.maintenance.create(body(payload)?).await?;
    created("Maintenance request created successfully", request)
}

pub async fn list_requests(State(state): State<Arc<AppState>>) -> ApiResult<Vec<MaintenanceRequest>> {
    let requests = state.maintenance.list().await?;
    ok("Maintenance requests fetched", requests)
}

pub async fn transition_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransitionRequest>, JsonRejection>,
) -> ApiResult<MaintenanceRequest> {
    let request = state.maintenance.transition(body(payload)?).await?;
    ok("Maintenance request updated successfully", request)
}
