use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use crate::handlers::DecideIssuanceRequest;
use crate::http::response::{body, created, ok, ApiResult};
use crate::http::AppState;
use crate::models::{IssuanceForm, IssuanceRequest};

pub async fn create_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IssuanceForm>, JsonRejection>,
) -> ApiResult<IssuanceRequest> {
    let request = state.issuance.create(body(payload)?).await?;
    created("Issuance request created successfully", request)
}

pub async fn list_incharge_requests(
    State(state): State<Arc<AppState>>,
    Path(gov_id): Path<String>,
) -> ApiResult<Vec<IssuanceRequest>> {
    let requests = state.issuance.list_for_incharge(&gov_id).await?;
    ok("Issuance requests fetched", requests)
}

pub async fn decide_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DecideIssuanceRequest>, JsonRejection>,
) -> ApiResult<IssuanceRequest> {
    let request = state.issuance.decide(body(payload)?).await?;
    ok("Issuance request updated successfully", request)
}
