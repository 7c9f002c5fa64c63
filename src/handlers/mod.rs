//! Workflow handlers.
//!
//! Each handler validates its input, consults the injected [`RecordStore`]
//! and applies the lifecycle rules from [`crate::workflows`]. Handlers know
//! nothing about HTTP; the router maps their `InventoryError`s onto responses.
//!
//! [`RecordStore`]: crate::store::RecordStore

pub mod inventory;
pub mod issuance;
pub mod maintenance;
pub mod registration;

pub use inventory::{CreateItemRequest, DeleteItemRequest, InventoryHandler, UpdateItemRequest};
pub use issuance::{DecideIssuanceRequest, IssuanceHandler};
pub use maintenance::{CreateMaintenanceRequest, MaintenanceHandler, TransitionRequest};
pub use registration::RegistrationHandler;

use std::future::Future;
use tracing::Instrument;

use crate::error::Result;
use crate::observability::{create_workflow_span, OperationTimer, WorkflowMetrics};
use crate::telemetry::generate_correlation_id;

/// Run one handler operation inside a correlated workflow span, timing it and
/// counting its failure (if any) against `metrics`.
pub(crate) async fn run_workflow<T, F>(
    workflow: &'static str,
    metrics: &WorkflowMetrics,
    operation: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let correlation_id = generate_correlation_id();
    let span = create_workflow_span(workflow, &correlation_id);
    let timer = OperationTimer::new(workflow);

    let result = operation.instrument(span).await;

    timer.finish();
    if let Err(e) = &result {
        metrics.observe_error(e);
    }
    result
}
