// Station Inventory Library - police department asset tracking backend
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod models;
pub mod observability;
pub mod shutdown;
pub mod store;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::StationInventoryConfig;
pub use error::{InventoryError, Result};
pub use http::{build_router, AppState};
pub use observability::{create_workflow_span, OperationTimer, WorkflowMetrics};
pub use store::{RecordStore, SqliteStore};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
