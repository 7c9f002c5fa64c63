use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{info, warn};

use crate::error::InventoryError;

/// Workflow outcome counters
#[derive(Debug, Default)]
pub struct WorkflowMetrics {
    pub records_created: AtomicU64,
    pub transitions_applied: AtomicU64,
    pub transitions_rejected: AtomicU64,
    pub store_errors: AtomicU64,
}

impl WorkflowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&self) {
        self.records_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transition(&self) {
        self.transitions_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_transition(&self) {
        self.transitions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
        warn!("Record store operation failed");
    }

    /// Count `err` against the matching counter.
    pub fn observe_error(&self, err: &InventoryError) {
        match err {
            InventoryError::IllegalTransition { .. } => self.record_rejected_transition(),
            InventoryError::Store(_) => self.record_store_error(),
            _ => {}
        }
    }

    pub fn get_stats(&self) -> WorkflowStats {
        WorkflowStats {
            records_created: self.records_created.load(Ordering::Relaxed),
            transitions_applied: self.transitions_applied.load(Ordering::Relaxed),
            transitions_rejected: self.transitions_rejected.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Workflow metrics: created={}, transitions={}, rejected_transitions={}, store_errors={}",
            stats.records_created,
            stats.transitions_applied,
            stats.transitions_rejected,
            stats.store_errors
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStats {
    pub records_created: u64,
    pub transitions_applied: u64,
    pub transitions_rejected: u64,
    pub store_errors: u64,
}

/// Create correlated spans for one workflow operation
pub fn create_workflow_span(workflow: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "workflow",
        workflow.name = workflow,
        correlation.id = correlation_id,
    )
}

/// Time an operation and log its duration
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_counted_by_kind() {
        let metrics = WorkflowMetrics::new();
        metrics.record_created();
        metrics.record_transition();
        metrics.observe_error(&InventoryError::IllegalTransition {
            from: "COMPLETED".into(),
            action: "approve".into(),
        });
        metrics.observe_error(&InventoryError::Store(sqlx::Error::PoolTimedOut));
        metrics.observe_error(&InventoryError::invalid_input("itemId is required"));

        assert_eq!(
            metrics.get_stats(),
            WorkflowStats {
                records_created: 1,
                transitions_applied: 1,
                transitions_rejected: 1,
                store_errors: 1,
            }
        );
    }
}
