use tracing::{info, warn};

use crate::observability::WorkflowMetrics;
use crate::store::SqliteStore;

/// Resolves on the first SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}

/// Flush counters and close the store once the server has drained.
pub async fn shutdown_all_services(store: &SqliteStore, metrics: &WorkflowMetrics) {
    info!("Initiating graceful shutdown of all services...");
    metrics.log_stats();
    store.shutdown().await;
    info!("Graceful shutdown completed successfully");
}
