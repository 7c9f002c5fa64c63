//! HTTP surface: the axum router over the workflow handlers.

pub mod response;
pub mod routes;

use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{InventoryHandler, IssuanceHandler, MaintenanceHandler, RegistrationHandler};
use crate::observability::WorkflowMetrics;
use crate::store::RecordStore;

/// Application state shared across routes
pub struct AppState {
    pub registration: RegistrationHandler,
    pub inventory: InventoryHandler,
    pub issuance: IssuanceHandler,
    pub maintenance: MaintenanceHandler,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, metrics: Arc<WorkflowMetrics>) -> Self {
        Self {
            registration: RegistrationHandler::new(store.clone(), metrics.clone()),
            inventory: InventoryHandler::new(store.clone(), metrics.clone()),
            issuance: IssuanceHandler::new(store.clone(), metrics.clone()),
            maintenance: MaintenanceHandler::new(store, metrics),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(routes::health_check))

        // Users
        .route("/api/users", post(routes::users::register))
        .route("/api/users/:id", get(routes::users::get_user))

        // Inventory
        .route(
            "/api/inventory",
            post(routes::inventory::create_item)
                .put(routes::inventory::update_item)
                .delete(routes::inventory::delete_item)
                .get(routes::inventory::list_items),
        )
        .route("/api/inventory/:item_id", get(routes::inventory::get_item))

        // Issuance
        .route(
            "/api/inventory/issuance/user/request",
            post(routes::issuance::create_request),
        )
        .route(
            "/api/inventory/issuance/incharge/:gov_id/requests",
            get(routes::issuance::list_incharge_requests),
        )
        .route(
            "/api/inventory/issuance/incharge/request",
            put(routes::issuance::decide_request),
        )

        // Maintenance
        .route(
            "/api/maintenance/request",
            post(routes::maintenance::create_request)
                .get(routes::maintenance::list_requests)
                .put(routes::maintenance::transition_request),
        )

        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
