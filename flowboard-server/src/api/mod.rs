//! API Module
//!
//! HTTP layer of the server: JSON endpoints under `/api` and the HTML
//! dashboard at the root. Handlers only ever read the state store.

pub mod dashboard;
pub mod error;
pub mod health;
pub mod runs;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::StateStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StateStore>,
}

/// Create the main API router with all endpoints
///
/// Fixed paths win over captures: an owner literally named `health` has no
/// dashboard page, and owners named `runs` or `state` have no `/api/{owner}`
/// listing. Their repositories stay reachable through the longer scopes.
pub fn create_router(store: Arc<StateStore>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // JSON endpoints
        .route("/api/state", get(runs::list_states))
        .route("/api/runs", get(runs::list_runs))
        .route("/api/{owner}", get(runs::list_owner_runs))
        .route("/api/{owner}/{repo}", get(runs::list_repo_runs))
        .route("/api/{owner}/{repo}/{workflow}", get(runs::list_workflow_runs))
        // Dashboard
        .route("/", get(dashboard::index))
        .route("/{owner}", get(dashboard::owner))
        .route("/{owner}/{repo}", get(dashboard::repository))
        .route("/{owner}/{repo}/{workflow}", get(dashboard::workflow))
        // Add state and middleware
        .with_state(AppState { store })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
