//! Health Check API Handler
//!
//! Simple health check endpoint for monitoring.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// GET /health
/// Health check endpoint, reports the number of cached repositories
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let repositories = state.store.len()?;
    Ok(Json(json!({ "status": "OK", "repositories": repositories })))
}
