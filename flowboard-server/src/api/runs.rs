//! Run API Handlers
//!
//! JSON endpoints over the cached repository states.

use axum::{
    Json,
    extract::{Path, State},
};
use flowboard_core::domain::repository::RepositoryState;
use flowboard_core::domain::run::WorkflowRun;

use crate::api::AppState;
use crate::api::error::ApiResult;

/// Concatenates the runs of `states`, keeping repository order
fn flatten(states: Vec<RepositoryState>) -> Vec<WorkflowRun> {
    states.into_iter().flat_map(|state| state.runs).collect()
}

/// GET /api/state
/// Raw cached states with their snapshot timestamps
pub async fn list_states(State(state): State<AppState>) -> ApiResult<Json<Vec<RepositoryState>>> {
    Ok(Json(state.store.filter(None, None, None)?))
}

/// GET /api/runs
pub async fn list_runs(State(state): State<AppState>) -> ApiResult<Json<Vec<WorkflowRun>>> {
    let states = state.store.filter(None, None, None)?;
    Ok(Json(flatten(states)))
}

/// GET /api/{owner}
pub async fn list_owner_runs(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> ApiResult<Json<Vec<WorkflowRun>>> {
    tracing::debug!("Listing runs of {}", owner);
    let states = state.store.filter(Some(&owner), None, None)?;
    Ok(Json(flatten(states)))
}

/// GET /api/{owner}/{repo}
pub async fn list_repo_runs(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Json<Vec<WorkflowRun>>> {
    tracing::debug!("Listing runs of {}/{}", owner, repo);
    let states = state.store.filter(Some(&owner), Some(&repo), None)?;
    Ok(Json(flatten(states)))
}

/// GET /api/{owner}/{repo}/{workflow}
pub async fn list_workflow_runs(
    State(state): State<AppState>,
    Path((owner, repo, workflow)): Path<(String, String, String)>,
) -> ApiResult<Json<Vec<WorkflowRun>>> {
    tracing::debug!("Listing runs of workflow '{}' in {}/{}", workflow, owner, repo);
    let states = state
        .store
        .filter(Some(&owner), Some(&repo), Some(&workflow))?;
    Ok(Json(flatten(states)))
}
