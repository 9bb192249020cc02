//! Dashboard handlers
//!
//! Server-rendered HTML views of the cached states.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::Html,
};
use chrono::Utc;
use flowboard_core::domain::repository::RepositoryState;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::views::DashboardView;

/// Render a template, mapping failures to an internal error
fn render_template<T: Template>(template: T) -> ApiResult<Html<String>> {
    template
        .render()
        .map(Html)
        .map_err(|e| ApiError::InternalError(format!("Template rendering failed: {}", e)))
}

fn render_states(title: String, states: &[RepositoryState]) -> ApiResult<Html<String>> {
    render_template(DashboardView::new(title, states, Utc::now()))
}

/// GET /
pub async fn index(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let states = state.store.filter(None, None, None)?;
    render_states("Workflow runs".to_string(), &states)
}

/// GET /{owner}
pub async fn owner(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> ApiResult<Html<String>> {
    let states = state.store.filter(Some(&owner), None, None)?;
    render_states(owner, &states)
}

/// GET /{owner}/{repo}
pub async fn repository(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Html<String>> {
    let states = state.store.filter(Some(&owner), Some(&repo), None)?;
    render_states(format!("{}/{}", owner, repo), &states)
}

/// GET /{owner}/{repo}/{workflow}
pub async fn workflow(
    State(state): State<AppState>,
    Path((owner, repo, workflow)): Path<(String, String, String)>,
) -> ApiResult<Html<String>> {
    let states = state
        .store
        .filter(Some(&owner), Some(&repo), Some(&workflow))?;
    render_states(format!("{}/{} {}", owner, repo, workflow), &states)
}
