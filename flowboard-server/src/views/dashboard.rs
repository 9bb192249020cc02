//! Dashboard view model

use askama::Template;
use chrono::{DateTime, Utc};
use flowboard_core::domain::repository::RepositoryState;
use flowboard_core::domain::run::WorkflowRun;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Link to the page of one workflow
#[derive(Debug, Clone)]
pub struct WorkflowLink {
    pub name: String,
    /// Percent-encoded path, rendered unescaped
    pub href: String,
}

/// One run row of a repository table
#[derive(Debug, Clone)]
pub struct RunRow {
    pub workflow_name: String,
    pub workflow_href: String,
    pub run_number: u64,
    pub html_url: String,
    pub status_class: String,
    pub outcome: String,
    pub branch: String,
    pub author: String,
    pub message: String,
    pub short_sha: String,
    pub commit_time: String,
    pub run_time: String,
    /// Merged `key: value` lines, sorted descending
    pub params: Vec<String>,
}

impl From<&WorkflowRun> for RunRow {
    fn from(run: &WorkflowRun) -> Self {
        let outcome = if run.conclusion.is_empty() {
            run.status.clone()
        } else {
            format!("{} / {}", run.status, run.conclusion)
        };

        let mut params: Vec<String> = run
            .parameters
            .as_ref()
            .map(|p| {
                p.merged()
                    .into_iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .collect()
            })
            .unwrap_or_default();
        params.sort_by(|a, b| b.cmp(a));

        Self {
            workflow_name: run.workflow_name.clone(),
            workflow_href: path(&[run.owner.as_str(), run.repo.as_str(), run.workflow_name.as_str()]),
            run_number: run.run_number,
            html_url: run.html_url.clone(),
            status_class: run.conclusion.clone(),
            outcome,
            branch: run.branch.clone(),
            author: run.commit_author.clone(),
            message: run.commit_title().to_string(),
            short_sha: run.short_sha().to_string(),
            commit_time: run.commit_time.as_ref().map(format_time).unwrap_or_default(),
            run_time: format_time(&run.run_started_at),
            params,
        }
    }
}

/// One repository section of the page
#[derive(Debug, Clone)]
pub struct RepositorySection {
    pub owner: String,
    pub name: String,
    pub owner_href: String,
    pub repo_href: String,
    pub updated_ago: String,
    pub updated_at: String,
    pub workflows: Vec<WorkflowLink>,
    /// Whether any run carries parameters
    pub with_params: bool,
    pub runs: Vec<RunRow>,
}

impl RepositorySection {
    pub fn new(state: &RepositoryState, now: DateTime<Utc>) -> Self {
        let owner = &state.id.owner;
        let name = &state.id.name;

        let workflows = state
            .workflow_names()
            .into_iter()
            .map(|workflow| WorkflowLink {
                name: workflow.to_string(),
                href: path(&[owner.as_str(), name.as_str(), workflow]),
            })
            .collect();

        let with_params = state
            .runs
            .iter()
            .any(|run| run.parameters.as_ref().is_some_and(|p| !p.is_empty()));

        Self {
            owner: owner.clone(),
            name: name.clone(),
            owner_href: path(&[owner.as_str()]),
            repo_href: path(&[owner.as_str(), name.as_str()]),
            updated_ago: format_elapsed(now - state.updated_at),
            updated_at: format_time(&state.updated_at),
            workflows,
            with_params,
            runs: state.runs.iter().map(RunRow::from).collect(),
        }
    }
}

/// Full dashboard page
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardView {
    pub title: String,
    pub repositories: Vec<RepositorySection>,
}

impl DashboardView {
    pub fn new(title: impl Into<String>, states: &[RepositoryState], now: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            repositories: states
                .iter()
                .map(|state| RepositorySection::new(state, now))
                .collect(),
        }
    }
}

/// Builds an absolute path from percent-encoded segments
fn path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| format!("/{}", utf8_percent_encode(s, NON_ALPHANUMERIC)))
        .collect()
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats an elapsed time with its two most significant units
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    let (days, hours, minutes, seconds) = (
        secs / 86_400,
        secs % 86_400 / 3_600,
        secs % 3_600 / 60,
        secs % 60,
    );

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
