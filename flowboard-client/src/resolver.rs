//! Run resolution and parameter extraction
//!
//! Turns a [`WorkflowFilter`] into a sorted list of [`WorkflowRun`]s:
//! 1. page through the workflow catalog
//! 2. resolve requested names (or every catalog entry) to ids
//! 3. page through the runs of every id and adapt them
//! 4. sort by workflow name, then run start time, both descending
//! 5. optionally keep only the latest run of every workflow

use flowboard_core::domain::filter::WorkflowFilter;
use flowboard_core::domain::repository::RepositoryId;
use flowboard_core::domain::run::{RunParameters, WorkflowRun};
use flowboard_core::dto::github::{RemoteRun, Workflow};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::params;
use crate::source::WorkflowSource;

/// Page size used for every paginated listing
pub const PAGE_SIZE: usize = 100;

/// Resolves workflow filters against a [`WorkflowSource`]
#[derive(Clone)]
pub struct WorkflowResolver {
    source: Arc<dyn WorkflowSource>,
    page_size: usize,
}

impl WorkflowResolver {
    pub fn new(source: Arc<dyn WorkflowSource>) -> Self {
        Self {
            source,
            page_size: PAGE_SIZE,
        }
    }

    /// Overrides the page size (mostly useful for tests)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Resolves the runs selected by `filter`
    ///
    /// With `latest_only`, at most one run per workflow name is returned.
    /// Any upstream failure or unknown workflow name aborts the whole filter.
    pub async fn resolve(
        &self,
        filter: &WorkflowFilter,
        latest_only: bool,
    ) -> Result<Vec<WorkflowRun>> {
        let repository = filter.repository_id();
        let catalog = self.list_all_workflows(&repository).await?;

        let names: Vec<String> = if filter.workflow_names.is_empty() {
            catalog.iter().map(|w| w.name.clone()).collect()
        } else {
            filter.workflow_names.clone()
        };
        let targets = resolve_workflow_ids(&names, &catalog)?;

        let mut runs = Vec::new();
        for (name, workflow_id) in targets {
            let remote = self
                .list_all_runs(&repository, workflow_id, filter.limit)
                .await
                .inspect_err(|e| {
                    warn!(
                        "couldn't retrieve workflow runs for workflow '{}' of {}: {}",
                        name, repository, e
                    )
                })?;
            debug!(
                "Fetched {} run(s) of workflow '{}' ({})",
                remote.len(),
                name,
                repository
            );
            runs.extend(remote.into_iter().map(|r| r.into_workflow_run(&repository)));
        }

        sort_runs(&mut runs);

        if latest_only {
            Ok(latest_per_workflow(runs))
        } else {
            Ok(runs)
        }
    }

    /// Downloads the log archive of a run and extracts its parameters
    pub async fn extract(&self, filter: &WorkflowFilter, run_id: u64) -> Result<RunParameters> {
        let repository = filter.repository_id();
        let archive = self.source.download_run_logs(&repository, run_id).await?;
        let files = params::read_archive(&archive)?;
        let parameter_sets = params::parse_log_files(&files)?;

        Ok(RunParameters {
            owner: repository.owner,
            repo: repository.name,
            run_id,
            parameter_sets,
        })
    }

    /// Attaches parameters to every run whose extraction succeeds
    ///
    /// A failing run is logged and left without parameters. Returns the
    /// number of enriched runs.
    pub async fn enrich(&self, filter: &WorkflowFilter, runs: &mut [WorkflowRun]) -> usize {
        let mut enriched = 0;

        for run in runs.iter_mut() {
            match self.extract(filter, run.run_id).await {
                Ok(parameters) => {
                    run.parameters = Some(parameters);
                    enriched += 1;
                }
                Err(e) if e.is_not_found() => {
                    info!(
                        "Logs of {} workflow: {} runId: {} are no longer available, params omitted",
                        filter.repository_id(),
                        run.workflow_name,
                        run.run_id
                    );
                }
                Err(e) if e.is_extraction_error() => {
                    warn!(
                        "Unreadable params in logs of {} workflow: {} runId: {}, they will be omitted: {}",
                        filter.repository_id(),
                        run.workflow_name,
                        run.run_id,
                        e
                    );
                }
                Err(e) => {
                    warn!(
                        "Failed fetching workflow params for {} workflow: {} runId: {}, it will be omitted: {}",
                        filter.repository_id(),
                        run.workflow_name,
                        run.run_id,
                        e
                    );
                }
            }
        }

        enriched
    }

    /// Pages through the whole workflow catalog
    async fn list_all_workflows(&self, repository: &RepositoryId) -> Result<Vec<Workflow>> {
        let mut collected = Vec::new();
        let mut page = 1;

        loop {
            let chunk = self
                .source
                .list_workflows(repository, page, self.page_size)
                .await?;
            let received = chunk.workflows.len();
            collected.extend(chunk.workflows);

            if chunk.total_count <= collected.len() {
                break;
            }
            if received == 0 {
                warn!(
                    "Workflow catalog of {} reported {} entries but only {} were listed",
                    repository,
                    chunk.total_count,
                    collected.len()
                );
                break;
            }
            page += 1;
        }

        Ok(collected)
    }

    /// Pages through the runs of one workflow, stopping at `limit` when set
    async fn list_all_runs(
        &self,
        repository: &RepositoryId,
        workflow_id: u64,
        limit: usize,
    ) -> Result<Vec<RemoteRun>> {
        let per_page = if limit > 0 {
            limit.min(self.page_size)
        } else {
            self.page_size
        };
        let mut collected = Vec::new();
        let mut page = 1;

        loop {
            let chunk = self
                .source
                .list_workflow_runs(repository, workflow_id, page, per_page)
                .await?;
            let received = chunk.workflow_runs.len();
            collected.extend(chunk.workflow_runs);

            if limit > 0 && collected.len() >= limit {
                collected.truncate(limit);
                break;
            }
            if chunk.total_count <= collected.len() {
                break;
            }
            if received == 0 {
                warn!(
                    "Workflow {} of {} reported {} runs but only {} were listed",
                    workflow_id,
                    repository,
                    chunk.total_count,
                    collected.len()
                );
                break;
            }
            page += 1;
        }

        Ok(collected)
    }
}

/// Maps every requested name to the id of the first catalog entry with that
/// name, keeping request order and dropping repeated names
fn resolve_workflow_ids(names: &[String], catalog: &[Workflow]) -> Result<Vec<(String, u64)>> {
    let mut resolved: Vec<(String, u64)> = Vec::with_capacity(names.len());

    for name in names {
        if resolved.iter().any(|(seen, _)| seen == name) {
            continue;
        }
        let workflow = catalog
            .iter()
            .find(|w| &w.name == name)
            .ok_or_else(|| ClientError::UnresolvedWorkflow(name.clone()))?;
        resolved.push((name.clone(), workflow.id));
    }

    Ok(resolved)
}

/// Sorts by workflow name descending, then run start time descending
///
/// The sort is stable: runs with equal keys keep their relative order.
pub fn sort_runs(runs: &mut [WorkflowRun]) {
    runs.sort_by(|a, b| {
        b.workflow_name
            .cmp(&a.workflow_name)
            .then_with(|| b.run_started_at.cmp(&a.run_started_at))
    });
}

/// Keeps the most recent run of every workflow name
///
/// Equal start times are resolved in favour of the run seen last. The
/// survivors are sorted with [`sort_runs`].
pub fn latest_per_workflow(runs: Vec<WorkflowRun>) -> Vec<WorkflowRun> {
    let mut latest: HashMap<String, WorkflowRun> = HashMap::new();

    for run in runs {
        let replace = latest
            .get(&run.workflow_name)
            .is_none_or(|existing| existing.run_started_at <= run.run_started_at);
        if replace {
            latest.insert(run.workflow_name.clone(), run);
        }
    }

    let mut result: Vec<WorkflowRun> = latest.into_values().collect();
    sort_runs(&mut result);
    result
}
