//! State poller
//!
//! Refreshes the state store from the upstream workflow source. Each cycle
//! walks the configured filters in order; a failing repository keeps its
//! previous snapshot and is retried on the next tick.

use chrono::Utc;
use flowboard_client::WorkflowResolver;
use flowboard_core::domain::filter::WorkflowFilter;
use flowboard_core::domain::repository::RepositoryState;
use std::sync::Arc;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::service::StateStore;

/// Background task that keeps the state store up to date
pub struct StatePoller {
    resolver: WorkflowResolver,
    store: Arc<StateStore>,
    filters: Vec<WorkflowFilter>,
    poll_interval: Duration,
    latest_only: bool,
    parse_params: bool,
}

impl StatePoller {
    /// Creates a new poller for the targets of `config`
    pub fn new(config: &Config, resolver: WorkflowResolver, store: Arc<StateStore>) -> Self {
        Self {
            resolver,
            store,
            filters: config.filters.clone(),
            poll_interval: config.poll_interval,
            latest_only: config.latest_only,
            parse_params: config.parse_params,
        }
    }

    /// Starts the polling loop
    ///
    /// The first cycle runs immediately. Ticks missed while a slow cycle was
    /// still running are skipped rather than replayed.
    pub async fn run(&self) {
        info!(
            "Starting state poller (interval: {:?}, targets: {})",
            self.poll_interval,
            self.filters.len()
        );

        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            debug!("Polling workflow runs");
            let started = Instant::now();
            let updated = self.poll_once().await;
            info!(
                "Refreshed {}/{} repositories in {:?}",
                updated,
                self.filters.len(),
                started.elapsed()
            );
        }
    }

    /// Performs a single poll cycle and returns the number of refreshed repositories
    pub async fn poll_once(&self) -> usize {
        let updated_at = Utc::now();
        let mut states = Vec::with_capacity(self.filters.len());

        for filter in &self.filters {
            let repository = filter.repository_id();

            let mut runs = match self.resolver.resolve(filter, self.latest_only).await {
                Ok(runs) => runs,
                Err(e) if e.is_client_error() => {
                    error!(
                        "Failed to refresh {}, check the target and token (keeping previous state): {}",
                        repository, e
                    );
                    continue;
                }
                Err(e) if e.is_server_error() => {
                    warn!(
                        "Upstream unavailable while refreshing {}, keeping previous state: {}",
                        repository, e
                    );
                    continue;
                }
                Err(e) => {
                    warn!("Failed to refresh {}, keeping previous state: {}", repository, e);
                    continue;
                }
            };

            if self.parse_params {
                let enriched = self.resolver.enrich(filter, &mut runs).await;
                debug!(
                    "Extracted parameters of {}/{} run(s) of {}",
                    enriched,
                    runs.len(),
                    repository
                );
            }

            states.push(RepositoryState::new(repository, runs, updated_at));
        }

        match self.store.set_multi(states) {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to publish poll results: {}", e);
                0
            }
        }
    }
}
