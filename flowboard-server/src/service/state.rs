//! State Store
//!
//! Keyed cache of per-repository snapshots. The poller replaces entries,
//! request handlers read them. Every access goes through the same `RwLock`,
//! so readers observe either the previous or the new snapshot of an entry.

use flowboard_core::domain::repository::{RepositoryId, RepositoryState};
use std::collections::BTreeMap;
use std::sync::RwLock;
use thiserror::Error;

/// Errors returned by the state store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// The filter combination is not one of the four supported scopes
    #[error(
        "filtering workflow runs by (owner={owner:?}, repo={repo:?}, workflow={workflow:?}) is not supported"
    )]
    UnsupportedFilter {
        owner: Option<String>,
        repo: Option<String>,
        workflow: Option<String>,
    },

    /// A writer panicked while holding the lock
    #[error("state store is unavailable")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, StateError>;

/// Concurrency-safe map of repository snapshots
#[derive(Debug, Default)]
pub struct StateStore {
    states: RwLock<BTreeMap<RepositoryId, RepositoryState>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the snapshot of `state.id`
    pub fn set(&self, state: RepositoryState) -> Result<()> {
        let mut states = self.states.write().map_err(|_| StateError::Unavailable)?;
        states.insert(state.id.clone(), state);
        Ok(())
    }

    /// Applies [`StateStore::set`] for every state
    ///
    /// Entries are replaced one at a time, so readers may see some
    /// repositories refreshed before others.
    pub fn set_multi(&self, states: impl IntoIterator<Item = RepositoryState>) -> Result<usize> {
        let mut count = 0;
        for state in states {
            self.set(state)?;
            count += 1;
        }
        Ok(count)
    }

    /// Returns the snapshots matching the given scope, ordered by repository
    ///
    /// Supported scopes are (), (owner), (owner, repo) and
    /// (owner, repo, workflow). Empty strings count as absent. With a
    /// workflow, each returned state only holds the runs of that workflow.
    pub fn filter(
        &self,
        owner: Option<&str>,
        repo: Option<&str>,
        workflow: Option<&str>,
    ) -> Result<Vec<RepositoryState>> {
        let owner = owner.filter(|s| !s.is_empty());
        let repo = repo.filter(|s| !s.is_empty());
        let workflow = workflow.filter(|s| !s.is_empty());

        let states = self.states.read().map_err(|_| StateError::Unavailable)?;

        let result: Vec<RepositoryState> = match (owner, repo, workflow) {
            (None, None, None) => states.values().cloned().collect(),
            (Some(owner), None, None) => states
                .values()
                .filter(|state| state.id.owner == owner)
                .cloned()
                .collect(),
            (Some(owner), Some(repo), None) => states
                .get(&RepositoryId::new(owner, repo))
                .cloned()
                .into_iter()
                .collect(),
            (Some(owner), Some(repo), Some(workflow)) => states
                .get(&RepositoryId::new(owner, repo))
                .map(|state| state.narrowed_to(workflow))
                .into_iter()
                .collect(),
            (owner, repo, workflow) => {
                return Err(StateError::UnsupportedFilter {
                    owner: owner.map(str::to_string),
                    repo: repo.map(str::to_string),
                    workflow: workflow.map(str::to_string),
                });
            }
        };

        Ok(result)
    }

    /// Number of cached repositories
    pub fn len(&self) -> Result<usize> {
        let states = self.states.read().map_err(|_| StateError::Unavailable)?;
        Ok(states.len())
    }

    /// Poisons the lock by panicking while holding the write guard
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.states.write();
            panic!("writer panicked while holding the lock");
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use flowboard_core::domain::run::WorkflowRun;
    use std::sync::Arc;

    fn run(owner: &str, repo: &str, workflow: &str, run_id: u64) -> WorkflowRun {
        let started = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        WorkflowRun {
            owner: owner.to_string(),
            repo: repo.to_string(),
            workflow_name: workflow.to_string(),
            workflow_id: 1,
            run_id,
            run_number: run_id,
            html_url: String::new(),
            logs_url: String::new(),
            status: "completed".to_string(),
            conclusion: "success".to_string(),
            event: "push".to_string(),
            branch: "main".to_string(),
            commit_sha: String::new(),
            commit_author: String::new(),
            commit_message: String::new(),
            commit_time: None,
            run_started_at: started,
            parameters: None,
        }
    }

    fn state(owner: &str, repo: &str, workflows: &[&str]) -> RepositoryState {
        let runs = workflows
            .iter()
            .enumerate()
            .map(|(i, w)| run(owner, repo, w, i as u64))
            .collect();
        RepositoryState::new(RepositoryId::new(owner, repo), runs, Utc::now())
    }

    fn ids(states: &[RepositoryState]) -> Vec<String> {
        states.iter().map(|s| s.id.to_string()).collect()
    }

    fn populated() -> StateStore {
        let store = StateStore::new();
        store
            .set_multi(vec![
                state("zeta", "api", &["build"]),
                state("acme", "rocket", &["build", "test", "build"]),
                state("acme", "engine", &["lint"]),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_filter_all_returns_every_entry_once() {
        let store = populated();
        let all = store.filter(None, None, None).unwrap();
        assert_eq!(ids(&all), vec!["acme/engine", "acme/rocket", "zeta/api"]);

        let reversed = StateStore::new();
        for s in all.iter().rev() {
            reversed.set(s.clone()).unwrap();
        }
        assert_eq!(reversed.filter(None, None, None).unwrap(), all);
    }

    #[test]
    fn test_filter_by_owner_and_repo() {
        let store = populated();
        assert_eq!(
            ids(&store.filter(Some("acme"), None, None).unwrap()),
            vec!["acme/engine", "acme/rocket"]
        );
        assert_eq!(
            ids(&store.filter(Some("acme"), Some("rocket"), None).unwrap()),
            vec!["acme/rocket"]
        );
        assert!(store.filter(Some("nobody"), None, None).unwrap().is_empty());
        assert!(
            store
                .filter(Some("acme"), Some("missing"), None)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_filter_by_workflow_narrows_copy() {
        let store = populated();

        let narrowed = store
            .filter(Some("acme"), Some("rocket"), Some("build"))
            .unwrap();
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].runs.len(), 2);
        assert!(narrowed[0].runs.iter().all(|r| r.workflow_name == "build"));

        let untouched = store.filter(Some("acme"), Some("rocket"), None).unwrap();
        assert_eq!(untouched[0].runs.len(), 3);

        let empty = store
            .filter(Some("acme"), Some("rocket"), Some("deploy"))
            .unwrap();
        assert_eq!(empty.len(), 1);
        assert!(empty[0].runs.is_empty());
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let store = populated();
        assert_eq!(store.filter(Some(""), Some(""), Some("")).unwrap().len(), 3);
    }

    #[test]
    fn test_unsupported_filters() {
        let store = populated();
        assert!(matches!(
            store.filter(None, Some("rocket"), None),
            Err(StateError::UnsupportedFilter { .. })
        ));
        assert!(matches!(
            store.filter(Some("acme"), None, Some("build")),
            Err(StateError::UnsupportedFilter { .. })
        ));
        assert!(matches!(
            store.filter(None, None, Some("build")),
            Err(StateError::UnsupportedFilter { .. })
        ));
    }

    #[test]
    fn test_set_replaces_by_key() {
        let store = StateStore::new();
        store.set(state("acme", "rocket", &["build"])).unwrap();
        let second = state("acme", "rocket", &["test", "lint"]);
        store.set(second.clone()).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.filter(None, None, None).unwrap(), vec![second]);
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let store = Arc::new(StateStore::new());
        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..200 {
                    let workflows: Vec<&str> = if i % 2 == 0 {
                        vec!["build"; 4]
                    } else {
                        vec!["test"; 4]
                    };
                    store.set(state("acme", "rocket", &workflows)).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        for s in store.filter(Some("acme"), Some("rocket"), None).unwrap() {
                            let first = &s.runs[0].workflow_name;
                            assert_eq!(s.runs.len(), 4);
                            assert!(s.runs.iter().all(|r| &r.workflow_name == first));
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_poisoned_lock_reports_unavailable() {
        let store = populated();
        store.poison();

        assert_eq!(store.filter(None, None, None), Err(StateError::Unavailable));
        assert_eq!(store.len(), Err(StateError::Unavailable));
        assert_eq!(
            store.set(state("acme", "rocket", &["build"])),
            Err(StateError::Unavailable)
        );
    }
}
