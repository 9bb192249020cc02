//! Repository domain types
//!
//! A repository is the unit the poller refreshes and the cache is keyed by.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::run::WorkflowRun;

/// Stable identity of a polling target
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepositoryId {
    /// Account or organization that owns the repository
    pub owner: String,

    /// Repository name
    pub name: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything known about one repository as of one poll cycle
///
/// A state is always replaced wholesale; all runs share `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryState {
    pub id: RepositoryId,
    pub runs: Vec<WorkflowRun>,
    pub updated_at: DateTime<Utc>,
}

impl RepositoryState {
    pub fn new(id: RepositoryId, runs: Vec<WorkflowRun>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            runs,
            updated_at,
        }
    }

    /// Returns a copy of this state keeping only the runs of `workflow`
    pub fn narrowed_to(&self, workflow: &str) -> Self {
        Self {
            id: self.id.clone(),
            runs: self
                .runs
                .iter()
                .filter(|run| run.workflow_name == workflow)
                .cloned()
                .collect(),
            updated_at: self.updated_at,
        }
    }

    /// Distinct workflow names in run order
    pub fn workflow_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for run in &self.runs {
            if !names.contains(&run.workflow_name.as_str()) {
                names.push(&run.workflow_name);
            }
        }
        names
    }
}
