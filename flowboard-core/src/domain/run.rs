//! Workflow run domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters recovered from a single log file, keyed by parameter name
pub type ParameterSet = BTreeMap<String, String>;

/// One execution of a workflow
///
/// Produced by the resolver and never changed afterwards, except for
/// `parameters` which is attached during enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub owner: String,
    pub repo: String,
    pub workflow_name: String,
    pub workflow_id: u64,
    pub run_id: u64,
    pub run_number: u64,
    pub html_url: String,
    pub logs_url: String,
    pub status: String,
    pub conclusion: String,
    pub event: String,
    pub branch: String,
    pub commit_sha: String,
    pub commit_author: String,
    pub commit_message: String,
    pub commit_time: Option<DateTime<Utc>>,
    pub run_started_at: DateTime<Utc>,
    #[serde(default)]
    pub parameters: Option<RunParameters>,
}

impl WorkflowRun {
    /// First ten characters of the commit SHA
    pub fn short_sha(&self) -> &str {
        match self.commit_sha.char_indices().nth(10) {
            Some((idx, _)) => &self.commit_sha[..idx],
            None => &self.commit_sha,
        }
    }

    /// First line of the commit message
    pub fn commit_title(&self) -> &str {
        self.commit_message.lines().next().unwrap_or_default()
    }
}

/// Parameters extracted from the log archive of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunParameters {
    pub owner: String,
    pub repo: String,
    pub run_id: u64,

    /// One set per log file, in archive order
    pub parameter_sets: Vec<ParameterSet>,
}

impl RunParameters {
    /// Merges all parameter sets; later files win on duplicate keys
    pub fn merged(&self) -> ParameterSet {
        let mut merged = ParameterSet::new();
        for set in &self.parameter_sets {
            merged.extend(set.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.parameter_sets.iter().all(|set| set.is_empty())
    }
}
