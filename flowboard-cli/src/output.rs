//! Output formatting
//!
//! Renders workflow runs as a plain ASCII table or as JSON.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use flowboard_core::domain::run::WorkflowRun;

/// Output format of listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Ascii,
    Json,
}

const RUN_HEADERS: [&str; 10] = [
    "workflow",
    "#",
    "status",
    "conclusion",
    "branch",
    "committer",
    "commit msg",
    "commit",
    "commit time",
    "run time",
];

/// Text table with multi-line cells
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                let widest = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                widths[i] = widths[i].max(widest);
            }
        }
        widths
    }

    /// Renders the table with `+---+` borders
    pub fn render(&self) -> String {
        let widths = self.widths();
        let separator = format!(
            "+{}+\n",
            widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("+")
        );

        let mut out = separator.clone();
        out.push_str(&render_line(&self.headers, &widths));
        out.push_str(&separator);

        for row in &self.rows {
            let cells: Vec<Vec<&str>> = row.iter().map(|cell| cell.lines().collect()).collect();
            let height = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);

            for line in 0..height {
                let parts: Vec<String> = (0..widths.len())
                    .map(|i| {
                        cells
                            .get(i)
                            .and_then(|c| c.get(line))
                            .map(|s| s.to_string())
                            .unwrap_or_default()
                    })
                    .collect();
                out.push_str(&render_line(&parts, &widths));
            }
        }

        if !self.rows.is_empty() {
            out.push_str(&separator);
        }
        out
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(cell.chars().count());
            format!(" {}{} ", cell, " ".repeat(pad))
        })
        .collect();
    format!("|{}|\n", padded.join("|"))
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Merged parameters of a run as `key: value` lines, sorted descending
pub fn parameter_lines(run: &WorkflowRun) -> String {
    let Some(parameters) = &run.parameters else {
        return String::new();
    };

    let mut lines: Vec<String> = parameters
        .merged()
        .into_iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect();
    lines.sort_by(|a, b| b.cmp(a));
    lines.join("\n")
}

/// Builds the run table, adding a params column when any run carries parameters
pub fn runs_table(runs: &[WorkflowRun]) -> Table {
    let with_params = runs
        .iter()
        .any(|run| run.parameters.as_ref().is_some_and(|p| !p.is_empty()));

    let mut headers: Vec<&str> = RUN_HEADERS.to_vec();
    if with_params {
        headers.push("params");
    }

    let mut table = Table::new(headers);
    for run in runs {
        let mut row = vec![
            run.workflow_name.clone(),
            run.run_number.to_string(),
            run.status.clone(),
            run.conclusion.clone(),
            run.branch.clone(),
            run.commit_author.clone(),
            run.commit_title().to_string(),
            run.short_sha().to_string(),
            run.commit_time.as_ref().map(format_time).unwrap_or_default(),
            format_time(&run.run_started_at),
        ];
        if with_params {
            row.push(parameter_lines(run));
        }
        table.push_row(row);
    }
    table
}

/// Renders runs in the requested format
pub fn render_runs(runs: &[WorkflowRun], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Ascii => Ok(runs_table(runs).render()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(runs)?),
    }
}
