use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::timing::Timing;
use crate::jira::models::IssueSummary;

/// One report line: issue summary fields plus computed durations.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub issue: IssueSummary,
    pub timing: Timing,
}

/// Accumulates rows in processing order and serializes them to CSV.
///
/// `Summary` is the only quoted field (internal double quotes doubled); the
/// remaining fields are constrained to simple tokens and emitted verbatim.
/// Absent values render as the empty string.
#[derive(Debug)]
pub struct Report {
    status2: String,
    rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(status2: impl Into<String>) -> Self {
        Self {
            status2: status2.into(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mean of the present time-spent-days values, 0 when none are present.
    pub fn average_time_spent_days(&self) -> f64 {
        let present: Vec<i64> = self
            .rows
            .iter()
            .filter_map(|r| r.timing.time_spent_days)
            .collect();
        if present.is_empty() {
            return 0.0;
        }
        present.iter().sum::<i64>() as f64 / present.len() as f64
    }

    fn header(&self) -> String {
        format!(
            "Key,Summary,Assignee,Priority,Status,Custom Field,Created,Backlog Days,Time Spent Minutes,{} Time",
            self.status2
        )
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header());
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_row(row));
            out.push('\n');
        }
        out
    }

    /// Write the full report to `path`, replacing any previous file.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.render())
    }
}

fn render_row(row: &ReportRow) -> String {
    let issue = &row.issue;
    let timing = &row.timing;
    [
        issue.key.clone(),
        quote_csv(&issue.summary),
        opt_str(issue.assignee.as_deref()),
        opt_str(issue.priority.as_deref()),
        opt_str(issue.status.as_deref()),
        opt_str(issue.custom_value.as_deref()),
        opt_timestamp(issue.created),
        opt_num(timing.backlog_days),
        opt_num(timing.time_spent_minutes),
        opt_num(timing.time_spent_days),
    ]
    .join(",")
}

/// CSV-quote a single field: wrap in double quotes, double internal quotes.
fn quote_csv(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn opt_str(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn opt_num(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|v| v.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_default()
}
