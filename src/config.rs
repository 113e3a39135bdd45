use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;

use crate::error::{LeadtimeError, LeadtimeResult};
use crate::retry::RetryPolicy;

/// Jira connection settings, loaded from the environment.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl JiraConfig {
    /// Load from environment variables, reading `.env` first if present.
    ///
    /// `JIRA_BASE_URL`, `JIRA_EMAIL` and `JIRA_API_TOKEN` are required;
    /// `JIRA_MAX_RETRIES` and `JIRA_TIMEOUT_SECS` have defaults.
    pub fn from_env() -> LeadtimeResult<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            base_url: get_var("JIRA_BASE_URL")?,
            email: get_var("JIRA_EMAIL")?,
            api_token: get_var("JIRA_API_TOKEN")?,
            max_retries: get_var_or("JIRA_MAX_RETRIES", "3")
                .parse()
                .map_err(|e| LeadtimeError::Config(format!("invalid JIRA_MAX_RETRIES: {e}")))?,
            timeout_secs: get_var_or("JIRA_TIMEOUT_SECS", "30")
                .parse()
                .map_err(|e| LeadtimeError::Config(format!("invalid JIRA_TIMEOUT_SECS: {e}")))?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            // max_retries counts retries after the first attempt
            max_attempts: self.max_retries + 1,
            ..RetryPolicy::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Initialize the tracing subscriber with env-based filtering.
///
/// Reads `RUST_LOG` (or `LOG_LEVEL`) to set the filter.
/// Falls back to `default_level` if neither is set.
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("LOG_LEVEL"))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt().with_env_filter(filter).with_target(true).init();
}

fn get_var(key: &str) -> LeadtimeResult<String> {
    env::var(key).map_err(|_| LeadtimeError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Issue selection filter, rendered to JQL once per run.
#[derive(Debug, Clone)]
pub struct IssueQuery {
    pub project: String,
    pub issue_type: String,
    pub statuses: Vec<String>,
}

/// Generate a lead-time CSV report from Jira status-change history.
#[derive(Debug, Parser)]
#[command(name = "leadtime", version)]
pub struct ReportArgs {
    /// Jira project key to report on
    #[arg(long)]
    pub project: String,

    /// Issue type to include (e.g. Story, Bug)
    #[arg(long, default_value = "Story")]
    pub issue_type: String,

    /// Restrict to issues currently in these statuses (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub statuses: Vec<String>,

    /// Status whose first entry marks the start of work
    #[arg(long)]
    pub status1: String,

    /// Status whose first entry marks completion
    #[arg(long)]
    pub status2: String,

    /// Inclusive cutoff date (YYYY-MM-DD); later transitions are excluded
    #[arg(long, value_parser = parse_cutoff)]
    pub cutoff: NaiveDate,

    /// Measure from issue creation instead of first entry into status1
    #[arg(long)]
    pub use_created_date: bool,

    /// Optional custom field id to include in the report (e.g. customfield_10001)
    #[arg(long)]
    pub custom_field: Option<String>,

    /// Output CSV path, overwritten on each run
    #[arg(long, default_value = "report.csv")]
    pub output: PathBuf,
}

fn parse_cutoff(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got {raw:?}: {e}"))
}

impl ReportArgs {
    pub fn query(&self) -> IssueQuery {
        IssueQuery {
            project: self.project.clone(),
            issue_type: self.issue_type.clone(),
            statuses: self.statuses.clone(),
        }
    }
}
