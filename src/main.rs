mod config;
mod error;
mod jira;
mod pipeline;
mod report;
mod retry;

use chrono::Utc;
use clap::Parser;

use crate::config::{init_tracing, JiraConfig, ReportArgs};
use crate::error::LeadtimeResult;
use crate::jira::client::JiraClient;

#[tokio::main]
async fn main() {
    init_tracing("info");
    let args = ReportArgs::parse();

    if let Err(e) = run(&args).await {
        tracing::error!(error = %e, "report run failed");
        std::process::exit(1);
    }
}

async fn run(args: &ReportArgs) -> LeadtimeResult<()> {
    let jira_config = JiraConfig::from_env()?;
    tracing::info!(
        base_url = %jira_config.base_url,
        project = %args.project,
        status1 = %args.status1,
        status2 = %args.status2,
        cutoff = %args.cutoff,
        "starting lead-time report"
    );

    let client = JiraClient::new(jira_config)?;
    let report = pipeline::run_and_write(&client, args, Utc::now()).await?;
    tracing::info!(
        rows = report.len(),
        average_days = report.average_time_spent_days(),
        path = %args.output.display(),
        "report written"
    );
    Ok(())
}
