use chrono::{DateTime, Utc};

use crate::config::ReportArgs;
use crate::error::LeadtimeResult;
use crate::jira::client::JiraClient;
use crate::jira::models::IssueSummary;
use crate::jira::query::build_search_jql;
use crate::report::builder::{Report, ReportRow};
use crate::report::{timing, transitions};

/// Run the full report pipeline: paginated issue search, per-issue changelog
/// fetch, transition extraction, timing computation, row accumulation.
///
/// Sequential by design — each issue's changelog is fully resolved before the
/// next issue. Any fetch error aborts the run; rows only live in memory until
/// the caller writes them, so an aborted run produces no partial file.
pub async fn run(
    client: &JiraClient,
    args: &ReportArgs,
    now: DateTime<Utc>,
) -> LeadtimeResult<Report> {
    let jql = build_search_jql(&args.query());
    tracing::info!(jql = %jql, "searching issues");

    let mut report = Report::new(args.status2.clone());
    let mut page_token: Option<String> = None;

    loop {
        let page = client
            .search_page(&jql, args.custom_field.as_deref(), page_token.as_deref())
            .await?;
        tracing::info!(count = page.issues.len(), "fetched issue page");

        for issue in &page.issues {
            let history = client.fetch_issue_changelog(&issue.key).await?;
            let times = transitions::extract(&history, &args.status1, &args.status2);
            let timing = timing::compute(
                issue.created(),
                &times,
                args.use_created_date,
                args.cutoff,
                now,
            );

            tracing::debug!(
                key = %issue.key,
                history_len = history.len(),
                time_spent_days = ?timing.time_spent_days,
                "processed issue"
            );

            report.push(ReportRow {
                issue: IssueSummary::from_issue(issue, args.custom_field.as_deref()),
                timing,
            });
        }

        if page.is_last || page.next_page_token.is_none() {
            break;
        }
        page_token = page.next_page_token;
    }

    tracing::info!(
        rows = report.len(),
        average_days = report.average_time_spent_days(),
        "report assembled"
    );
    Ok(report)
}

/// Run the pipeline and write the CSV only after it fully succeeded, so an
/// aborted run leaves no partial file behind.
pub async fn run_and_write(
    client: &JiraClient,
    args: &ReportArgs,
    now: DateTime<Utc>,
) -> LeadtimeResult<Report> {
    let report = run(client, args, now).await?;
    report.write_to(&args.output)?;
    Ok(report)
}
