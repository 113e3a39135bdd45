use crate::config::IssueQuery;

/// Render the issue filter to JQL.
///
/// Generates: `project = DEV AND issuetype = Story AND status in ("Done", Closed) ORDER BY created ASC`.
/// The status clause is omitted when no statuses are configured. Ordering is
/// fixed ascending by creation date so report rows come out oldest-first.
pub fn build_search_jql(query: &IssueQuery) -> String {
    let mut clauses = vec![
        format!("project = {}", escape_jql_value(&query.project)),
        format!("issuetype = {}", escape_jql_value(&query.issue_type)),
    ];
    if !query.statuses.is_empty() {
        clauses.push(status_in_clause(&query.statuses));
    }
    format!("{} ORDER BY created ASC", clauses.join(" AND "))
}

/// Build the `status in (...)` JQL clause.
fn status_in_clause(statuses: &[String]) -> String {
    let escaped: Vec<String> = statuses.iter().map(|s| escape_jql_value(s)).collect();
    format!("status in ({})", escaped.join(", "))
}

/// Escape a JQL value — wrap in quotes if it contains special characters.
fn escape_jql_value(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
