use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Parse a Jira timestamp leniently.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00Z`) and Jira's own
/// `2024-01-01T00:00:00.000+0000` form. Anything else is treated as absent —
/// downstream report fields simply render empty.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One page from `/rest/api/3/search/jql`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub is_last: bool,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub status: Option<NamedField>,
    pub assignee: Option<UserField>,
    pub priority: Option<NamedField>,
    pub created: Option<String>,
    /// Catch-all for the optional custom field requested by the caller.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedField {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserField {
    pub display_name: Option<String>,
}

impl Issue {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.fields.created.as_deref().and_then(parse_timestamp)
    }

    /// Render a custom field value as a plain string, if configured and set.
    ///
    /// Jira custom fields come back as strings, numbers, or `{ "name": .. }` /
    /// `{ "value": .. }` objects depending on the field type.
    pub fn custom_field_value(&self, field_id: &str) -> Option<String> {
        let value = self.fields.extra.get(field_id)?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Object(map) => map
                .get("name")
                .or_else(|| map.get("value"))
                .and_then(|v| v.as_str())
                .map(str::to_owned),
            _ => None,
        }
    }
}

/// One page from `/rest/api/3/issue/{key}/changelog`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogPage {
    #[serde(default)]
    pub values: Vec<ChangelogEntry>,
    #[serde(default)]
    pub is_last: bool,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    pub created: Option<String>,
    #[serde(default)]
    pub items: Vec<FieldChange>,
}

impl ChangelogEntry {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub to_string: Option<String>,
}

/// Flattened per-issue record consumed by the report builder.
#[derive(Debug, Clone)]
pub struct IssueSummary {
    pub key: String,
    pub summary: String,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub custom_value: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl IssueSummary {
    pub fn from_issue(issue: &Issue, custom_field: Option<&str>) -> Self {
        Self {
            key: issue.key.clone(),
            summary: issue.fields.summary.clone().unwrap_or_default(),
            assignee: issue
                .fields
                .assignee
                .as_ref()
                .and_then(|a| a.display_name.clone()),
            priority: issue.fields.priority.as_ref().map(|p| p.name.clone()),
            status: issue.fields.status.as_ref().map(|s| s.name.clone()),
            custom_value: custom_field.and_then(|id| issue.custom_field_value(id)),
            created: issue.created(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_rfc3339_timestamp() {
        let ts = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_jira_offset_timestamp() {
        let ts = parse_timestamp("2024-03-05T14:30:00.000+0200").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap());
    }

    #[test]
    fn malformed_timestamp_is_absent() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn search_page_deserializes() {
        let json = serde_json::json!({
            "issues": [{
                "key": "DEV-1",
                "fields": {
                    "summary": "Fix login",
                    "status": { "name": "Done" },
                    "assignee": { "displayName": "Mia Krystof" },
                    "priority": { "name": "High" },
                    "created": "2024-01-01T00:00:00.000+0000",
                    "customfield_10001": { "name": "Team Alpha" }
                }
            }],
            "isLast": false,
            "nextPageToken": "abc"
        });
        let page: SearchPage = serde_json::from_value(json).unwrap();
        assert!(!page.is_last);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
        assert_eq!(page.issues.len(), 1);

        let issue = &page.issues[0];
        assert_eq!(issue.key, "DEV-1");
        assert!(issue.created().is_some());
        assert_eq!(
            issue.custom_field_value("customfield_10001").as_deref(),
            Some("Team Alpha")
        );
    }

    #[test]
    fn minimal_issue_deserializes() {
        let json = serde_json::json!({
            "key": "DEV-2",
            "fields": { "summary": "Minimal" }
        });
        let issue: Issue = serde_json::from_value(json).unwrap();
        assert!(issue.fields.assignee.is_none());
        assert!(issue.fields.status.is_none());
        assert!(issue.created().is_none());
    }

    #[test]
    fn custom_field_string_and_number() {
        let json = serde_json::json!({
            "key": "DEV-3",
            "fields": {
                "summary": "x",
                "customfield_1": "plain",
                "customfield_2": 5,
                "customfield_3": { "value": "opt-a" }
            }
        });
        let issue: Issue = serde_json::from_value(json).unwrap();
        assert_eq!(issue.custom_field_value("customfield_1").as_deref(), Some("plain"));
        assert_eq!(issue.custom_field_value("customfield_2").as_deref(), Some("5"));
        assert_eq!(issue.custom_field_value("customfield_3").as_deref(), Some("opt-a"));
        assert!(issue.custom_field_value("customfield_9").is_none());
    }

    #[test]
    fn changelog_page_deserializes() {
        let json = serde_json::json!({
            "startAt": 0,
            "maxResults": 100,
            "total": 1,
            "isLast": true,
            "values": [{
                "created": "2024-01-10T00:00:00.000+0000",
                "items": [
                    { "field": "status", "fromString": "To Do", "toString": "Done" }
                ]
            }]
        });
        let page: ChangelogPage = serde_json::from_value(json).unwrap();
        assert!(page.is_last);
        assert_eq!(page.total, Some(1));
        assert_eq!(page.values[0].items[0].field, "status");
        assert_eq!(page.values[0].items[0].to_string.as_deref(), Some("Done"));
        assert!(page.values[0].timestamp().is_some());
    }

    #[test]
    fn entry_with_bad_timestamp_has_no_instant() {
        let json = serde_json::json!({
            "created": "garbage",
            "items": [{ "field": "status", "toString": "Done" }]
        });
        let entry: ChangelogEntry = serde_json::from_value(json).unwrap();
        assert!(entry.timestamp().is_none());
    }

    #[test]
    fn issue_summary_flattens_fields() {
        let json = serde_json::json!({
            "key": "DEV-4",
            "fields": {
                "summary": "Ship it",
                "status": { "name": "In Progress" },
                "assignee": { "displayName": "Sam" },
                "priority": { "name": "Low" },
                "created": "2024-02-01T08:00:00Z",
                "customfield_10001": "Team Beta"
            }
        });
        let issue: Issue = serde_json::from_value(json).unwrap();
        let summary = IssueSummary::from_issue(&issue, Some("customfield_10001"));
        assert_eq!(summary.key, "DEV-4");
        assert_eq!(summary.assignee.as_deref(), Some("Sam"));
        assert_eq!(summary.status.as_deref(), Some("In Progress"));
        assert_eq!(summary.custom_value.as_deref(), Some("Team Beta"));
        assert!(summary.created.is_some());

        let without_custom = IssueSummary::from_issue(&issue, None);
        assert!(without_custom.custom_value.is_none());
    }
}
