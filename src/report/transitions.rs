use chrono::{DateTime, Utc};

use crate::jira::models::ChangelogEntry;

/// Earliest entry into each of the two tracked statuses.
///
/// First-write-wins: an issue bouncing in and out of a status keeps the
/// timestamp of its first arrival.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTimes {
    pub first_status1: Option<DateTime<Utc>>,
    pub first_status2: Option<DateTime<Utc>>,
}

/// Scan a changelog for the first entry into `status1` and `status2`.
///
/// Entries are sorted by timestamp before the scan rather than trusting the
/// API's ordering; entries with unparseable timestamps are skipped.
pub fn extract(history: &[ChangelogEntry], status1: &str, status2: &str) -> TransitionTimes {
    let mut stamped: Vec<(DateTime<Utc>, &ChangelogEntry)> = history
        .iter()
        .filter_map(|entry| entry.timestamp().map(|at| (at, entry)))
        .collect();
    stamped.sort_by_key(|(at, _)| *at);

    stamped
        .iter()
        .fold(TransitionTimes::default(), |mut acc, (at, entry)| {
            for item in entry
                .items
                .iter()
                .filter(|i| i.field.eq_ignore_ascii_case("status"))
            {
                let to = item.to_string.as_deref();
                if acc.first_status1.is_none() && to == Some(status1) {
                    acc.first_status1 = Some(*at);
                }
                if acc.first_status2.is_none() && to == Some(status2) {
                    acc.first_status2 = Some(*at);
                }
            }
            acc
        })
}
