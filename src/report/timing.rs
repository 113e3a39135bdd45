use chrono::{DateTime, NaiveDate, Utc};

use super::transitions::TransitionTimes;

/// Computed duration metrics for one issue. Absent means "could not be
/// computed", never zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub backlog_days: Option<i64>,
    pub time_spent_minutes: Option<i64>,
    pub time_spent_days: Option<i64>,
}

/// Derive timing metrics from the start event and the first entry into status2.
///
/// The start event is issue creation when `use_created_as_start`, otherwise the
/// first entry into status1 (absent start means absent metrics). Time-spent
/// metrics exist only when the status2 transition also falls on or before the
/// cutoff date. Whole-day differences always floor, so a future-dated start
/// yields a negative backlog rather than rounding toward zero.
pub fn compute(
    created: Option<DateTime<Utc>>,
    transitions: &TransitionTimes,
    use_created_as_start: bool,
    cutoff: NaiveDate,
    now: DateTime<Utc>,
) -> Timing {
    let start = if use_created_as_start {
        created
    } else {
        transitions.first_status1
    };

    let backlog_days = start.map(|s| floor_days(now - s));

    let time_spent = match (start, transitions.first_status2) {
        (Some(start), Some(done)) if done.date_naive() <= cutoff => Some(done - start),
        _ => None,
    };

    Timing {
        backlog_days,
        time_spent_minutes: time_spent.map(|d| d.num_minutes()),
        time_spent_days: time_spent.map(floor_days),
    }
}

const SECS_PER_DAY: i64 = 86_400;

/// Whole days in a duration, flooring instead of truncating toward zero.
fn floor_days(duration: chrono::Duration) -> i64 {
    duration.num_seconds().div_euclid(SECS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn created_to_done_within_cutoff() {
        let transitions = TransitionTimes {
            first_status1: None,
            first_status2: Some(at(2024, 1, 10)),
        };
        let timing = compute(
            Some(at(2024, 1, 1)),
            &transitions,
            true,
            date(2024, 12, 31),
            at(2024, 6, 1),
        );
        assert_eq!(timing.time_spent_days, Some(9));
        assert_eq!(timing.time_spent_minutes, Some(12960));
    }

    #[test]
    fn transition_after_cutoff_yields_absent_metrics() {
        let transitions = TransitionTimes {
            first_status1: None,
            first_status2: Some(at(2024, 1, 10)),
        };
        let timing = compute(
            Some(at(2024, 1, 1)),
            &transitions,
            true,
            date(2024, 1, 5),
            at(2024, 6, 1),
        );
        assert!(timing.time_spent_days.is_none());
        assert!(timing.time_spent_minutes.is_none());
        // backlog still computed from the start event
        assert_eq!(timing.backlog_days, Some(152));
    }

    #[test]
    fn cutoff_is_inclusive() {
        let transitions = TransitionTimes {
            first_status1: None,
            first_status2: Some(at(2024, 1, 10)),
        };
        let timing = compute(
            Some(at(2024, 1, 1)),
            &transitions,
            true,
            date(2024, 1, 10),
            at(2024, 2, 1),
        );
        assert_eq!(timing.time_spent_days, Some(9));
    }

    #[test]
    fn start_from_status1_when_flag_off() {
        let transitions = TransitionTimes {
            first_status1: Some(at(2024, 1, 3)),
            first_status2: Some(at(2024, 1, 10)),
        };
        let timing = compute(
            Some(at(2024, 1, 1)),
            &transitions,
            false,
            date(2024, 12, 31),
            at(2024, 1, 20),
        );
        assert_eq!(timing.time_spent_days, Some(7));
        assert_eq!(timing.backlog_days, Some(17));
    }

    #[test]
    fn flag_on_uses_created_even_with_status1_present() {
        let transitions = TransitionTimes {
            first_status1: Some(at(2024, 1, 3)),
            first_status2: Some(at(2024, 1, 10)),
        };
        let timing = compute(
            Some(at(2024, 1, 1)),
            &transitions,
            true,
            date(2024, 12, 31),
            at(2024, 1, 20),
        );
        assert_eq!(timing.time_spent_days, Some(9));
    }

    #[test]
    fn absent_start_means_all_metrics_absent() {
        let transitions = TransitionTimes {
            first_status1: None,
            first_status2: Some(at(2024, 1, 10)),
        };
        let timing = compute(None, &transitions, false, date(2024, 12, 31), at(2024, 2, 1));
        assert_eq!(timing, Timing::default());
    }

    #[test]
    fn absent_status2_means_no_time_spent() {
        let transitions = TransitionTimes::default();
        let timing = compute(
            Some(at(2024, 1, 1)),
            &transitions,
            true,
            date(2024, 12, 31),
            at(2024, 1, 11),
        );
        assert!(timing.time_spent_days.is_none());
        assert_eq!(timing.backlog_days, Some(10));
    }

    #[test]
    fn backlog_floors_partial_days() {
        let transitions = TransitionTimes::default();
        let timing = compute(
            Some(at(2024, 1, 1)),
            &transitions,
            true,
            date(2024, 12, 31),
            Utc.with_ymd_and_hms(2024, 1, 4, 23, 59, 0).unwrap(),
        );
        assert_eq!(timing.backlog_days, Some(3));
    }

    #[test]
    fn future_dated_start_floors_negative_backlog() {
        let transitions = TransitionTimes::default();
        let timing = compute(
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()),
            &transitions,
            true,
            date(2024, 12, 31),
            at(2024, 1, 1),
        );
        // -1.5 days floors to -2, not -1
        assert_eq!(timing.backlog_days, Some(-2));
    }
}
