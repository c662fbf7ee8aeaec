//! Turns raw attendance records into the working-day statistics the payroll
//! calculator consumes.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, error};

use crate::model::attendance::{AttendanceRecord, AttendanceStats};
use crate::store::attendance::AttendanceLedger;

/// A day counts in full from this many worked hours.
const FULL_DAY_HOURS: f64 = 7.0;
/// Between this and the full-day threshold, the day counts half.
const HALF_DAY_HOURS: f64 = 4.0;

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of working days (Monday to Friday) in a month. No holiday
/// calendar, weekend exclusion only.
pub fn working_days_in_month(month: u32, year: i32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };

    let mut date = first;
    let mut working_days = 0;
    while date.month() == month {
        if is_weekday(date) {
            working_days += 1;
        }
        let Some(next) = date.succ_opt() else { break };
        date = next;
    }
    working_days
}

/// Derive the month's statistics from its attendance records.
///
/// When the target month is still in progress (relative to `as_of`) and
/// `project_future` is on, every weekday strictly after `as_of` is counted
/// as a presumptively worked full day, so the stats are a forecast until
/// the month closes.
pub fn analyze(
    records: &[AttendanceRecord],
    month: u32,
    year: i32,
    as_of: NaiveDate,
    project_future: bool,
) -> AttendanceStats {
    let mut full_days = 0u32;
    let mut half_days = 0u32;

    for record in records
        .iter()
        .filter(|record| record.date.month() == month && record.date.year() == year)
    {
        if record.working_hours >= FULL_DAY_HOURS {
            full_days += 1;
        } else if record.working_hours >= HALF_DAY_HOURS {
            half_days += 1;
        }
        // Below the half-day threshold (or still open) the day simply does
        // not count.
    }

    let total_working_days = working_days_in_month(month, year);

    let is_current_month = as_of.month() == month && as_of.year() == year;
    if is_current_month && project_future {
        let mut projected = 0u32;
        let mut date = as_of;
        while let Some(next) = date.succ_opt() {
            if next.month() != month || next.year() != year {
                break;
            }
            if is_weekday(next) {
                projected += 1;
            }
            date = next;
        }
        full_days += projected;
        debug!(
            projected,
            month, year, "Counting remaining weekdays as full attendance"
        );
    }

    let work_days = full_days as f64 + half_days as f64 * 0.5;

    AttendanceStats {
        full_days,
        half_days,
        work_days,
        absences: total_working_days as f64 - work_days,
        total_working_days,
    }
}

/// Ledger-backed variant used by the batch orchestrator. An unreadable
/// ledger degrades to zeroed stats with the calendar part still correct,
/// never an error to the caller.
pub fn monthly_stats(
    ledger: &AttendanceLedger,
    employee_id: u64,
    month: u32,
    year: i32,
    as_of: NaiveDate,
    project_future: bool,
) -> AttendanceStats {
    match ledger.records_for_month(employee_id, month, year) {
        Ok(records) => analyze(&records, month, year, as_of, project_future),
        Err(e) => {
            error!(error = %e, employee_id, month, year, "Attendance unreadable, zeroing stats");
            AttendanceStats {
                total_working_days: working_days_in_month(month, year),
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{AttendanceStatus, CheckEvent};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn record(employee_id: u64, date: NaiveDate, working_hours: f64) -> AttendanceRecord {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id,
            date,
            check_in: CheckEvent::default(),
            check_out: CheckEvent::default(),
            working_hours,
            overtime: 0.0,
            status: AttendanceStatus::Present,
            created_at,
            updated_at: created_at,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_counts_for_known_months() {
        assert_eq!(working_days_in_month(6, 2024), 20);
        assert_eq!(working_days_in_month(3, 2025), 21);
        assert_eq!(working_days_in_month(2, 2025), 20);
        assert_eq!(working_days_in_month(13, 2025), 0);
    }

    #[test]
    fn classification_thresholds() {
        // Closed month: March 2025, viewed from April.
        let as_of = day(2025, 4, 10);
        let records = vec![
            record(1, day(2025, 3, 3), 8.0), // full
            record(1, day(2025, 3, 4), 5.0), // half
            record(1, day(2025, 3, 5), 2.0), // neither
            record(1, day(2025, 3, 6), 7.0), // full, boundary
            record(1, day(2025, 3, 7), 4.0), // half, boundary
        ];
        let stats = analyze(&records, 3, 2025, as_of, true);

        assert_eq!(stats.full_days, 2);
        assert_eq!(stats.half_days, 2);
        assert_eq!(stats.work_days, 3.0);
        assert_eq!(stats.total_working_days, 21);
        assert_eq!(stats.absences, 18.0);
    }

    #[test]
    fn other_months_records_are_ignored() {
        let records = vec![
            record(1, day(2025, 2, 28), 8.0),
            record(1, day(2025, 3, 3), 8.0),
        ];
        let stats = analyze(&records, 3, 2025, day(2025, 4, 1), true);
        assert_eq!(stats.full_days, 1);
    }

    #[test]
    fn current_month_projects_remaining_weekdays() {
        // As of Monday 2025-03-10: the 11th through the 31st hold 15
        // remaining weekdays.
        let as_of = day(2025, 3, 10);
        let records = vec![
            record(1, day(2025, 3, 3), 8.0),
            record(1, day(2025, 3, 4), 5.0),
        ];
        let stats = analyze(&records, 3, 2025, as_of, true);

        assert_eq!(stats.full_days, 1 + 15);
        assert_eq!(stats.work_days, 16.5);
        assert_eq!(stats.absences, 21.0 - 16.5);
    }

    #[test]
    fn projection_can_be_disabled() {
        let as_of = day(2025, 3, 10);
        let records = vec![record(1, day(2025, 3, 3), 8.0)];
        let stats = analyze(&records, 3, 2025, as_of, false);
        assert_eq!(stats.full_days, 1);
    }

    #[test]
    fn last_day_of_month_projects_nothing() {
        let stats = analyze(&[], 3, 2025, day(2025, 3, 31), true);
        assert_eq!(stats.full_days, 0);
    }

    #[test]
    fn ledger_backed_stats_match_analyze() {
        let ledger = AttendanceLedger::new();
        let morning = Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2025, 3, 3, 16, 0, 0).unwrap();
        ledger.check_in(1, morning, "").unwrap();
        ledger.check_out(1, evening, "").unwrap();

        let stats = monthly_stats(&ledger, 1, 3, 2025, day(2025, 4, 1), true);
        assert_eq!(stats.full_days, 1);
        assert_eq!(stats.total_working_days, 21);

        // Unknown employee: an empty slice, not an error.
        let empty = monthly_stats(&ledger, 9, 3, 2025, day(2025, 4, 1), true);
        assert_eq!(empty.work_days, 0.0);
        assert_eq!(empty.absences, 21.0);
    }
}
