use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use strum_macros::Display;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, CheckEvent};

/// Hours that make up a standard day; time beyond it at check-out is
/// recorded as overtime on the record.
const STANDARD_DAY_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TodayStatus {
    NotCheckedIn,
    CheckedIn,
    CheckedOut,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    pub status: TodayStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AttendanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeMonthSummary {
    pub employee_id: u64,
    pub total_hours: f64,
    pub total_overtime: f64,
    pub present_days: u32,
    pub record_count: u32,
}

/// Check-in/check-out event store. Each employee's rows sit behind their own
/// lock so the single-open-record invariant is a guarded read-modify-write,
/// not a check racing a write.
#[derive(Debug, Default)]
pub struct AttendanceLedger {
    inner: RwLock<HashMap<u64, Arc<Mutex<Vec<AttendanceRecord>>>>>,
}

impl AttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new attendance record. Rejected while a previous one is still
    /// open; check out first.
    pub fn check_in(
        &self,
        employee_id: u64,
        at: DateTime<Utc>,
        notes: &str,
    ) -> Result<AttendanceRecord> {
        let entry = self.employee_entry(employee_id)?;
        let mut records = entry.lock().map_err(poisoned)?;

        if records.iter().any(AttendanceRecord::is_open) {
            return Err(Error::conflict(
                "already checked in, check out first",
            ));
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id,
            date: at.date_naive(),
            check_in: CheckEvent {
                time: Some(at),
                notes: notes.to_string(),
            },
            check_out: CheckEvent::default(),
            working_hours: 0.0,
            overtime: 0.0,
            status: AttendanceStatus::Incomplete,
            created_at: at,
            updated_at: at,
        };
        records.push(record.clone());
        debug!(employee_id, date = %record.date, "Checked in");
        Ok(record)
    }

    /// Close the open record, deriving working hours and overtime.
    pub fn check_out(
        &self,
        employee_id: u64,
        at: DateTime<Utc>,
        notes: &str,
    ) -> Result<AttendanceRecord> {
        let entry = self.employee_entry(employee_id)?;
        let mut records = entry.lock().map_err(poisoned)?;

        let record = records
            .iter_mut()
            .find(|record| record.is_open())
            .ok_or_else(|| Error::not_found("active check-in"))?;

        let checked_in_at = record.check_in.time.unwrap_or(at);
        let working_hours = round2((at - checked_in_at).num_seconds() as f64 / 3600.0);

        record.check_out = CheckEvent {
            time: Some(at),
            notes: notes.to_string(),
        };
        record.working_hours = working_hours;
        record.overtime = round2((working_hours - STANDARD_DAY_HOURS).max(0.0));
        record.status = AttendanceStatus::Present;
        record.updated_at = at;

        debug!(employee_id, working_hours, "Checked out");
        Ok(record.clone())
    }

    /// The month slice the attendance analyzer consumes.
    pub fn records_for_month(
        &self,
        employee_id: u64,
        month: u32,
        year: i32,
    ) -> Result<Vec<AttendanceRecord>> {
        let entry = self.employee_entry(employee_id)?;
        let records = entry.lock().map_err(poisoned)?;
        Ok(records
            .iter()
            .filter(|record| record.date.month() == month && record.date.year() == year)
            .cloned()
            .collect())
    }

    /// Attendance history, most recent first, optionally bounded to a
    /// date range (inclusive).
    pub fn history(
        &self,
        employee_id: u64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<AttendanceRecord>> {
        let entry = self.employee_entry(employee_id)?;
        let records = entry.lock().map_err(poisoned)?;
        let mut history: Vec<_> = records
            .iter()
            .filter(|record| match range {
                Some((start, end)) => record.date >= start && record.date <= end,
                None => true,
            })
            .cloned()
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(history)
    }

    pub fn day_status(&self, employee_id: u64, date: NaiveDate) -> Result<DayStatus> {
        let entry = self.employee_entry(employee_id)?;
        let records = entry.lock().map_err(poisoned)?;
        let todays = records.iter().rev().find(|record| record.date == date);

        Ok(match todays {
            None => DayStatus {
                status: TodayStatus::NotCheckedIn,
                record: None,
            },
            Some(record) if record.is_open() => DayStatus {
                status: TodayStatus::CheckedIn,
                record: Some(record.clone()),
            },
            Some(record) => DayStatus {
                status: TodayStatus::CheckedOut,
                record: Some(record.clone()),
            },
        })
    }

    /// Administrative deletion of a single record.
    pub fn remove(&self, id: Uuid) -> Result<()> {
        let map = self.inner.read().map_err(map_poisoned)?;
        for entry in map.values() {
            let mut records = entry.lock().map_err(poisoned)?;
            if let Some(index) = records.iter().position(|record| record.id == id) {
                records.remove(index);
                return Ok(());
            }
        }
        Err(Error::not_found(format!("attendance record {id}")))
    }

    /// Per-employee hour/overtime totals for one month, ordered by
    /// employee id.
    pub fn monthly_summary(&self, month: u32, year: i32) -> Result<Vec<EmployeeMonthSummary>> {
        let map = self.inner.read().map_err(map_poisoned)?;
        let mut summaries = Vec::new();

        for (&employee_id, entry) in map.iter() {
            let records = entry.lock().map_err(poisoned)?;
            let mut summary = EmployeeMonthSummary {
                employee_id,
                total_hours: 0.0,
                total_overtime: 0.0,
                present_days: 0,
                record_count: 0,
            };
            for record in records
                .iter()
                .filter(|record| record.date.month() == month && record.date.year() == year)
            {
                summary.total_hours += record.working_hours;
                summary.total_overtime += record.overtime;
                if record.status == AttendanceStatus::Present {
                    summary.present_days += 1;
                }
                summary.record_count += 1;
            }
            if summary.record_count > 0 {
                summaries.push(summary);
            }
        }

        summaries.sort_by_key(|summary| summary.employee_id);
        Ok(summaries)
    }

    fn employee_entry(&self, employee_id: u64) -> Result<Arc<Mutex<Vec<AttendanceRecord>>>> {
        if let Some(entry) = self.inner.read().map_err(map_poisoned)?.get(&employee_id) {
            return Ok(entry.clone());
        }
        let mut map = self.inner.write().map_err(map_poisoned)?;
        Ok(map.entry(employee_id).or_default().clone())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Storage("attendance records lock poisoned".to_string())
}

fn map_poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Storage("attendance ledger lock poisoned".to_string())
}
