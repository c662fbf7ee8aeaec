use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckEvent {
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    /// Checked in, not yet checked out.
    Incomplete,
    Present,
}

/// One check-in event and its (eventual) check-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub check_in: CheckEvent,
    pub check_out: CheckEvent,
    /// Hours between check-in and check-out, set at check-out.
    pub working_hours: f64,
    /// Hours beyond the standard day, set at check-out.
    pub overtime: f64,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out.time.is_none()
    }
}

/// Working-day statistics for one employee and month. Derived on demand,
/// never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub full_days: u32,
    pub half_days: u32,
    /// full_days + 0.5 * half_days
    pub work_days: f64,
    /// total_working_days - work_days
    pub absences: f64,
    /// Mon-Fri calendar days in the month.
    pub total_working_days: u32,
}
