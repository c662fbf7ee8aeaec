use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Uniqueness key of the payroll ledger: at most one salary record per
/// employee per month unless the caller explicitly overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display(fmt = "employee {} period {}/{}", employee_id, month, year)]
#[serde(rename_all = "camelCase")]
pub struct PeriodKey {
    pub employee_id: u64,
    pub month: u32,
    pub year: i32,
}

/// The full itemized payslip produced by the calculator. Field names mirror
/// the wire shape export sinks and the presentation layer consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    pub fullname: String,
    /// Effective gross: base salary after probation scaling.
    pub gross_salary: f64,
    /// Days actually worked: working days minus days off.
    pub work_days: f64,
    pub adjusted_salary: f64,

    pub ot_time_soon: f64,
    pub ot_time_late: f64,
    pub money_of_ot_time_soon: f64,
    pub money_of_ot_time_late: f64,
    pub total_overtime: f64,

    pub food: f64,
    pub clothes: f64,
    pub parking: f64,
    pub fuel: f64,
    pub house_rent: f64,
    pub phone: f64,
    /// Nominal sum of the six allowances, pre tax adjustment, for display.
    pub total_benefits: f64,

    pub health_insurance: f64,
    pub social_insurance: f64,
    pub accident_insurance: f64,
    pub total_insurance: f64,

    pub taxable_income: f64,
    pub total_tax: f64,

    pub bonus: f64,
    pub net_salary: f64,

    pub is_probation: bool,
    pub is_vietnamese: bool,
    pub calculated_at: DateTime<Utc>,
}

/// A stored payslip: a point-in-time snapshot that does not back-reference
/// mutable employee state after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    pub id: u64,
    pub employee_id: u64,
    pub month: u32,
    pub year: i32,
    #[serde(flatten)]
    pub breakdown: SalaryBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SalaryRecord {
    pub fn key(&self) -> PeriodKey {
        PeriodKey {
            employee_id: self.employee_id,
            month: self.month,
            year: self.year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_key_display_names_employee_and_period() {
        let key = PeriodKey {
            employee_id: 12,
            month: 3,
            year: 2025,
        };
        assert_eq!(key.to_string(), "employee 12 period 3/2025");
    }
}
