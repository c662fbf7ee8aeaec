//! Computes salary for a set of employees in one request. Each employee
//! independently succeeds or fails; the batch aborts up front only on
//! request-level validation.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calc::{SalaryInput, calculate_salary};
use crate::config::PayrollPolicy;
use crate::error::{Error, Result};
use crate::model::payroll::{PeriodKey, SalaryRecord};
use crate::store::attendance::AttendanceLedger;
use crate::store::employee::EmployeeDirectory;
use crate::store::payroll::PayrollLedger;
use crate::utils::analyzer::monthly_stats;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub employee_ids: Vec<u64>,
    pub month: u32,
    pub year: i32,

    /// Manual overrides; absent, the attendance analyzer supplies both.
    #[serde(default)]
    pub working_days: Option<f64>,
    #[serde(default)]
    pub days_off: Option<f64>,

    /// Applied uniformly to every selected employee.
    #[serde(default)]
    pub overtime_soon_hours: f64,
    #[serde(default)]
    pub overtime_late_hours: f64,
    #[serde(default)]
    pub bonus: f64,

    /// Without this, an occupied period is rejected, never overwritten.
    #[serde(default)]
    pub confirm_overwrite: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemError {
    pub employee_id: u64,
    pub message: String,
    /// Set on conflicts so the caller can re-invoke with confirmation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// True when at least one employee went through.
    pub success: bool,
    pub results: Vec<SalaryRecord>,
    pub errors: Vec<BatchItemError>,
}

pub struct BatchOrchestrator {
    directory: Arc<EmployeeDirectory>,
    attendance: Arc<AttendanceLedger>,
    payroll: Arc<PayrollLedger>,
    policy: PayrollPolicy,
}

impl BatchOrchestrator {
    pub fn new(
        directory: Arc<EmployeeDirectory>,
        attendance: Arc<AttendanceLedger>,
        payroll: Arc<PayrollLedger>,
        policy: PayrollPolicy,
    ) -> Self {
        BatchOrchestrator {
            directory,
            attendance,
            payroll,
            policy,
        }
    }

    pub fn run(&self, request: &BatchRequest) -> Result<BatchOutcome> {
        self.run_at(request, Local::now().date_naive())
    }

    /// `as_of` anchors the analyzer's current-month projection.
    pub fn run_at(&self, request: &BatchRequest, as_of: NaiveDate) -> Result<BatchOutcome> {
        if request.employee_ids.is_empty() {
            return Err(Error::InvalidInput(
                "employeeIds, month and year are required".to_string(),
            ));
        }
        if !(1..=12).contains(&request.month) {
            return Err(Error::InvalidInput(format!(
                "month {} is out of range",
                request.month
            )));
        }

        let mut results = Vec::new();
        let mut errors = Vec::new();

        for &employee_id in &request.employee_ids {
            match self.process_employee(employee_id, request, as_of) {
                Ok(record) => results.push(record),
                Err(e) => {
                    warn!(error = %e, employee_id, "Skipping employee in batch");
                    errors.push(BatchItemError {
                        employee_id,
                        record_id: e.conflict_record(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            month = request.month,
            year = request.year,
            calculated = results.len(),
            failed = errors.len(),
            "Batch salary calculation finished"
        );

        Ok(BatchOutcome {
            success: !results.is_empty(),
            results,
            errors,
        })
    }

    fn process_employee(
        &self,
        employee_id: u64,
        request: &BatchRequest,
        as_of: NaiveDate,
    ) -> Result<SalaryRecord> {
        let profile = self.directory.get(employee_id)?;

        let key = PeriodKey {
            employee_id,
            month: request.month,
            year: request.year,
        };

        if !request.confirm_overwrite {
            if let Some(existing) = self.payroll.exists(key)? {
                return Err(Error::Conflict {
                    message: "salary calculation already exists for this month/year".to_string(),
                    record_id: Some(existing),
                });
            }
        }

        // Working-day inputs: explicit override, else attendance-derived.
        let (working_days, days_off) = match request.working_days {
            Some(working_days) => (working_days, request.days_off.unwrap_or(0.0)),
            None => {
                let stats = monthly_stats(
                    &self.attendance,
                    employee_id,
                    request.month,
                    request.year,
                    as_of,
                    self.policy.project_future_attendance,
                );
                (
                    stats.total_working_days as f64,
                    request.days_off.unwrap_or(stats.absences),
                )
            }
        };

        let input = SalaryInput {
            working_days,
            days_off,
            ot_time_soon: request.overtime_soon_hours,
            ot_time_late: request.overtime_late_hours,
            bonus: request.bonus,
            ..SalaryInput::for_employee(&profile)
        };
        let breakdown = calculate_salary(&input, &self.policy);

        // The ledger's compare-and-set remains the authoritative uniqueness
        // gate under concurrent requests.
        if request.confirm_overwrite {
            self.payroll.compare_and_replace(key, breakdown)
        } else {
            self.payroll.compare_and_insert(key, breakdown)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PayrollPolicy;
    use crate::model::employee::{Allowances, Probation};
    use crate::store::employee::NewEmployee;
    use chrono::{TimeZone, Utc};

    fn orchestrator() -> BatchOrchestrator {
        BatchOrchestrator::new(
            Arc::new(EmployeeDirectory::new()),
            Arc::new(AttendanceLedger::new()),
            Arc::new(PayrollLedger::new()),
            PayrollPolicy::default(),
        )
    }

    fn seed_employee(orchestrator: &BatchOrchestrator, name: &str, salary: f64) -> u64 {
        orchestrator
            .directory
            .insert(NewEmployee {
                fullname: name.to_string(),
                salary,
                dependents: 1,
                probation: Probation::No,
                nationality: "vietnamese".to_string(),
                allowances: Allowances::default(),
            })
            .unwrap()
            .id
    }

    fn request(ids: Vec<u64>) -> BatchRequest {
        BatchRequest {
            employee_ids: ids,
            month: 3,
            year: 2025,
            working_days: Some(22.0),
            days_off: None,
            overtime_soon_hours: 0.0,
            overtime_late_hours: 0.0,
            bonus: 0.0,
            confirm_overwrite: false,
        }
    }

    fn april() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    #[test]
    fn empty_employee_list_rejects_the_whole_request() {
        let result = orchestrator().run_at(&request(vec![]), april());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn out_of_range_month_rejects_the_whole_request() {
        let mut bad = request(vec![1]);
        bad.month = 13;
        let result = orchestrator().run_at(&bad, april());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn reference_scenario_end_to_end() {
        let orchestrator = orchestrator();
        let id = seed_employee(&orchestrator, "Nguyen Van A", 20_000_000.0);

        let outcome = orchestrator.run_at(&request(vec![id]), april()).unwrap();
        assert!(outcome.success);
        assert!(outcome.errors.is_empty());

        let record = &outcome.results[0];
        assert_eq!(record.breakdown.total_tax, 125_000.0);
        assert_eq!(record.breakdown.net_salary, 17_775_000.0);
        assert_eq!(
            orchestrator.payroll.get(record.key()).unwrap().id,
            record.id
        );
    }

    #[test]
    fn missing_employees_fail_item_wise_not_batch_wise() {
        let orchestrator = orchestrator();
        let id = seed_employee(&orchestrator, "A", 10_000_000.0);

        let outcome = orchestrator.run_at(&request(vec![id, 999]), april()).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].employee_id, 999);
        assert!(outcome.errors[0].message.contains("not found"));
    }

    #[test]
    fn second_run_conflicts_and_leaves_record_unchanged() {
        let orchestrator = orchestrator();
        let id = seed_employee(&orchestrator, "A", 10_000_000.0);

        let first = orchestrator.run_at(&request(vec![id]), april()).unwrap();
        let stored = first.results[0].clone();

        let second = orchestrator.run_at(&request(vec![id]), april()).unwrap();
        assert!(!second.success);
        assert_eq!(second.errors.len(), 1);
        assert_eq!(second.errors[0].record_id, Some(stored.id));
        assert!(second.errors[0].message.contains("already exists"));

        assert_eq!(orchestrator.payroll.get(stored.key()).unwrap(), stored);
    }

    #[test]
    fn confirmed_overwrite_recomputes_in_place() {
        let orchestrator = orchestrator();
        let id = seed_employee(&orchestrator, "A", 10_000_000.0);

        let first = orchestrator.run_at(&request(vec![id]), april()).unwrap();
        let original = first.results[0].clone();

        orchestrator
            .directory
            .update(
                id,
                crate::store::employee::UpdateEmployee {
                    salary: Some(12_000_000.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let mut confirmed = request(vec![id]);
        confirmed.confirm_overwrite = true;
        let outcome = orchestrator.run_at(&confirmed, april()).unwrap();
        assert!(outcome.success);

        let replaced = &outcome.results[0];
        assert_eq!(replaced.id, original.id);
        assert!(replaced.updated_at.is_some());
        assert!(replaced.breakdown.adjusted_salary > original.breakdown.adjusted_salary);
    }

    #[test]
    fn attendance_feeds_working_days_when_not_overridden() {
        let orchestrator = orchestrator();
        let id = seed_employee(&orchestrator, "A", 21_000_000.0);

        // One full day worked in March 2025; the other 20 weekdays are
        // absences once the month is over.
        let morning = Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2025, 3, 3, 16, 0, 0).unwrap();
        orchestrator.attendance.check_in(id, morning, "").unwrap();
        orchestrator.attendance.check_out(id, evening, "").unwrap();

        let mut from_ledger = request(vec![id]);
        from_ledger.working_days = None;

        let outcome = orchestrator.run_at(&from_ledger, april()).unwrap();
        let record = &outcome.results[0];
        assert_eq!(record.breakdown.work_days, 1.0);
        assert_eq!(record.breakdown.adjusted_salary, 1_000_000.0);
    }

    #[test]
    fn uniform_overtime_and_bonus_apply_to_every_employee() {
        let orchestrator = orchestrator();
        let a = seed_employee(&orchestrator, "A", 8_800_000.0);
        let b = seed_employee(&orchestrator, "B", 17_600_000.0);

        let mut with_extras = request(vec![a, b]);
        with_extras.overtime_soon_hours = 8.0;
        with_extras.bonus = 500_000.0;

        let outcome = orchestrator.run_at(&with_extras, april()).unwrap();
        assert_eq!(outcome.results.len(), 2);
        for record in &outcome.results {
            assert_eq!(record.breakdown.ot_time_soon, 8.0);
            assert_eq!(record.breakdown.bonus, 500_000.0);
            assert!(record.breakdown.total_overtime > 0.0);
        }
    }
}
