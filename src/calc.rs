//! The payroll calculator: one pure function from a normalized input to a
//! fully itemized payslip. No I/O and no failure modes; missing inputs
//! default to zero and the arithmetic degrades gracefully (zero gross,
//! zero pay).

use chrono::Utc;
use serde::Deserialize;

use crate::config::{PayrollPolicy, TaxBracket};
use crate::model::employee::{Allowances, EmployeeProfile};
use crate::model::payroll::SalaryBreakdown;

/// Canonical calculator input, assembled by the caller. There is exactly one
/// shape: allowances live here and nowhere else.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryInput {
    pub fullname: String,
    /// Monthly gross base, before probation scaling.
    #[serde(default)]
    pub gross_salary: f64,
    /// Expected working days this period.
    #[serde(default)]
    pub working_days: f64,
    /// Absence count, possibly fractional in 0.5 steps.
    #[serde(default)]
    pub days_off: f64,
    #[serde(default)]
    pub dependents: u32,
    #[serde(default)]
    pub allowances: Allowances,
    #[serde(default)]
    pub ot_time_soon: f64,
    #[serde(default)]
    pub ot_time_late: f64,
    #[serde(default)]
    pub bonus: f64,
    #[serde(default)]
    pub is_probation: bool,
    #[serde(default)]
    pub is_vietnamese: bool,
}

impl SalaryInput {
    /// Seed the profile-owned fields; period inputs stay zero until the
    /// caller merges them in.
    pub fn for_employee(profile: &EmployeeProfile) -> Self {
        SalaryInput {
            fullname: profile.fullname.clone(),
            gross_salary: profile.salary,
            dependents: profile.dependents,
            allowances: profile.allowances.clone(),
            is_probation: profile.is_probation(),
            is_vietnamese: profile.is_vietnamese(),
            ..Default::default()
        }
    }
}

pub fn calculate_salary(input: &SalaryInput, policy: &PayrollPolicy) -> SalaryBreakdown {
    let a = &input.allowances;

    let effective_gross = if input.is_probation {
        input.gross_salary * policy.probation_factor
    } else {
        input.gross_salary
    };

    // Guard against division by zero
    let hourly_rate = if input.working_days > 0.0 {
        effective_gross / (input.working_days * policy.hours_per_day)
    } else {
        0.0
    };

    let money_of_ot_time_soon = input.ot_time_soon * policy.ot_soon_multiplier * hourly_rate;
    let money_of_ot_time_late = input.ot_time_late * policy.ot_late_multiplier * hourly_rate;
    let total_overtime = money_of_ot_time_soon + money_of_ot_time_late;

    // Linear proration by days actually worked.
    let adjusted_salary = if input.working_days > 0.0 {
        (effective_gross / input.working_days) * (input.working_days - input.days_off)
    } else {
        0.0
    };

    // Statutory contributions are assessed on the nominal gross, each capped
    // at its policy ceiling.
    let health_insurance =
        input.gross_salary.min(policy.health_insurance_cap) * policy.health_insurance_rate;
    let social_insurance =
        input.gross_salary.min(policy.social_insurance_cap) * policy.social_insurance_rate;
    let accident_insurance = if input.is_vietnamese {
        input.gross_salary.min(policy.accident_insurance_cap) * policy.accident_insurance_rate
    } else {
        0.0
    };
    let total_insurance = health_insurance + social_insurance + accident_insurance;

    let personal_relief = policy.personal_relief + policy.dependent_relief * input.dependents as f64;

    // Transport/location allowances are fully taxable; food and clothes only
    // above their exemption thresholds. Overtime pay and bonus are taxable in
    // full. Never negative.
    let taxable_income = (adjusted_salary - total_insurance - personal_relief
        + a.parking
        + a.fuel
        + a.house_rent
        + a.phone
        + (a.food - policy.food_exemption).max(0.0)
        + (a.clothes - policy.clothes_exemption).max(0.0)
        + total_overtime
        + input.bonus)
        .max(0.0);

    let total_tax = progressive_tax(taxable_income, &policy.tax_brackets);

    let total_benefits = a.total();

    // Food and clothes are paid out in full; only their exempt-excess was
    // taxed above.
    let net_salary = adjusted_salary + a.food + a.clothes - total_tax - total_insurance
        + a.parking
        + a.fuel
        + a.house_rent
        + a.phone
        + total_overtime
        + input.bonus;

    SalaryBreakdown {
        fullname: input.fullname.clone(),
        gross_salary: effective_gross,
        work_days: input.working_days - input.days_off,
        adjusted_salary,
        ot_time_soon: input.ot_time_soon,
        ot_time_late: input.ot_time_late,
        money_of_ot_time_soon,
        money_of_ot_time_late,
        total_overtime,
        food: a.food,
        clothes: a.clothes,
        parking: a.parking,
        fuel: a.fuel,
        house_rent: a.house_rent,
        phone: a.phone,
        total_benefits,
        health_insurance,
        social_insurance,
        accident_insurance,
        total_insurance,
        taxable_income,
        total_tax,
        bonus: input.bonus,
        net_salary,
        is_probation: input.is_probation,
        is_vietnamese: input.is_vietnamese,
        calculated_at: Utc::now(),
    }
}

/// Standard marginal-bracket integration: each bracket the income reaches
/// contributes its rate times the portion of income inside it.
fn progressive_tax(taxable_income: f64, brackets: &[TaxBracket]) -> f64 {
    let mut total_tax = 0.0;
    for bracket in brackets {
        if taxable_income >= bracket.from {
            let upper = bracket.to.unwrap_or(f64::INFINITY);
            let portion = if taxable_income < upper {
                taxable_income - bracket.from
            } else {
                upper - bracket.from
            };
            total_tax += portion * bracket.rate / 100.0;
        }
    }
    total_tax
}
