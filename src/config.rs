use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One marginal tax bracket. `to == None` means open-ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxBracket {
    pub from: f64,
    pub to: Option<f64>,
    /// Marginal rate in percent (5 means 5%).
    pub rate: f64,
}

impl TaxBracket {
    fn new(from: f64, to: Option<f64>, rate: f64) -> Self {
        TaxBracket { from, to, rate }
    }
}

/// Jurisdictional payroll rules, injected into the calculator so rule
/// changes never touch calculation logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollPolicy {
    pub tax_brackets: Vec<TaxBracket>,

    pub social_insurance_cap: f64,
    pub health_insurance_cap: f64,
    pub accident_insurance_cap: f64,
    pub social_insurance_rate: f64,
    pub health_insurance_rate: f64,
    pub accident_insurance_rate: f64,

    pub personal_relief: f64,
    pub dependent_relief: f64,

    /// Monthly tax-exempt portion of the food allowance.
    pub food_exemption: f64,
    /// Monthly tax-exempt portion of the clothes allowance (annual cap / 12).
    pub clothes_exemption: f64,

    /// Effective-gross factor applied while an employee is on probation.
    pub probation_factor: f64,

    pub ot_soon_multiplier: f64,
    pub ot_late_multiplier: f64,
    pub hours_per_day: f64,

    /// When the target period is the in-progress month, count remaining
    /// weekdays as presumptively worked full days. Stats for the current
    /// month are a forecast until the month closes.
    pub project_future_attendance: bool,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        PayrollPolicy {
            tax_brackets: vec![
                TaxBracket::new(0.0, Some(5_000_000.0), 5.0),
                TaxBracket::new(5_000_000.0, Some(10_000_000.0), 10.0),
                TaxBracket::new(10_000_000.0, Some(18_000_000.0), 15.0),
                TaxBracket::new(18_000_000.0, Some(32_000_000.0), 20.0),
                TaxBracket::new(32_000_000.0, Some(52_000_000.0), 25.0),
                TaxBracket::new(52_000_000.0, Some(80_000_000.0), 30.0),
                TaxBracket::new(80_000_000.0, None, 35.0),
            ],
            social_insurance_cap: 2_340_000.0 * 20.0,
            health_insurance_cap: 2_340_000.0 * 20.0,
            accident_insurance_cap: 4_960_000.0 * 20.0,
            social_insurance_rate: 0.08,
            health_insurance_rate: 0.015,
            accident_insurance_rate: 0.01,
            personal_relief: 11_000_000.0,
            dependent_relief: 4_400_000.0,
            food_exemption: 730_000.0,
            clothes_exemption: 5_000_000.0 / 12.0,
            probation_factor: 0.85,
            ot_soon_multiplier: 1.5,
            ot_late_multiplier: 1.8,
            hours_per_day: 8.0,
            project_future_attendance: true,
        }
    }
}

impl PayrollPolicy {
    /// Load scalar overrides from the environment on top of the defaults.
    /// The bracket table itself has no env form; deploys that need a
    /// different schedule construct the policy in code.
    pub fn from_env() -> Self {
        dotenv().ok();

        let mut policy = PayrollPolicy::default();

        policy.social_insurance_cap = env_f64("SOCIAL_INSURANCE_CAP", policy.social_insurance_cap);
        policy.health_insurance_cap = env_f64("HEALTH_INSURANCE_CAP", policy.health_insurance_cap);
        policy.accident_insurance_cap =
            env_f64("ACCIDENT_INSURANCE_CAP", policy.accident_insurance_cap);
        policy.personal_relief = env_f64("PERSONAL_RELIEF", policy.personal_relief);
        policy.dependent_relief = env_f64("DEPENDENT_RELIEF", policy.dependent_relief);
        policy.food_exemption = env_f64("FOOD_EXEMPTION", policy.food_exemption);
        policy.clothes_exemption = env_f64("CLOTHES_EXEMPTION", policy.clothes_exemption);
        policy.probation_factor = env_f64("PROBATION_FACTOR", policy.probation_factor);

        policy.project_future_attendance = env::var("PROJECT_FUTURE_ATTENDANCE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(policy.project_future_attendance);

        policy
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub static DEFAULT_POLICY: Lazy<PayrollPolicy> = Lazy::new(PayrollPolicy::default);
