use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The six fixed monthly stipends. Parking, fuel, house rent and phone are
/// fully taxable; food and clothes are exempt up to the policy thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allowances {
    #[serde(default)]
    pub food: f64,
    #[serde(default)]
    pub clothes: f64,
    #[serde(default)]
    pub parking: f64,
    #[serde(default)]
    pub fuel: f64,
    #[serde(default)]
    pub house_rent: f64,
    #[serde(default)]
    pub phone: f64,
}

impl Allowances {
    pub fn total(&self) -> f64 {
        self.food + self.clothes + self.parking + self.fuel + self.house_rent + self.phone
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Probation {
    Yes,
    #[default]
    No,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    pub id: u64,
    pub fullname: String,

    /// Monthly gross base salary.
    #[serde(default)]
    pub salary: f64,

    #[serde(default)]
    pub dependents: u32,

    #[serde(default)]
    pub probation: Probation,

    /// Free text; only "vietnamese" (case-insensitive) switches on the
    /// accident/unemployment contribution.
    #[serde(default = "default_nationality")]
    pub nationality: String,

    #[serde(default)]
    pub allowances: Allowances,
}

pub(crate) fn default_nationality() -> String {
    "vietnamese".to_string()
}

impl EmployeeProfile {
    pub fn is_probation(&self) -> bool {
        self.probation == Probation::Yes
    }

    pub fn is_vietnamese(&self) -> bool {
        self.nationality.eq_ignore_ascii_case("vietnamese")
    }
}
