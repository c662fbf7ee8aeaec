use std::collections::HashMap;
use std::sync::RwLock;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::employee::{Allowances, EmployeeProfile, Probation, default_nationality};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub fullname: String,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub dependents: u32,
    #[serde(default)]
    pub probation: Probation,
    #[serde(default = "default_nationality")]
    pub nationality: String,
    #[serde(default)]
    pub allowances: Allowances,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    pub fullname: Option<String>,
    pub salary: Option<f64>,
    pub dependents: Option<u32>,
    pub probation: Option<Probation>,
    pub nationality: Option<String>,
    pub allowances: Option<Allowances>,
}

/// The single source of truth for salary base and allowances. The payroll
/// side only ever reads it.
#[derive(Debug, Default)]
pub struct EmployeeDirectory {
    inner: RwLock<HashMap<u64, EmployeeProfile>>,
}

impl EmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, new: NewEmployee) -> Result<EmployeeProfile> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let id = map.keys().max().map_or(1, |max| max + 1);
        let profile = EmployeeProfile {
            id,
            fullname: new.fullname,
            salary: new.salary,
            dependents: new.dependents,
            probation: new.probation,
            nationality: new.nationality,
            allowances: new.allowances,
        };
        map.insert(id, profile.clone());
        info!(employee_id = id, "Employee created");
        Ok(profile)
    }

    pub fn get(&self, id: u64) -> Result<EmployeeProfile> {
        self.inner
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("employee {id}")))
    }

    pub fn update(&self, id: u64, patch: UpdateEmployee) -> Result<EmployeeProfile> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let profile = map
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("employee {id}")))?;

        if let Some(fullname) = patch.fullname {
            profile.fullname = fullname;
        }
        if let Some(salary) = patch.salary {
            profile.salary = salary;
        }
        if let Some(dependents) = patch.dependents {
            profile.dependents = dependents;
        }
        if let Some(probation) = patch.probation {
            profile.probation = probation;
        }
        if let Some(nationality) = patch.nationality {
            profile.nationality = nationality;
        }
        if let Some(allowances) = patch.allowances {
            profile.allowances = allowances;
        }

        Ok(profile.clone())
    }

    pub fn remove(&self, id: u64) -> Result<()> {
        self.inner
            .write()
            .map_err(poisoned)?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("employee {id}")))
    }

    pub fn list(&self) -> Result<Vec<EmployeeProfile>> {
        let mut employees: Vec<_> = self.inner.read().map_err(poisoned)?.values().cloned().collect();
        employees.sort_by_key(|employee| employee.id);
        Ok(employees)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Storage("employee directory lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_employee(name: &str, salary: f64) -> NewEmployee {
        NewEmployee {
            fullname: name.to_string(),
            salary,
            dependents: 0,
            probation: Probation::No,
            nationality: default_nationality(),
            allowances: Allowances::default(),
        }
    }

    #[test]
    fn ids_are_assigned_sequentially() {
        let directory = EmployeeDirectory::new();
        let first = directory.insert(new_employee("A", 1.0)).unwrap();
        let second = directory.insert(new_employee("B", 2.0)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        directory.remove(second.id).unwrap();
        let third = directory.insert(new_employee("C", 3.0)).unwrap();
        assert_eq!(third.id, 2);
    }

    #[test]
    fn update_patches_only_given_fields() {
        let directory = EmployeeDirectory::new();
        let employee = directory.insert(new_employee("A", 5_000_000.0)).unwrap();

        let updated = directory
            .update(
                employee.id,
                UpdateEmployee {
                    salary: Some(6_000_000.0),
                    probation: Some(Probation::Yes),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.fullname, "A");
        assert_eq!(updated.salary, 6_000_000.0);
        assert!(updated.is_probation());
    }

    #[test]
    fn missing_employee_is_not_found() {
        let directory = EmployeeDirectory::new();
        assert!(matches!(directory.get(99), Err(Error::NotFound(_))));
        assert!(matches!(directory.remove(99), Err(Error::NotFound(_))));
    }
}
