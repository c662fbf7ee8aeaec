use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::payroll::{PeriodKey, SalaryBreakdown, SalaryRecord};

/// Key-value store of salary records, at most one per (employee, month,
/// year). The occupancy check and the write happen inside one lock section,
/// so two concurrent batch runs against the same key cannot both pass the
/// "does not exist" check.
#[derive(Debug, Default)]
pub struct PayrollLedger {
    inner: RwLock<Shelves>,
}

#[derive(Debug, Default)]
struct Shelves {
    records: HashMap<u64, SalaryRecord>,
    by_key: HashMap<PeriodKey, u64>,
}

impl Shelves {
    fn next_id(&self) -> u64 {
        self.records.keys().max().map_or(1, |max| max + 1)
    }
}

impl PayrollLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly calculated payslip, failing with Conflict (carrying
    /// the existing record's id) when the period is already occupied.
    pub fn compare_and_insert(
        &self,
        key: PeriodKey,
        breakdown: SalaryBreakdown,
    ) -> Result<SalaryRecord> {
        let mut shelves = self.inner.write().map_err(poisoned)?;

        if let Some(&existing) = shelves.by_key.get(&key) {
            return Err(Error::Conflict {
                message: "salary calculation already exists for this month/year".to_string(),
                record_id: Some(existing),
            });
        }

        let record = SalaryRecord {
            id: shelves.next_id(),
            employee_id: key.employee_id,
            month: key.month,
            year: key.year,
            breakdown,
            updated_at: None,
        };
        shelves.by_key.insert(key, record.id);
        shelves.records.insert(record.id, record.clone());
        info!(record_id = record.id, %key, "Salary record created");
        Ok(record)
    }

    /// Overwrite the record for the period, keeping its id, or insert when
    /// none exists. Only reachable behind explicit caller confirmation.
    pub fn compare_and_replace(
        &self,
        key: PeriodKey,
        breakdown: SalaryBreakdown,
    ) -> Result<SalaryRecord> {
        let mut shelves = self.inner.write().map_err(poisoned)?;

        let id = match shelves.by_key.get(&key) {
            Some(&existing) => existing,
            None => shelves.next_id(),
        };
        let replacing = shelves.records.contains_key(&id);
        let record = SalaryRecord {
            id,
            employee_id: key.employee_id,
            month: key.month,
            year: key.year,
            breakdown,
            updated_at: replacing.then(Utc::now),
        };
        shelves.by_key.insert(key, id);
        shelves.records.insert(id, record.clone());
        info!(record_id = id, %key, replaced = replacing, "Salary record stored");
        Ok(record)
    }

    pub fn exists(&self, key: PeriodKey) -> Result<Option<u64>> {
        Ok(self.inner.read().map_err(poisoned)?.by_key.get(&key).copied())
    }

    pub fn get(&self, key: PeriodKey) -> Result<SalaryRecord> {
        let shelves = self.inner.read().map_err(poisoned)?;
        shelves
            .by_key
            .get(&key)
            .and_then(|id| shelves.records.get(id))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("salary record for {key}")))
    }

    pub fn get_by_id(&self, id: u64) -> Result<SalaryRecord> {
        self.inner
            .read()
            .map_err(poisoned)?
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("salary record {id}")))
    }

    pub fn remove_by_id(&self, id: u64) -> Result<()> {
        let mut shelves = self.inner.write().map_err(poisoned)?;
        let record = shelves
            .records
            .remove(&id)
            .ok_or_else(|| Error::not_found(format!("salary record {id}")))?;
        shelves.by_key.remove(&record.key());
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<SalaryRecord>> {
        let shelves = self.inner.read().map_err(poisoned)?;
        let mut records: Vec<_> = shelves.records.values().cloned().collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    /// All records of one pay period.
    pub fn list_period(&self, month: u32, year: i32) -> Result<Vec<SalaryRecord>> {
        let shelves = self.inner.read().map_err(poisoned)?;
        let mut records: Vec<_> = shelves
            .records
            .values()
            .filter(|record| record.month == month && record.year == year)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::Storage("payroll ledger lock poisoned".to_string())
}
