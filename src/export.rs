//! Flattens salary records for the spreadsheet/document sinks. The sinks
//! themselves (XLSX/PDF encoders) live outside this crate; everything they
//! need is exposed here unmodified, one column per itemized figure.

use serde_json::{Map, Value, json};

use crate::model::payroll::SalaryRecord;

/// Column order and header labels of the payslip sheet. The first element
/// of each pair is the wire-format field name, the second the human header.
pub const PAYSLIP_COLUMNS: &[(&str, &str)] = &[
    ("fullname", "Full Name"),
    ("grossSalary", "Gross Salary"),
    ("workDays", "Working Days"),
    ("adjustedSalary", "Adjusted Salary"),
    ("food", "Food"),
    ("clothes", "Clothes"),
    ("parking", "Parking"),
    ("fuel", "Fuel"),
    ("houseRent", "House Rent"),
    ("phone", "Phone"),
    ("totalBenefits", "Total Benefits"),
    ("healthInsurance", "Health Insurance"),
    ("socialInsurance", "Social Insurance"),
    ("accidentInsurance", "Unemployment Insurance"),
    ("totalInsurance", "Total Insurance"),
    ("incomeTax", "Income Tax"),
    ("totalTax", "Total Tax"),
    ("totalOvertime", "Total Overtime"),
    ("bonus", "Bonus"),
    ("netSalary", "Net Salary"),
];

pub fn headers() -> Vec<&'static str> {
    PAYSLIP_COLUMNS.iter().map(|(_, header)| *header).collect()
}

/// One row per record, values in [`PAYSLIP_COLUMNS`] order. `incomeTax` is
/// the taxable-income base, clamped at zero for legacy rows that stored a
/// negative figure.
pub fn payslip_rows(records: &[SalaryRecord]) -> Vec<Vec<Value>> {
    records
        .iter()
        .map(|record| {
            let flat: Map<String, Value> = match serde_json::to_value(record) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            };
            PAYSLIP_COLUMNS
                .iter()
                .map(|(field, _)| match *field {
                    "incomeTax" => json!(record.breakdown.taxable_income.max(0.0)),
                    name => flat.get(name).cloned().unwrap_or(Value::Null),
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::{SalaryInput, calculate_salary};
    use crate::config::DEFAULT_POLICY;
    use crate::model::payroll::{PeriodKey, SalaryBreakdown};

    fn record() -> SalaryRecord {
        let breakdown: SalaryBreakdown = calculate_salary(
            &SalaryInput {
                fullname: "Nguyen Van A".to_string(),
                gross_salary: 20_000_000.0,
                working_days: 22.0,
                dependents: 1,
                is_vietnamese: true,
                ..Default::default()
            },
            &DEFAULT_POLICY,
        );
        let key = PeriodKey {
            employee_id: 1,
            month: 3,
            year: 2025,
        };
        SalaryRecord {
            id: 1,
            employee_id: key.employee_id,
            month: key.month,
            year: key.year,
            breakdown,
            updated_at: None,
        }
    }

    #[test]
    fn rows_line_up_with_headers() {
        let rows = payslip_rows(&[record()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), headers().len());
        assert!(!rows[0].iter().any(Value::is_null));
    }

    #[test]
    fn every_itemized_figure_is_exposed_unmodified() {
        let record = record();
        let rows = payslip_rows(&[record.clone()]);
        let row = &rows[0];

        assert_eq!(row[0], json!("Nguyen Van A"));
        assert_eq!(row[1], json!(record.breakdown.gross_salary));
        assert_eq!(row[2], json!(22.0));
        assert_eq!(row[14], json!(2_100_000.0));
        assert_eq!(row[15], json!(2_500_000.0));
        assert_eq!(row[16], json!(125_000.0));
        assert_eq!(row[19], json!(17_775_000.0));
    }
}
