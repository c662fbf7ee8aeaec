//! Employee payroll core: attendance ledger, working-day analysis, the
//! salary calculator, the period-keyed payroll ledger, and the batch
//! orchestrator that ties them together. HTTP, auth, and export encodings
//! live in the embedding application.

pub mod batch;
pub mod calc;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod store;
pub mod utils;

pub use batch::{BatchOrchestrator, BatchOutcome, BatchRequest};
pub use calc::{SalaryInput, calculate_salary};
pub use config::{DEFAULT_POLICY, PayrollPolicy};
pub use error::{Error, Result};
pub use model::attendance::{AttendanceRecord, AttendanceStats};
pub use model::employee::{Allowances, EmployeeProfile};
pub use model::payroll::{PeriodKey, SalaryRecord};
pub use store::attendance::AttendanceLedger;
pub use store::employee::EmployeeDirectory;
pub use store::payroll::PayrollLedger;
