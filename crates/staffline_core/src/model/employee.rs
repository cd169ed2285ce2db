//! Employee and department identity records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Numeric employee identifier (`emp_no`).
pub type EmployeeId = i64;

/// Department reference code (`dept_no`), e.g. `d005`.
pub type DepartmentCode = String;

/// Identity row of one employee.
///
/// Mutable attributes live in temporal version tables, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub emp_no: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub hire_date: NaiveDate,
}

impl Employee {
    /// `"first last"`, the form matched by name search.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Reference entity for department membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub dept_no: DepartmentCode,
    pub dept_name: String,
}
