//! Read-time composition of an employee with its current attributes.

use crate::model::employee::{Department, DepartmentCode, Employee};
use crate::model::salary::Salary;
use serde::Serialize;

/// Rendered in place of a title or department with no open version.
pub const UNKNOWN_ATTRIBUTE: &str = "N/A";

/// Employee identity joined with the open version of each attribute.
///
/// Not stored; rebuilt on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeAggregate {
    #[serde(flatten)]
    pub employee: Employee,
    /// Current title or `"N/A"`.
    pub title: String,
    /// Current salary; absent when none is open.
    pub salary: Option<Salary>,
    /// Current department name or `"N/A"`.
    pub department: String,
    pub department_code: Option<DepartmentCode>,
    /// False once every attribute version is closed (soft-deleted).
    pub is_active: bool,
}

impl EmployeeAggregate {
    pub fn compose(
        employee: Employee,
        title: Option<String>,
        salary: Option<Salary>,
        department: Option<Department>,
    ) -> Self {
        let is_active = title.is_some() || salary.is_some() || department.is_some();
        let (department, department_code) = match department {
            Some(dept) => (dept.dept_name, Some(dept.dept_no)),
            None => (UNKNOWN_ATTRIBUTE.to_string(), None),
        };

        Self {
            employee,
            title: title.unwrap_or_else(|| UNKNOWN_ATTRIBUTE.to_string()),
            salary,
            department,
            department_code,
            is_active,
        }
    }
}
