//! Employee aggregate accessor.
//!
//! # Responsibility
//! - Build `EmployeeAggregate` values from identity + current versions.
//! - Expose per-attribute history for audit views.
//!
//! # Invariants
//! - Soft-deleted employees stay readable by id.
//! - A missing attribute is rendered with the `"N/A"` / absent sentinel,
//!   never reported as an error.

use crate::model::aggregate::EmployeeAggregate;
use crate::model::employee::EmployeeId;
use crate::model::temporal::{AttributeKind, AttributeValue, AttributeVersion};
use crate::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use crate::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use crate::repo::temporal_repo::{SqliteTemporalStore, TemporalStore};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Connection;

/// Read facade over identity, temporal and department repositories.
pub struct EmployeeDirectory<E, T, D> {
    employees: E,
    versions: T,
    departments: D,
}

impl<'conn>
    EmployeeDirectory<
        SqliteEmployeeRepository<'conn>,
        SqliteTemporalStore<'conn>,
        SqliteDepartmentRepository<'conn>,
    >
{
    /// Builds a directory reading through one SQLite connection.
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteEmployeeRepository::new(conn),
            SqliteTemporalStore::new(conn),
            SqliteDepartmentRepository::new(conn),
        )
    }
}

impl<E, T, D> EmployeeDirectory<E, T, D>
where
    E: EmployeeRepository,
    T: TemporalStore,
    D: DepartmentRepository,
{
    pub fn new(employees: E, versions: T, departments: D) -> Self {
        Self {
            employees,
            versions,
            departments,
        }
    }

    /// Returns the employee composed with its current attributes.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no identity row exists.
    /// - `RepoError::InvalidData` when stored history is inconsistent.
    pub fn get(&self, emp_no: EmployeeId) -> RepoResult<EmployeeAggregate> {
        let employee = self
            .employees
            .get_employee(emp_no)?
            .ok_or(RepoError::NotFound(emp_no))?;

        let title = match self.current_value(emp_no, AttributeKind::Title)? {
            Some(AttributeValue::Title(title)) => Some(title),
            _ => None,
        };
        let salary = match self.current_value(emp_no, AttributeKind::Salary)? {
            Some(AttributeValue::Salary(salary)) => Some(salary),
            _ => None,
        };
        let department = match self.current_value(emp_no, AttributeKind::Department)? {
            Some(AttributeValue::Department(code)) => Some(
                self.departments
                    .get_department(&code)?
                    .ok_or_else(|| {
                        RepoError::InvalidData(format!(
                            "employee {emp_no} belongs to unknown department `{code}`"
                        ))
                    })?,
            ),
            _ => None,
        };

        Ok(EmployeeAggregate::compose(employee, title, salary, department))
    }

    /// Returns every version of `kind`, oldest first.
    pub fn history(
        &self,
        emp_no: EmployeeId,
        kind: AttributeKind,
    ) -> RepoResult<Vec<AttributeVersion>> {
        if !self.employees.employee_exists(emp_no)? {
            return Err(RepoError::NotFound(emp_no));
        }
        self.versions.all_versions(emp_no, kind)
    }

    fn current_value(
        &self,
        emp_no: EmployeeId,
        kind: AttributeKind,
    ) -> RepoResult<Option<AttributeValue>> {
        Ok(self
            .versions
            .current_version(emp_no, kind)?
            .map(|version| version.value))
    }
}
