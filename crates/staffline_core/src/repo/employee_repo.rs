//! Employee identity repository.
//!
//! # Responsibility
//! - Persist and load employee identity rows.
//!
//! # Invariants
//! - Identity rows are never deleted; soft delete lives in temporal tables.
//! - `emp_no` values are never reused (`AUTOINCREMENT`).

use crate::model::employee::{Employee, EmployeeId};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Insert payload for one identity row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployeeRow<'a> {
    /// Caller-provided id for imports; `None` allocates the next id.
    pub emp_no: Option<EmployeeId>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub hire_date: NaiveDate,
}

/// Repository interface for employee identity rows.
pub trait EmployeeRepository {
    fn insert_employee(&self, row: &NewEmployeeRow<'_>) -> RepoResult<Employee>;
    fn get_employee(&self, emp_no: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Updates whichever name parts are supplied.
    fn update_name(
        &self,
        emp_no: EmployeeId,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> RepoResult<()>;
    fn employee_exists(&self, emp_no: EmployeeId) -> RepoResult<bool>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn insert_employee(&self, row: &NewEmployeeRow<'_>) -> RepoResult<Employee> {
        if let Some(emp_no) = row.emp_no {
            if self.employee_exists(emp_no)? {
                return Err(RepoError::EmployeeExists(emp_no));
            }
        }

        self.conn.execute(
            "INSERT INTO employees (emp_no, first_name, last_name, hire_date)
             VALUES (?1, ?2, ?3, ?4);",
            params![row.emp_no, row.first_name, row.last_name, row.hire_date],
        )?;

        Ok(Employee {
            emp_no: self.conn.last_insert_rowid(),
            first_name: row.first_name.to_string(),
            last_name: row.last_name.to_string(),
            hire_date: row.hire_date,
        })
    }

    fn get_employee(&self, emp_no: EmployeeId) -> RepoResult<Option<Employee>> {
        let employee = self
            .conn
            .query_row(
                "SELECT emp_no, first_name, last_name, hire_date
                 FROM employees
                 WHERE emp_no = ?1;",
                [emp_no],
                parse_employee_row,
            )
            .optional()?;
        Ok(employee)
    }

    fn update_name(
        &self,
        emp_no: EmployeeId,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET
                first_name = COALESCE(?2, first_name),
                last_name = COALESCE(?3, last_name)
             WHERE emp_no = ?1;",
            params![emp_no, first_name, last_name],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(emp_no));
        }

        Ok(())
    }

    fn employee_exists(&self, emp_no: EmployeeId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE emp_no = ?1);",
            [emp_no],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

/// Maps an `employees` row selected with its canonical column names.
pub(crate) fn parse_employee_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        emp_no: row.get("emp_no")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        hire_date: row.get("hire_date")?,
    })
}
