//! Department reference data.
//!
//! Departments are loaded once (imports, fixtures) and read afterwards;
//! there is no rename or delete path.

use crate::model::employee::Department;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait DepartmentRepository {
    fn create_department(&self, department: &Department) -> RepoResult<()>;
    fn get_department(&self, dept_no: &str) -> RepoResult<Option<Department>>;
    /// All departments ordered by code.
    fn list_departments(&self) -> RepoResult<Vec<Department>>;
}

pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create_department(&self, department: &Department) -> RepoResult<()> {
        let dept_no = department.dept_no.trim();
        let dept_name = department.dept_name.trim();
        if dept_no.is_empty() || dept_name.is_empty() {
            return Err(RepoError::InvalidData(
                "department code and name must not be blank".to_string(),
            ));
        }

        if self.get_department(dept_no)?.is_some() {
            return Err(RepoError::DepartmentExists(dept_no.to_string()));
        }
        let name_taken: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE dept_name = ?1);",
            [dept_name],
            |row| row.get(0),
        )?;
        if name_taken {
            return Err(RepoError::DepartmentNameTaken(dept_name.to_string()));
        }

        self.conn.execute(
            "INSERT INTO departments (dept_no, dept_name) VALUES (?1, ?2);",
            params![dept_no, dept_name],
        )?;
        Ok(())
    }

    fn get_department(&self, dept_no: &str) -> RepoResult<Option<Department>> {
        let department = self
            .conn
            .query_row(
                "SELECT dept_no, dept_name FROM departments WHERE dept_no = ?1;",
                [dept_no],
                |row| {
                    Ok(Department {
                        dept_no: row.get(0)?,
                        dept_name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(department)
    }

    fn list_departments(&self) -> RepoResult<Vec<Department>> {
        let mut stmt = self
            .conn
            .prepare("SELECT dept_no, dept_name FROM departments ORDER BY dept_no ASC;")?;
        let mut rows = stmt.query([])?;
        let mut departments = Vec::new();
        while let Some(row) = rows.next()? {
            departments.push(Department {
                dept_no: row.get(0)?,
                dept_name: row.get(1)?,
            });
        }
        Ok(departments)
    }
}
