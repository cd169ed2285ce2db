//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define storage-facing contracts for identity rows and temporal
//!   attribute versions.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `NoOpenVersion`,
//!   `InvalidInterval`) in addition to DB transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::employee::EmployeeId;
use crate::model::temporal::AttributeKind;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod department_repo;
pub mod employee_repo;
pub mod temporal_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by identity and temporal stores.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Employee identity row does not exist.
    NotFound(EmployeeId),
    EmployeeExists(EmployeeId),
    DepartmentExists(String),
    /// Another department code already uses this display name.
    DepartmentNameTaken(String),
    /// No version of `kind` is currently open for the employee.
    NoOpenVersion {
        emp_no: EmployeeId,
        kind: AttributeKind,
    },
    /// Closing on `close_date` would end the version before it started.
    InvalidInterval {
        emp_no: EmployeeId,
        kind: AttributeKind,
        valid_from: NaiveDate,
        close_date: NaiveDate,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(emp_no) => write!(f, "employee not found: {emp_no}"),
            Self::EmployeeExists(emp_no) => write!(f, "employee already exists: {emp_no}"),
            Self::DepartmentExists(code) => write!(f, "department already exists: {code}"),
            Self::DepartmentNameTaken(name) => write!(f, "department name already used: {name}"),
            Self::NoOpenVersion { emp_no, kind } => {
                write!(f, "employee {emp_no} has no open {kind} version")
            }
            Self::InvalidInterval {
                emp_no,
                kind,
                valid_from,
                close_date,
            } => write!(
                f,
                "cannot close {kind} version of employee {emp_no} on {close_date}: it starts on {valid_from}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
