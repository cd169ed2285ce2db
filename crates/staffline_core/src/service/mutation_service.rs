//! Mutation pipeline for employee records.
//!
//! # Responsibility
//! - Hire, update and soft-delete employees.
//! - Keep temporal history gap-free: every replaced version is closed on
//!   the same date its successor opens.
//!
//! # Invariants
//! - One mutation = one IMMEDIATE transaction; nothing partial is committed.
//! - Input and interval checks run before the first write.
//! - Update steps run in fixed order: name, salary, title, department.
//! - Soft delete closes department, title, salary, in that order, and never
//!   removes the identity row.
//! - History is contiguous while an employee is active; an update after a
//!   soft delete reopens from its own date, leaving a gap since the close.

use crate::clock::Clock;
use crate::db::run_in_transaction;
use crate::model::employee::{DepartmentCode, EmployeeId};
use crate::model::salary::Salary;
use crate::model::temporal::{AttributeKind, AttributeValue, AttributeVersion};
use crate::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use crate::repo::employee_repo::{EmployeeRepository, NewEmployeeRow, SqliteEmployeeRepository};
use crate::repo::temporal_repo::{SqliteTemporalStore, TemporalStore};
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{error, info};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Mutation error taxonomy surfaced to callers.
#[derive(Debug)]
pub enum MutationError {
    NotFound(EmployeeId),
    AlreadyExists(EmployeeId),
    NoOpenVersion {
        emp_no: EmployeeId,
        kind: AttributeKind,
    },
    InvalidInterval {
        emp_no: EmployeeId,
        kind: AttributeKind,
        valid_from: NaiveDate,
        close_date: NaiveDate,
    },
    /// Request payload rejected before touching storage.
    InvalidInput(String),
    UnknownDepartment(DepartmentCode),
    /// Transaction aborted by a storage failure; nothing was committed.
    MutationFailed(RepoError),
}

impl Display for MutationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(emp_no) => write!(f, "employee not found: {emp_no}"),
            Self::AlreadyExists(emp_no) => write!(f, "employee already exists: {emp_no}"),
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
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::UnknownDepartment(code) => write!(f, "unknown department: {code}"),
            Self::MutationFailed(err) => write!(f, "mutation failed: {err}"),
        }
    }
}

impl Error for MutationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MutationFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MutationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(emp_no) => Self::NotFound(emp_no),
            RepoError::EmployeeExists(emp_no) => Self::AlreadyExists(emp_no),
            RepoError::NoOpenVersion { emp_no, kind } => Self::NoOpenVersion { emp_no, kind },
            RepoError::InvalidInterval {
                emp_no,
                kind,
                valid_from,
                close_date,
            } => Self::InvalidInterval {
                emp_no,
                kind,
                valid_from,
                close_date,
            },
            other => Self::MutationFailed(other),
        }
    }
}

impl From<rusqlite::Error> for MutationError {
    fn from(value: rusqlite::Error) -> Self {
        Self::MutationFailed(RepoError::from(value))
    }
}

pub type MutationResult<T> = Result<T, MutationError>;

/// Request for hiring a new employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    /// Caller-provided id for imports; `None` allocates one.
    pub emp_no: Option<EmployeeId>,
    pub first_name: String,
    pub last_name: String,
    /// Defaults to the mutation date.
    pub hire_date: Option<NaiveDate>,
    pub salary: Salary,
    pub title: String,
    pub department: DepartmentCode,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub salary: Option<Salary>,
    pub title: Option<String>,
    pub department: Option<DepartmentCode>,
}

impl EmployeeUpdate {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.salary.is_none()
            && self.title.is_none()
            && self.department.is_none()
    }

    /// Attribute replacements in pipeline order.
    fn attribute_values(&self) -> Vec<AttributeValue> {
        let mut values = Vec::new();
        if let Some(salary) = self.salary {
            values.push(AttributeValue::Salary(salary));
        }
        if let Some(title) = &self.title {
            values.push(AttributeValue::Title(title.trim().to_string()));
        }
        if let Some(department) = &self.department {
            values.push(AttributeValue::Department(department.trim().to_string()));
        }
        values
    }
}

/// Versions touched by one committed mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    pub emp_no: EmployeeId,
    /// Versions closed by this mutation, in close order.
    pub closed: Vec<AttributeVersion>,
    /// Versions opened by this mutation, in open order.
    pub opened: Vec<AttributeVersion>,
}

/// Applies mutations through one connection, dated by `clock`.
pub struct MutationPipeline<'conn, C: Clock> {
    conn: &'conn Connection,
    clock: C,
}

impl<'conn, C: Clock> MutationPipeline<'conn, C> {
    pub fn new(conn: &'conn Connection, clock: C) -> Self {
        Self { conn, clock }
    }

    /// Creates the identity row and opens salary, title and department
    /// versions dated today.
    pub fn hire(&self, request: &NewEmployee) -> MutationResult<MutationReport> {
        let first_name = required_text("first_name", &request.first_name)?;
        let last_name = required_text("last_name", &request.last_name)?;
        let title = required_text("title", &request.title)?;
        let department = required_text("department", &request.department)?;
        let today = self.clock.today();

        let result = run_in_transaction(self.conn, "employee_hire", |tx| {
            let departments = SqliteDepartmentRepository::new(tx);
            ensure_department_exists(&departments, department)?;

            let employees = SqliteEmployeeRepository::new(tx);
            let employee = employees.insert_employee(&NewEmployeeRow {
                emp_no: request.emp_no,
                first_name,
                last_name,
                hire_date: request.hire_date.unwrap_or(today),
            })?;

            let store = SqliteTemporalStore::new(tx);
            let mut report = MutationReport {
                emp_no: employee.emp_no,
                ..MutationReport::default()
            };
            for value in [
                AttributeValue::Salary(request.salary),
                AttributeValue::Title(title.to_string()),
                AttributeValue::Department(department.to_string()),
            ] {
                report
                    .opened
                    .push(store.open_new(employee.emp_no, &value, today)?);
            }
            Ok(report)
        });

        log_outcome("employee_hire", request.emp_no, &result);
        result
    }

    /// Applies a partial update.
    ///
    /// Each supplied attribute closes its current version today and opens a
    /// replacement starting today. An attribute with no open version just
    /// gets a new open version.
    pub fn update(
        &self,
        emp_no: EmployeeId,
        update: &EmployeeUpdate,
    ) -> MutationResult<MutationReport> {
        if update.is_empty() {
            return Err(MutationError::InvalidInput(
                "update must supply at least one field".to_string(),
            ));
        }
        let first_name = optional_text("first_name", update.first_name.as_deref())?;
        let last_name = optional_text("last_name", update.last_name.as_deref())?;
        optional_text("title", update.title.as_deref())?;
        optional_text("department", update.department.as_deref())?;
        let values = update.attribute_values();
        let today = self.clock.today();

        let result = run_in_transaction(self.conn, "employee_update", |tx| {
            let employees = SqliteEmployeeRepository::new(tx);
            if !employees.employee_exists(emp_no)? {
                return Err(MutationError::NotFound(emp_no));
            }
            if let Some(code) = update.department.as_deref() {
                ensure_department_exists(&SqliteDepartmentRepository::new(tx), code.trim())?;
            }

            let store = SqliteTemporalStore::new(tx);
            for value in &values {
                ensure_closable(&store, emp_no, value.kind(), today)?;
            }

            if first_name.is_some() || last_name.is_some() {
                employees.update_name(emp_no, first_name, last_name)?;
            }

            let mut report = MutationReport {
                emp_no,
                ..MutationReport::default()
            };
            for value in &values {
                replace_current(&store, emp_no, value, today, &mut report)?;
            }
            Ok(report)
        });

        log_outcome("employee_update", Some(emp_no), &result);
        result
    }

    /// Closes every open attribute version; the employee becomes inactive.
    ///
    /// # Errors
    /// - `NotFound` for an unknown employee.
    /// - `NoOpenVersion` when nothing is open, e.g. a repeated soft delete.
    pub fn soft_delete(&self, emp_no: EmployeeId) -> MutationResult<MutationReport> {
        let today = self.clock.today();

        let result = run_in_transaction(self.conn, "employee_soft_delete", |tx| {
            if !SqliteEmployeeRepository::new(tx).employee_exists(emp_no)? {
                return Err(MutationError::NotFound(emp_no));
            }

            let store = SqliteTemporalStore::new(tx);
            let mut open_kinds = Vec::new();
            for kind in AttributeKind::SOFT_DELETE_ORDER {
                if ensure_closable(&store, emp_no, kind, today)? {
                    open_kinds.push(kind);
                }
            }
            if open_kinds.is_empty() {
                return Err(MutationError::NoOpenVersion {
                    emp_no,
                    kind: AttributeKind::SOFT_DELETE_ORDER[0],
                });
            }

            let mut report = MutationReport {
                emp_no,
                ..MutationReport::default()
            };
            for kind in open_kinds {
                report
                    .closed
                    .push(store.close_current(emp_no, kind, today)?);
            }
            Ok(report)
        });

        log_outcome("employee_soft_delete", Some(emp_no), &result);
        result
    }
}

/// Closes the open version of `value`'s kind (if any) and opens `value`.
fn replace_current<S: TemporalStore>(
    store: &S,
    emp_no: EmployeeId,
    value: &AttributeValue,
    today: NaiveDate,
    report: &mut MutationReport,
) -> MutationResult<()> {
    let kind = value.kind();
    if store.current_version(emp_no, kind)?.is_some() {
        report.closed.push(store.close_current(emp_no, kind, today)?);
    }
    report.opened.push(store.open_new(emp_no, value, today)?);
    Ok(())
}

/// Returns whether `kind` has an open version, failing with
/// `InvalidInterval` when it cannot be closed on `close_date`.
fn ensure_closable<S: TemporalStore>(
    store: &S,
    emp_no: EmployeeId,
    kind: AttributeKind,
    close_date: NaiveDate,
) -> MutationResult<bool> {
    match store.current_version(emp_no, kind)? {
        Some(current) if !current.can_close_on(close_date) => {
            Err(MutationError::InvalidInterval {
                emp_no,
                kind,
                valid_from: current.valid_from,
                close_date,
            })
        }
        Some(_) => Ok(true),
        None => Ok(false),
    }
}

fn ensure_department_exists<D: DepartmentRepository>(
    departments: &D,
    code: &str,
) -> MutationResult<()> {
    match departments.get_department(code)? {
        Some(_) => Ok(()),
        None => Err(MutationError::UnknownDepartment(code.to_string())),
    }
}

fn required_text<'a>(field: &str, value: &'a str) -> MutationResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MutationError::InvalidInput(format!(
            "{field} must not be blank"
        )));
    }
    Ok(trimmed)
}

fn optional_text<'a>(field: &str, value: Option<&'a str>) -> MutationResult<Option<&'a str>> {
    value.map(|text| required_text(field, text)).transpose()
}

fn log_outcome(event: &str, emp_no: Option<EmployeeId>, result: &MutationResult<MutationReport>) {
    match result {
        Ok(report) => info!(
            "event={event} module=mutation status=ok emp_no={} closed={} opened={}",
            report.emp_no,
            report.closed.len(),
            report.opened.len()
        ),
        Err(err) => error!(
            "event={event} module=mutation status=error emp_no={} error_code={} error={err}",
            emp_no.map_or_else(|| "new".to_string(), |id| id.to_string()),
            error_code(err)
        ),
    }
}

fn error_code(err: &MutationError) -> &'static str {
    match err {
        MutationError::NotFound(_) => "not_found",
        MutationError::AlreadyExists(_) => "already_exists",
        MutationError::NoOpenVersion { .. } => "no_open_version",
        MutationError::InvalidInterval { .. } => "invalid_interval",
        MutationError::InvalidInput(_) => "invalid_input",
        MutationError::UnknownDepartment(_) => "unknown_department",
        MutationError::MutationFailed(_) => "mutation_failed",
    }
}
