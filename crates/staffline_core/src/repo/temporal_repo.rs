//! Temporal attribute store.
//!
//! # Responsibility
//! - Read and write validity-bounded versions of salary, title and
//!   department membership through one generic contract.
//!
//! # Invariants
//! - `current_version` returns the single open version, or `None`.
//! - `close_current` never closes a version before its start and never
//!   closes twice.
//! - `open_new` does not check for an already-open version. Callers close
//!   the previous one first (see `service::mutation_service`).

use crate::model::employee::EmployeeId;
use crate::model::salary::Salary;
use crate::model::temporal::{AttributeKind, AttributeValue, AttributeVersion, Validity};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

/// Versioned attribute storage contract.
pub trait TemporalStore {
    /// Returns the open version of `kind`, if any.
    fn current_version(
        &self,
        emp_no: EmployeeId,
        kind: AttributeKind,
    ) -> RepoResult<Option<AttributeVersion>>;
    /// Returns the full history of `kind`, oldest first.
    fn all_versions(
        &self,
        emp_no: EmployeeId,
        kind: AttributeKind,
    ) -> RepoResult<Vec<AttributeVersion>>;
    /// Closes the open version of `kind` on `close_date` and returns it.
    fn close_current(
        &self,
        emp_no: EmployeeId,
        kind: AttributeKind,
        close_date: NaiveDate,
    ) -> RepoResult<AttributeVersion>;
    /// Inserts a new open version starting on `start_date`.
    fn open_new(
        &self,
        emp_no: EmployeeId,
        value: &AttributeValue,
        start_date: NaiveDate,
    ) -> RepoResult<AttributeVersion>;
}

/// SQLite-backed temporal store.
///
/// Works on a plain connection or, through deref, on a transaction.
pub struct SqliteTemporalStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTemporalStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TemporalStore for SqliteTemporalStore<'_> {
    fn current_version(
        &self,
        emp_no: EmployeeId,
        kind: AttributeKind,
    ) -> RepoResult<Option<AttributeVersion>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, emp_no, value, from_date, to_date
             FROM {}
             WHERE emp_no = ?1
               AND to_date IS NULL
             ORDER BY from_date ASC, id ASC;",
            table_name(kind)
        ))?;

        let mut rows = stmt.query([emp_no])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let version = parse_version_row(row, kind)?;

        if rows.next()?.is_some() {
            return Err(RepoError::InvalidData(format!(
                "employee {emp_no} has more than one open {kind} version"
            )));
        }

        Ok(Some(version))
    }

    fn all_versions(
        &self,
        emp_no: EmployeeId,
        kind: AttributeKind,
    ) -> RepoResult<Vec<AttributeVersion>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, emp_no, value, from_date, to_date
             FROM {}
             WHERE emp_no = ?1
             ORDER BY from_date ASC, id ASC;",
            table_name(kind)
        ))?;

        let mut rows = stmt.query([emp_no])?;
        let mut versions = Vec::new();
        while let Some(row) = rows.next()? {
            versions.push(parse_version_row(row, kind)?);
        }

        Ok(versions)
    }

    fn close_current(
        &self,
        emp_no: EmployeeId,
        kind: AttributeKind,
        close_date: NaiveDate,
    ) -> RepoResult<AttributeVersion> {
        let mut current = self
            .current_version(emp_no, kind)?
            .ok_or(RepoError::NoOpenVersion { emp_no, kind })?;

        if !current.can_close_on(close_date) {
            return Err(RepoError::InvalidInterval {
                emp_no,
                kind,
                valid_from: current.valid_from,
                close_date,
            });
        }

        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET to_date = ?1
                 WHERE id = ?2
                   AND to_date IS NULL;",
                table_name(kind)
            ),
            params![close_date, current.version_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NoOpenVersion { emp_no, kind });
        }

        current.valid_to = Validity::ClosedAt(close_date);
        Ok(current)
    }

    fn open_new(
        &self,
        emp_no: EmployeeId,
        value: &AttributeValue,
        start_date: NaiveDate,
    ) -> RepoResult<AttributeVersion> {
        let kind = value.kind();
        self.conn.execute(
            &format!(
                "INSERT INTO {} (emp_no, value, from_date, to_date)
                 VALUES (?1, ?2, ?3, NULL);",
                table_name(kind)
            ),
            params![emp_no, value_to_db(value), start_date],
        )?;

        Ok(AttributeVersion {
            version_id: self.conn.last_insert_rowid(),
            emp_no,
            value: value.clone(),
            valid_from: start_date,
            valid_to: Validity::Open,
        })
    }
}

/// Storage table holding the history of `kind`.
///
/// All three tables share the `(id, emp_no, value, from_date, to_date)`
/// shape, so queries differ only by table name.
pub fn table_name(kind: AttributeKind) -> &'static str {
    match kind {
        AttributeKind::Salary => "salaries",
        AttributeKind::Title => "titles",
        AttributeKind::Department => "dept_emp",
    }
}

fn value_to_db(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Salary(salary) => Value::Integer(salary.cents()),
        AttributeValue::Title(title) => Value::Text(title.clone()),
        AttributeValue::Department(code) => Value::Text(code.clone()),
    }
}

fn parse_version_row(row: &Row<'_>, kind: AttributeKind) -> RepoResult<AttributeVersion> {
    let value = match kind {
        AttributeKind::Salary => {
            let cents: i64 = row.get("value")?;
            let salary = Salary::from_cents(cents).ok_or_else(|| {
                RepoError::InvalidData(format!("negative salary `{cents}` in salaries.value"))
            })?;
            AttributeValue::Salary(salary)
        }
        AttributeKind::Title => AttributeValue::Title(row.get("value")?),
        AttributeKind::Department => AttributeValue::Department(row.get("value")?),
    };

    let valid_from: NaiveDate = row.get("from_date")?;
    let valid_to = Validity::from_db(row.get("to_date")?);
    if let Validity::ClosedAt(end) = valid_to {
        if end < valid_from {
            return Err(RepoError::InvalidData(format!(
                "{kind} version ends on {end} before it starts on {valid_from}"
            )));
        }
    }

    Ok(AttributeVersion {
        version_id: row.get("id")?,
        emp_no: row.get("emp_no")?,
        value,
        valid_from,
        valid_to,
    })
}
