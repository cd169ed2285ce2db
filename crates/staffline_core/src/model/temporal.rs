//! Temporal attribute version model.
//!
//! # Responsibility
//! - Describe one validity-bounded value of a versioned employee attribute.
//! - Keep the open/closed state explicit instead of using a sentinel date.
//!
//! # Invariants
//! - Per employee and kind, intervals are contiguous and non-overlapping.
//! - At most one version per employee and kind is `Validity::Open`.
//! - A closed version never ends before it starts.

use crate::model::employee::{DepartmentCode, EmployeeId};
use crate::model::salary::Salary;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Versioned attribute families. All share one storage shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Salary,
    Title,
    Department,
}

impl AttributeKind {
    /// Close order used by soft delete.
    pub const SOFT_DELETE_ORDER: [AttributeKind; 3] = [
        AttributeKind::Department,
        AttributeKind::Title,
        AttributeKind::Salary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Title => "title",
            Self::Department => "department",
        }
    }
}

impl Display for AttributeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value carried by one attribute version, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Salary(Salary),
    Title(String),
    Department(DepartmentCode),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Salary(_) => AttributeKind::Salary,
            Self::Title(_) => AttributeKind::Title,
            Self::Department(_) => AttributeKind::Department,
        }
    }
}

/// End side of a validity interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "date", rename_all = "snake_case")]
pub enum Validity {
    /// Currently in effect.
    Open,
    /// Historical; stopped being in effect on this date.
    ClosedAt(NaiveDate),
}

impl Validity {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Storage encoding: `NULL` is the open state.
    pub fn from_db(to_date: Option<NaiveDate>) -> Self {
        to_date.map_or(Self::Open, Self::ClosedAt)
    }

    pub fn to_db(self) -> Option<NaiveDate> {
        match self {
            Self::Open => None,
            Self::ClosedAt(date) => Some(date),
        }
    }
}

/// One row of attribute history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeVersion {
    /// Storage row id; also breaks ties between same-day versions.
    pub version_id: i64,
    pub emp_no: EmployeeId,
    pub value: AttributeValue,
    pub valid_from: NaiveDate,
    pub valid_to: Validity,
}

impl AttributeVersion {
    pub fn kind(&self) -> AttributeKind {
        self.value.kind()
    }

    pub fn is_open(&self) -> bool {
        self.valid_to.is_open()
    }

    /// Whether closing this version on `close_date` keeps `start <= end`.
    pub fn can_close_on(&self, close_date: NaiveDate) -> bool {
        close_date >= self.valid_from
    }
}
