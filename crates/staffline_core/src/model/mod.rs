//! Domain model for employees and their versioned attributes.
//!
//! # Responsibility
//! - Define identity records (`Employee`, `Department`).
//! - Define the temporal version shape shared by salary, title and
//!   department-membership history.
//!
//! # Invariants
//! - Employee ids are stable and never reused.
//! - History is closed, never overwritten or removed.

pub mod aggregate;
pub mod employee;
pub mod salary;
pub mod temporal;
