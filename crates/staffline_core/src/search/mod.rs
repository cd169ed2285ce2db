//! Search and pagination over composed employee aggregates.
//!
//! # Responsibility
//! - Translate a search field + term into one SQL predicate.
//! - Return one page plus the total computed from the same predicate.

pub mod employee_search;

/// Page size used when the caller does not pass one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
