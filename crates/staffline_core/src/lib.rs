//! Core domain logic for Staffline.
//! This crate is the single source of truth for employee history
//! invariants: attributes are versioned over time, never overwritten.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, normalize_level,
};
pub use model::aggregate::{EmployeeAggregate, UNKNOWN_ATTRIBUTE};
pub use model::employee::{Department, DepartmentCode, Employee, EmployeeId};
pub use model::salary::{Salary, SalaryParseError};
pub use model::temporal::{AttributeKind, AttributeValue, AttributeVersion, Validity};
pub use repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
pub use repo::employee_repo::{EmployeeRepository, NewEmployeeRow, SqliteEmployeeRepository};
pub use repo::temporal_repo::{SqliteTemporalStore, TemporalStore};
pub use repo::{RepoError, RepoResult};
pub use search::employee_search::{
    list_employees, search_employees, PageRequest, SearchCriteria, SearchError, SearchField,
    SearchPage, SearchRequest, SearchResult,
};
pub use service::aggregate_service::EmployeeDirectory;
pub use service::mutation_service::{
    EmployeeUpdate, MutationError, MutationPipeline, MutationReport, MutationResult, NewEmployee,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
