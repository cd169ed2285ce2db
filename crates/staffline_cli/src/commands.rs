//! Command-line surface definitions.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use staffline_core::{AttributeKind, EmployeeId, Salary};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "staffline")]
#[command(about = "Employee records with versioned salary, title and department history.")]
pub struct CommandLine {
    /// SQLite database file (overrides STAFFLINE_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    /// Absolute log directory (overrides STAFFLINE_LOG_DIR)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides STAFFLINE_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one employee with current title, salary and department
    Get { emp_no: EmployeeId },
    /// Show the version history of one attribute
    History {
        emp_no: EmployeeId,
        #[arg(long, value_enum)]
        kind: KindArg,
    },
    /// List employees page by page
    #[command(alias = "ls")]
    List(PageArgs),
    /// Search employees by one field
    #[command(alias = "s")]
    Search {
        term: String,
        /// name|id|department|title|salary-floor
        #[arg(long = "by", default_value = "name")]
        field: String,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Hire a new employee
    Hire {
        #[arg(long)]
        id: Option<EmployeeId>,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        hire_date: Option<NaiveDate>,
        #[arg(long)]
        salary: Salary,
        #[arg(long)]
        title: String,
        #[arg(long)]
        department: String,
    },
    /// Change name, salary, title or department
    Update {
        emp_no: EmployeeId,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        salary: Option<Salary>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Close every open attribute version (soft delete)
    #[command(alias = "rm")]
    Delete { emp_no: EmployeeId },
    /// Department reference data
    #[command(subcommand)]
    Departments(DepartmentCommands),
}

#[derive(Subcommand)]
pub enum DepartmentCommands {
    /// List departments by code
    List,
    /// Add a department
    Add { dept_no: String, dept_name: String },
}

#[derive(Args)]
pub struct PageArgs {
    #[arg(long)]
    pub page: Option<u32>,
    /// Page size; defaults to STAFFLINE_PAGE_SIZE
    #[arg(long)]
    pub limit: Option<u32>,
    /// Include soft-deleted employees
    #[arg(long)]
    pub include_inactive: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Salary,
    Title,
    Department,
}

impl From<KindArg> for AttributeKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Salary => AttributeKind::Salary,
            KindArg::Title => AttributeKind::Title,
            KindArg::Department => AttributeKind::Department,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
