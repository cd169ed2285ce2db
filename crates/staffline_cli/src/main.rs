//! Staffline command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, open the store and call one core use-case.
//! - Print results as JSON on stdout.

mod commands;

use anyhow::Context;
use commands::{CommandLine, Commands, DepartmentCommands, PageArgs};
use log::info;
use serde::Serialize;
use staffline_core::db::open_db;
use staffline_core::{
    init_logging_from_config, list_employees, normalize_level, search_employees, CoreConfig,
    Department, DepartmentRepository, EmployeeDirectory, EmployeeUpdate, MutationPipeline,
    NewEmployee, PageRequest, SearchRequest, SqliteDepartmentRepository, SystemClock,
};

fn main() -> anyhow::Result<()> {
    let args = CommandLine::parse_args();
    let config = resolve_config(&args)?;
    init_logging_from_config(&config).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    info!("event=cli_start module=cli status=ok version={}", staffline_core::core_version());

    match args.command {
        Commands::Get { emp_no } => print_json(&EmployeeDirectory::sqlite(&conn).get(emp_no)?),
        Commands::History { emp_no, kind } => {
            print_json(&EmployeeDirectory::sqlite(&conn).history(emp_no, kind.into())?)
        }
        Commands::List(paging) => {
            print_json(&list_employees(&conn, &page_request(paging, &config))?)
        }
        Commands::Search {
            term,
            field,
            paging,
        } => {
            let request =
                SearchRequest::new(term, field).with_paging(page_request(paging, &config));
            print_json(&search_employees(&conn, &request)?)
        }
        Commands::Hire {
            id,
            first_name,
            last_name,
            hire_date,
            salary,
            title,
            department,
        } => {
            let report = MutationPipeline::new(&conn, SystemClock).hire(&NewEmployee {
                emp_no: id,
                first_name,
                last_name,
                hire_date,
                salary,
                title,
                department,
            })?;
            print_json(&report)
        }
        Commands::Update {
            emp_no,
            first_name,
            last_name,
            salary,
            title,
            department,
        } => {
            let update = EmployeeUpdate {
                first_name,
                last_name,
                salary,
                title,
                department,
            };
            print_json(&MutationPipeline::new(&conn, SystemClock).update(emp_no, &update)?)
        }
        Commands::Delete { emp_no } => {
            print_json(&MutationPipeline::new(&conn, SystemClock).soft_delete(emp_no)?)
        }
        Commands::Departments(DepartmentCommands::List) => {
            print_json(&SqliteDepartmentRepository::new(&conn).list_departments()?)
        }
        Commands::Departments(DepartmentCommands::Add { dept_no, dept_name }) => {
            let department = Department { dept_no, dept_name };
            SqliteDepartmentRepository::new(&conn).create_department(&department)?;
            print_json(&department)
        }
    }
}

/// Environment first, then command-line overrides.
fn resolve_config(args: &CommandLine) -> anyhow::Result<CoreConfig> {
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &args.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(level) = &args.log_level {
        config.log_level = normalize_level(level).map_err(anyhow::Error::msg)?;
    }
    Ok(config)
}

fn page_request(args: PageArgs, config: &CoreConfig) -> PageRequest {
    PageRequest {
        page: args.page,
        page_size: Some(args.limit.unwrap_or(config.default_page_size)),
        include_inactive: args.include_inactive,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
