//! Filtered, paginated employee views.
//!
//! # Invariants
//! - Count and page queries share one WHERE clause and bind list.
//! - Rows are ordered by `emp_no ASC`, so pages never overlap or skip.
//! - Unknown fields and unparsable terms are rejected, never defaulted.
//! - Soft-deleted employees are hidden unless `include_inactive` is set.

use crate::db::DbError;
use crate::model::aggregate::EmployeeAggregate;
use crate::model::employee::{Department, Employee, EmployeeId};
use crate::model::salary::Salary;
use crate::model::temporal::AttributeKind;
use crate::repo::temporal_repo::table_name;
use crate::search::DEFAULT_PAGE_SIZE;
use log::info;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug)]
pub enum SearchError {
    /// Term is blank or cannot be parsed for the chosen field.
    InvalidSearchTerm {
        field: SearchField,
        term: String,
        message: String,
    },
    /// Field name is not one of the supported search fields.
    InvalidSearchCriteria(String),
    InvalidPagination(String),
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSearchTerm {
                field,
                term,
                message,
            } => write!(f, "invalid search term `{term}` for {field}: {message}"),
            Self::InvalidSearchCriteria(field) => write!(
                f,
                "invalid search criteria `{field}`; expected name|id|department|title|salary-floor"
            ),
            Self::InvalidPagination(message) => write!(f, "invalid pagination: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Attribute a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchField {
    /// Substring of `"first last"`.
    Name,
    /// Exact employee id.
    Id,
    /// Substring of the current department name.
    Department,
    /// Substring of the current title.
    Title,
    /// Current salary greater than or equal to the term.
    SalaryFloor,
}

impl SearchField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
            Self::Department => "department",
            Self::Title => "title",
            Self::SalaryFloor => "salary-floor",
        }
    }
}

impl Display for SearchField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = SearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "id" => Ok(Self::Id),
            "department" => Ok(Self::Department),
            "title" => Ok(Self::Title),
            "salary-floor" => Ok(Self::SalaryFloor),
            _ => Err(SearchError::InvalidSearchCriteria(value.to_string())),
        }
    }
}

/// Page window and visibility options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Used as given; `None` means 10 and `Some(0)` is rejected.
    pub page_size: Option<u32>,
    /// Include soft-deleted employees.
    pub include_inactive: bool,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            include_inactive: false,
        }
    }
}

/// Search input as received from callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    /// One of `name|id|department|title|salary-floor`.
    pub field: String,
    pub paging: PageRequest,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            field: field.into(),
            paging: PageRequest::default(),
        }
    }

    pub fn with_paging(mut self, paging: PageRequest) -> Self {
        self.paging = paging;
        self
    }
}

/// Echo of the accepted search criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCriteria {
    pub term: String,
    pub field: SearchField,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub items: Vec<EmployeeAggregate>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<SearchCriteria>,
}

/// Resolves the requested page size; only an absent size is defaulted.
pub fn normalize_page_size(page_size: Option<u32>) -> SearchResult<u32> {
    match page_size {
        None => Ok(DEFAULT_PAGE_SIZE),
        Some(0) => Err(SearchError::InvalidPagination(
            "page size must be at least 1".to_string(),
        )),
        Some(value) => Ok(value),
    }
}

/// `ceil(total / page_size)`.
pub fn total_pages(total_count: u64, page_size: u32) -> u64 {
    total_count.div_ceil(u64::from(page_size.max(1)))
}

/// Searches employees by one field and returns the requested page.
///
/// # Errors
/// - `InvalidSearchCriteria` for an unknown field.
/// - `InvalidSearchTerm` for a blank term, a non-integer id or a
///   salary floor that is not a decimal number.
/// - `InvalidPagination` for page `0` or page size `0`.
pub fn search_employees(conn: &Connection, request: &SearchRequest) -> SearchResult<SearchPage> {
    let field: SearchField = request.field.parse()?;
    let term = request.term.trim();
    let filter = Filter::parse(field, term)?;

    let mut page = run_page_query(conn, &filter, &request.paging)?;
    page.criteria = Some(SearchCriteria {
        term: term.to_string(),
        field,
    });
    Ok(page)
}

/// Lists employees without a search filter.
pub fn list_employees(conn: &Connection, paging: &PageRequest) -> SearchResult<SearchPage> {
    run_page_query(conn, &Filter::All, paging)
}

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    All,
    NameContains(String),
    IdEquals(EmployeeId),
    DepartmentContains(String),
    TitleContains(String),
    SalaryAtLeast(Salary),
}

impl Filter {
    fn parse(field: SearchField, term: &str) -> SearchResult<Self> {
        let invalid = |message: String| SearchError::InvalidSearchTerm {
            field,
            term: term.to_string(),
            message,
        };
        if term.is_empty() {
            return Err(invalid("search term is required".to_string()));
        }

        Ok(match field {
            SearchField::Name => Self::NameContains(term.to_string()),
            SearchField::Department => Self::DepartmentContains(term.to_string()),
            SearchField::Title => Self::TitleContains(term.to_string()),
            SearchField::Id => Self::IdEquals(
                term.parse()
                    .map_err(|_| invalid("employee id must be an integer".to_string()))?,
            ),
            SearchField::SalaryFloor => {
                Self::SalaryAtLeast(
                    Salary::floor_from_decimal(term).map_err(|err| invalid(err.to_string()))?,
                )
            }
        })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::NameContains(_) => SearchField::Name.as_str(),
            Self::IdEquals(_) => SearchField::Id.as_str(),
            Self::DepartmentContains(_) => SearchField::Department.as_str(),
            Self::TitleContains(_) => SearchField::Title.as_str(),
            Self::SalaryAtLeast(_) => SearchField::SalaryFloor.as_str(),
        }
    }

    /// Appends this filter's predicate to `sql` and its binds to `binds`.
    fn push_predicate(&self, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::All => {}
            Self::NameContains(term) => {
                sql.push_str(" AND (e.first_name || ' ' || e.last_name) LIKE ? ESCAPE '\\'");
                binds.push(Value::Text(like_pattern(term)));
            }
            Self::IdEquals(emp_no) => {
                sql.push_str(" AND e.emp_no = ?");
                binds.push(Value::Integer(*emp_no));
            }
            Self::DepartmentContains(term) => {
                sql.push_str(" AND d.dept_name LIKE ? ESCAPE '\\'");
                binds.push(Value::Text(like_pattern(term)));
            }
            Self::TitleContains(term) => {
                sql.push_str(" AND t.value LIKE ? ESCAPE '\\'");
                binds.push(Value::Text(like_pattern(term)));
            }
            Self::SalaryAtLeast(floor) => {
                sql.push_str(" AND s.value >= ?");
                binds.push(Value::Integer(floor.cents()));
            }
        }
    }
}

fn run_page_query(
    conn: &Connection,
    filter: &Filter,
    paging: &PageRequest,
) -> SearchResult<SearchPage> {
    let started_at = Instant::now();
    let page = match paging.page {
        None => 1,
        Some(0) => {
            return Err(SearchError::InvalidPagination(
                "page numbers start at 1".to_string(),
            ))
        }
        Some(page) => page,
    };
    let page_size = normalize_page_size(paging.page_size)?;
    let offset = i64::from(page - 1) * i64::from(page_size);

    let from_sql = composed_from_clause();
    let mut where_sql = String::from(" WHERE 1 = 1");
    let mut binds: Vec<Value> = Vec::new();
    if !paging.include_inactive {
        where_sql.push_str(" AND (t.id IS NOT NULL OR s.id IS NOT NULL OR de.id IS NOT NULL)");
    }
    filter.push_predicate(&mut where_sql, &mut binds);

    let total_count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) {from_sql}{where_sql};"),
        params_from_iter(binds.iter()),
        |row| row.get(0),
    )?;
    let total_count = u64::try_from(total_count)
        .map_err(|_| SearchError::InvalidData(format!("negative count {total_count}")))?;

    let mut page_binds = binds;
    page_binds.push(Value::Integer(i64::from(page_size)));
    page_binds.push(Value::Integer(offset));
    let mut stmt = conn.prepare(&format!(
        "SELECT
            e.emp_no AS emp_no,
            e.first_name AS first_name,
            e.last_name AS last_name,
            e.hire_date AS hire_date,
            t.value AS title,
            s.value AS salary,
            d.dept_no AS dept_no,
            d.dept_name AS dept_name
         {from_sql}{where_sql}
         ORDER BY e.emp_no ASC
         LIMIT ? OFFSET ?;"
    ))?;
    let mut rows = stmt.query(params_from_iter(page_binds))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_aggregate_row(row)?);
    }

    info!(
        "event=employee_search module=search status=ok filter={} page={page} page_size={page_size} returned={} total={total_count} duration_ms={}",
        filter.label(),
        items.len(),
        started_at.elapsed().as_millis()
    );

    Ok(SearchPage {
        items,
        total_count,
        page,
        page_size,
        total_pages: total_pages(total_count, page_size),
        criteria: None,
    })
}

/// Identity joined with the open version of each temporal attribute.
fn composed_from_clause() -> String {
    format!(
        "FROM employees e
         LEFT JOIN {titles} t ON t.emp_no = e.emp_no AND t.to_date IS NULL
         LEFT JOIN {salaries} s ON s.emp_no = e.emp_no AND s.to_date IS NULL
         LEFT JOIN {dept_emp} de ON de.emp_no = e.emp_no AND de.to_date IS NULL
         LEFT JOIN departments d ON d.dept_no = de.value",
        titles = table_name(AttributeKind::Title),
        salaries = table_name(AttributeKind::Salary),
        dept_emp = table_name(AttributeKind::Department),
    )
}

fn parse_aggregate_row(row: &Row<'_>) -> SearchResult<EmployeeAggregate> {
    let employee = Employee {
        emp_no: row.get("emp_no")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        hire_date: row.get("hire_date")?,
    };

    let salary = match row.get::<_, Option<i64>>("salary")? {
        Some(cents) => Some(Salary::from_cents(cents).ok_or_else(|| {
            SearchError::InvalidData(format!(
                "negative salary for employee {}",
                employee.emp_no
            ))
        })?),
        None => None,
    };

    let department = match (
        row.get::<_, Option<String>>("dept_no")?,
        row.get::<_, Option<String>>("dept_name")?,
    ) {
        (Some(dept_no), Some(dept_name)) => Some(Department { dept_no, dept_name }),
        _ => None,
    };

    Ok(EmployeeAggregate::compose(
        employee,
        row.get("title")?,
        salary,
        department,
    ))
}

/// Wraps `term` in `%` after escaping LIKE wildcards.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
