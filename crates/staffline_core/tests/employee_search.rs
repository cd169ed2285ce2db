use chrono::NaiveDate;
use rusqlite::Connection;
use staffline_core::db::open_db_in_memory;
use staffline_core::{
    list_employees, search_employees, Department, DepartmentRepository, EmployeeId, FixedClock,
    MutationPipeline, NewEmployee, PageRequest, Salary, SearchError, SearchField, SearchRequest,
    SqliteDepartmentRepository, UNKNOWN_ATTRIBUTE,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// (emp_no, first, last, salary, title, department)
const STAFF: &[(EmployeeId, &str, &str, i64, &str, &str)] = &[
    (1001, "Georgi", "Facello", 60117, "Senior Engineer", "d005"),
    (1002, "Bezalel", "Simmel", 65828, "Staff", "d007"),
    (1003, "Parto", "Bamford", 40006, "Senior Engineer", "d004"),
    (1004, "Chirstian", "Koblick", 40054, "Engineer", "d004"),
    (1005, "Kyoichi", "Maliniak", 78228, "Senior Staff", "d003"),
    (1006, "Anneke", "Preusig", 40000, "Senior Engineer", "d005"),
    (1007, "Tzvetan", "Zielinski", 56724, "Senior Staff", "d008"),
    (1008, "Saniya", "Kalloufi", 46671, "Assistant Engineer", "d005"),
    (1009, "Sumant", "Peac", 60929, "Senior Engineer", "d006"),
    (1010, "Duangkaew", "Piveteau", 72488, "Engineer", "d006"),
    (1011, "Mary", "Sluis", 60000, "Staff", "d009"),
    (1012, "Patricio", "Bridgland", 54423, "Senior Engineer", "d005"),
];

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    let departments = SqliteDepartmentRepository::new(&conn);
    for (dept_no, dept_name) in [
        ("d003", "Human Resources"),
        ("d004", "Production"),
        ("d005", "Development"),
        ("d006", "Quality Management"),
        ("d007", "Sales"),
        ("d008", "Research"),
        ("d009", "Customer Service"),
    ] {
        departments
            .create_department(&Department {
                dept_no: dept_no.to_string(),
                dept_name: dept_name.to_string(),
            })
            .unwrap();
    }

    let pipeline = MutationPipeline::new(&conn, FixedClock(date(2020, 1, 1)));
    // Hire in reverse id order so results must be sorted, not insertion-ordered.
    for (emp_no, first, last, salary, title, department) in STAFF.iter().rev() {
        pipeline
            .hire(&NewEmployee {
                emp_no: Some(*emp_no),
                first_name: first.to_string(),
                last_name: last.to_string(),
                hire_date: None,
                salary: Salary::from_units(*salary).unwrap(),
                title: title.to_string(),
                department: department.to_string(),
            })
            .unwrap();
    }
    conn
}

fn ids(page: &staffline_core::SearchPage) -> Vec<EmployeeId> {
    page.items.iter().map(|item| item.employee.emp_no).collect()
}

fn search(conn: &Connection, term: &str, field: &str) -> staffline_core::SearchPage {
    search_employees(
        conn,
        &SearchRequest::new(term, field).with_paging(PageRequest::new(1, 100)),
    )
    .unwrap()
}

#[test]
fn salary_floor_returns_only_higher_salaries_in_id_order() {
    let conn = setup();
    let page = search(&conn, "60000", "salary-floor");

    assert_eq!(ids(&page), vec![1001, 1002, 1005, 1009, 1010, 1011]);
    assert!(page
        .items
        .iter()
        .all(|item| item.salary.unwrap() >= Salary::from_units(60000).unwrap()));
    assert_eq!(page.total_count, 6);
}

#[test]
fn salary_floor_accepts_decimal_terms() {
    let conn = setup();
    let page = search(&conn, "60000.01", "salary-floor");
    assert!(!ids(&page).contains(&1011));
    assert!(ids(&page).contains(&1001));
}

#[test]
fn id_search_is_exact() {
    let conn = setup();
    let page = search(&conn, "1003", "id");
    assert_eq!(ids(&page), vec![1003]);
    assert_eq!(page.items[0].department, "Production");

    assert_eq!(search(&conn, "100", "id").total_count, 0);
}

#[test]
fn substring_fields_match_case_insensitively() {
    let conn = setup();

    assert_eq!(ids(&search(&conn, "ann", "name")), vec![1006]);
    assert_eq!(ids(&search(&conn, "gi fa", "name")), vec![1001]);
    assert_eq!(ids(&search(&conn, "SALES", "department")), vec![1002]);
    assert_eq!(
        ids(&search(&conn, "senior staff", "title")),
        vec![1005, 1007]
    );
}

#[test]
fn like_wildcards_in_terms_are_literal() {
    let conn = setup();
    assert_eq!(search(&conn, "%", "name").total_count, 0);
    assert_eq!(search(&conn, "_", "title").total_count, 0);
}

#[test]
fn non_integer_id_is_invalid_search_term() {
    let conn = setup();
    let err = search_employees(&conn, &SearchRequest::new("abc", "id")).unwrap_err();
    assert!(matches!(
        err,
        SearchError::InvalidSearchTerm {
            field: SearchField::Id,
            ..
        }
    ));
}

#[test]
fn salary_floor_rounds_extra_decimals_up() {
    let conn = setup();
    let page = search(&conn, "60000.125", "salary-floor");
    assert_eq!(ids(&page), vec![1001, 1002, 1005, 1009, 1010]);

    assert_eq!(search(&conn, "1.005", "salary-floor").total_count, STAFF.len() as u64);
}

#[test]
fn negative_salary_floor_matches_everyone() {
    let conn = setup();
    let page = search(&conn, "-1", "salary-floor");
    assert_eq!(page.total_count, STAFF.len() as u64);
}

#[test]
fn malformed_salary_floor_is_invalid_search_term() {
    let conn = setup();
    for term in ["sixty", "60k", "1.2.3"] {
        let err = search_employees(&conn, &SearchRequest::new(term, "salary-floor")).unwrap_err();
        assert!(
            matches!(err, SearchError::InvalidSearchTerm { .. }),
            "term `{term}`"
        );
    }
}

#[test]
fn unknown_field_is_rejected_instead_of_defaulting_to_name() {
    let conn = setup();
    let err = search_employees(&conn, &SearchRequest::new("Georgi", "nickname")).unwrap_err();
    assert!(matches!(err, SearchError::InvalidSearchCriteria(field) if field == "nickname"));
}

#[test]
fn blank_term_is_rejected() {
    let conn = setup();
    let err = search_employees(&conn, &SearchRequest::new("   ", "name")).unwrap_err();
    assert!(matches!(err, SearchError::InvalidSearchTerm { .. }));
}

#[test]
fn pages_partition_results_without_overlap() {
    let conn = setup();
    let request = |page| {
        SearchRequest::new("engineer", "title").with_paging(PageRequest::new(page, 3))
    };

    let first = search_employees(&conn, &request(1)).unwrap();
    let second = search_employees(&conn, &request(2)).unwrap();
    let third = search_employees(&conn, &request(3)).unwrap();
    let fourth = search_employees(&conn, &request(4)).unwrap();

    assert_eq!(first.total_count, 8);
    assert_eq!(first.total_pages, 3);
    assert_eq!(ids(&first), vec![1001, 1003, 1004]);
    assert_eq!(ids(&second), vec![1006, 1008, 1009]);
    assert_eq!(ids(&third), vec![1010, 1012]);
    assert!(fourth.items.is_empty());
    assert_eq!(fourth.total_count, 8);
}

#[test]
fn count_agrees_with_full_page_for_every_filter() {
    let conn = setup();
    let cases = [
        ("e", "name"),
        ("1007", "id"),
        ("development", "department"),
        ("engineer", "title"),
        ("50000", "salary-floor"),
        ("zzz", "name"),
    ];

    for (term, field) in cases {
        let page = search(&conn, term, field);
        assert!(u64::from(page.page_size) >= page.total_count);
        assert_eq!(
            page.items.len() as u64,
            page.total_count,
            "{field}={term}"
        );
    }
}

#[test]
fn soft_deleted_employees_are_hidden_unless_requested() {
    let conn = setup();
    MutationPipeline::new(&conn, FixedClock(date(2024, 6, 1)))
        .soft_delete(1001)
        .unwrap();

    assert!(search(&conn, "1001", "id").items.is_empty());
    assert!(!ids(&search(&conn, "60000", "salary-floor")).contains(&1001));

    let page = search_employees(
        &conn,
        &SearchRequest::new("Georgi", "name").with_paging(PageRequest {
            include_inactive: true,
            ..PageRequest::default()
        }),
    )
    .unwrap();
    assert_eq!(ids(&page), vec![1001]);
    assert_eq!(page.items[0].title, UNKNOWN_ATTRIBUTE);
    assert_eq!(page.items[0].department, UNKNOWN_ATTRIBUTE);
    assert_eq!(page.items[0].salary, None);
}

#[test]
fn search_reads_current_versions_only() {
    let conn = setup();
    MutationPipeline::new(&conn, FixedClock(date(2024, 6, 1)))
        .update(
            1004,
            &staffline_core::EmployeeUpdate {
                salary: Some(Salary::from_units(90000).unwrap()),
                ..staffline_core::EmployeeUpdate::default()
            },
        )
        .unwrap();

    let page = search(&conn, "80000", "salary-floor");
    assert_eq!(ids(&page), vec![1004]);
    assert_eq!(page.items[0].salary, Salary::from_units(90000));
    assert_eq!(search(&conn, "1004", "id").total_count, 1);
}

#[test]
fn list_employees_pages_through_everyone() {
    let conn = setup();

    let first = list_employees(&conn, &PageRequest::new(1, 5)).unwrap();
    assert_eq!(first.total_count, STAFF.len() as u64);
    assert_eq!(first.total_pages, 3);
    assert_eq!(ids(&first), vec![1001, 1002, 1003, 1004, 1005]);
    assert!(first.criteria.is_none());

    let last = list_employees(&conn, &PageRequest::new(3, 5)).unwrap();
    assert_eq!(ids(&last), vec![1011, 1012]);
}

#[test]
fn page_zero_is_rejected() {
    let conn = setup();
    let err = list_employees(&conn, &PageRequest::new(0, 5)).unwrap_err();
    assert!(matches!(err, SearchError::InvalidPagination(_)));
}

#[test]
fn page_size_zero_is_rejected() {
    let conn = setup();
    let err = list_employees(&conn, &PageRequest::new(1, 0)).unwrap_err();
    assert!(matches!(err, SearchError::InvalidPagination(_)));

    let request = SearchRequest::new("engineer", "title").with_paging(PageRequest::new(1, 0));
    let err = search_employees(&conn, &request).unwrap_err();
    assert!(matches!(err, SearchError::InvalidPagination(_)));
}

#[test]
fn large_page_size_returns_every_match_on_one_page() {
    let conn = open_db_in_memory().unwrap();
    SqliteDepartmentRepository::new(&conn)
        .create_department(&Department {
            dept_no: "d005".to_string(),
            dept_name: "Development".to_string(),
        })
        .unwrap();
    let pipeline = MutationPipeline::new(&conn, FixedClock(date(2020, 1, 1)));
    for n in 0..150 {
        pipeline
            .hire(&NewEmployee {
                emp_no: None,
                first_name: format!("First{n}"),
                last_name: format!("Last{n}"),
                hire_date: None,
                salary: Salary::from_units(50_000).unwrap(),
                title: "Engineer".to_string(),
                department: "d005".to_string(),
            })
            .unwrap();
    }

    let request = SearchRequest::new("engineer", "title").with_paging(PageRequest::new(1, 200));
    let page = search_employees(&conn, &request).unwrap();
    assert_eq!(page.total_count, 150);
    assert_eq!(page.items.len(), 150);
    assert_eq!(page.page_size, 200);
    assert_eq!(page.total_pages, 1);

    let page = list_employees(&conn, &PageRequest::new(2, 120)).unwrap();
    assert_eq!(page.items.len(), 30);
}

#[test]
fn default_paging_applies_when_unspecified() {
    let conn = setup();
    let page = list_employees(&conn, &PageRequest::default()).unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 10);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_pages, 2);
}
