use chrono::NaiveDate;
use rusqlite::Connection;
use staffline_core::db::open_db_in_memory;
use staffline_core::{
    AttributeKind, AttributeValue, EmployeeRepository, NewEmployeeRow, RepoError, Salary,
    SqliteEmployeeRepository, SqliteTemporalStore, TemporalStore, Validity,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    SqliteEmployeeRepository::new(&conn)
        .insert_employee(&NewEmployeeRow {
            emp_no: Some(1001),
            first_name: "Georgi",
            last_name: "Facello",
            hire_date: date(2020, 1, 1),
        })
        .unwrap();
    conn
}

fn salary(units: i64) -> AttributeValue {
    AttributeValue::Salary(Salary::from_units(units).unwrap())
}

#[test]
fn open_new_then_current_version_round_trips() {
    let conn = setup();
    let store = SqliteTemporalStore::new(&conn);

    let opened = store.open_new(1001, &salary(50000), date(2020, 1, 1)).unwrap();
    let current = store
        .current_version(1001, AttributeKind::Salary)
        .unwrap()
        .unwrap();

    assert_eq!(current, opened);
    assert_eq!(current.value, salary(50000));
    assert_eq!(current.valid_to, Validity::Open);
}

#[test]
fn current_version_is_none_without_history() {
    let conn = setup();
    let store = SqliteTemporalStore::new(&conn);

    for kind in [
        AttributeKind::Salary,
        AttributeKind::Title,
        AttributeKind::Department,
    ] {
        assert!(store.current_version(1001, kind).unwrap().is_none());
        assert!(store.all_versions(1001, kind).unwrap().is_empty());
    }
}

#[test]
fn close_current_sets_end_date_and_leaves_no_open_version() {
    let conn = setup();
    let store = SqliteTemporalStore::new(&conn);
    store
        .open_new(
            1001,
            &AttributeValue::Title("Engineer".to_string()),
            date(2020, 1, 1),
        )
        .unwrap();

    let closed = store
        .close_current(1001, AttributeKind::Title, date(2024, 6, 1))
        .unwrap();

    assert_eq!(closed.valid_to, Validity::ClosedAt(date(2024, 6, 1)));
    assert!(store
        .current_version(1001, AttributeKind::Title)
        .unwrap()
        .is_none());
    let history = store.all_versions(1001, AttributeKind::Title).unwrap();
    assert_eq!(history, vec![closed]);
}

#[test]
fn close_current_without_open_version_fails() {
    let conn = setup();
    let store = SqliteTemporalStore::new(&conn);

    let err = store
        .close_current(1001, AttributeKind::Salary, date(2024, 6, 1))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NoOpenVersion {
            emp_no: 1001,
            kind: AttributeKind::Salary
        }
    ));
}

#[test]
fn close_current_twice_fails_on_second_call() {
    let conn = setup();
    let store = SqliteTemporalStore::new(&conn);
    store.open_new(1001, &salary(50000), date(2020, 1, 1)).unwrap();

    store
        .close_current(1001, AttributeKind::Salary, date(2024, 6, 1))
        .unwrap();
    let err = store
        .close_current(1001, AttributeKind::Salary, date(2024, 6, 2))
        .unwrap_err();

    assert!(matches!(err, RepoError::NoOpenVersion { .. }));
    let history = store.all_versions(1001, AttributeKind::Salary).unwrap();
    assert_eq!(history[0].valid_to, Validity::ClosedAt(date(2024, 6, 1)));
}

#[test]
fn close_before_start_is_rejected_without_writing() {
    let conn = setup();
    let store = SqliteTemporalStore::new(&conn);
    store.open_new(1001, &salary(50000), date(2024, 6, 1)).unwrap();

    let err = store
        .close_current(1001, AttributeKind::Salary, date(2024, 5, 31))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::InvalidInterval { valid_from, close_date, .. }
            if valid_from == date(2024, 6, 1) && close_date == date(2024, 5, 31)
    ));
    assert!(store
        .current_version(1001, AttributeKind::Salary)
        .unwrap()
        .unwrap()
        .is_open());
}

#[test]
fn all_versions_are_ordered_oldest_first_and_contiguous() {
    let conn = setup();
    let store = SqliteTemporalStore::new(&conn);
    let changes = [
        (date(2020, 1, 1), 50000),
        (date(2021, 3, 15), 52000),
        (date(2022, 7, 1), 54000),
        (date(2022, 7, 1), 54500),
    ];
    for (index, (day, amount)) in changes.iter().enumerate() {
        if index > 0 {
            store
                .close_current(1001, AttributeKind::Salary, *day)
                .unwrap();
        }
        store.open_new(1001, &salary(*amount), *day).unwrap();
    }

    let history = store.all_versions(1001, AttributeKind::Salary).unwrap();
    assert_eq!(history.len(), changes.len());
    for pair in history.windows(2) {
        assert_eq!(pair[0].valid_to, Validity::ClosedAt(pair[1].valid_from));
    }
    assert_eq!(history.iter().filter(|v| v.is_open()).count(), 1);
    assert_eq!(history.last().unwrap().value, salary(54500));
}

#[test]
fn stores_are_independent_per_kind() {
    let conn = setup();
    let store = SqliteTemporalStore::new(&conn);
    store.open_new(1001, &salary(50000), date(2020, 1, 1)).unwrap();
    store
        .open_new(
            1001,
            &AttributeValue::Title("Engineer".to_string()),
            date(2020, 1, 1),
        )
        .unwrap();

    store
        .close_current(1001, AttributeKind::Title, date(2021, 1, 1))
        .unwrap();

    assert!(store
        .current_version(1001, AttributeKind::Salary)
        .unwrap()
        .is_some());
}

#[test]
fn two_open_versions_are_reported_as_invalid_data() {
    let conn = setup();
    let store = SqliteTemporalStore::new(&conn);
    store.open_new(1001, &salary(50000), date(2020, 1, 1)).unwrap();
    store.open_new(1001, &salary(51000), date(2020, 2, 1)).unwrap();

    let err = store
        .current_version(1001, AttributeKind::Salary)
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
