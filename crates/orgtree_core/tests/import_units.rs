use orgtree_core::db::open_db_in_memory;
use orgtree_core::{
    ImportError, ImportService, SchemaViolation, SqliteUnitRepository, Unit, UnitRepository,
};
use serde_json::json;

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn importer(conn: &rusqlite::Connection) -> ImportService<SqliteUnitRepository<'_>> {
    ImportService::new(SqliteUnitRepository::try_new(conn).unwrap())
}

fn company_payload() -> serde_json::Value {
    json!([
        {"id": 1, "ParentId": null, "Name": "Head Office"},
        {"id": 2, "ParentId": 1, "Name": "Engineering"},
        {"id": 3, "ParentId": 2, "Name": "Backend"},
        {"id": 4, "ParentId": 2, "Name": "Frontend"},
    ])
}

#[test]
fn import_then_list_yields_submitted_rows() {
    let conn = setup();
    let service = importer(&conn);

    let count = service.import_value(&company_payload(), true).unwrap();
    assert_eq!(count, 4);

    let repo = SqliteUnitRepository::try_new(&conn).unwrap();
    let units = repo.list_units().unwrap();
    assert_eq!(
        units,
        vec![
            Unit {
                id: 1,
                parent_id: None,
                name: "Head Office".to_string()
            },
            Unit {
                id: 2,
                parent_id: Some(1),
                name: "Engineering".to_string()
            },
            Unit {
                id: 3,
                parent_id: Some(2),
                name: "Backend".to_string()
            },
            Unit {
                id: 4,
                parent_id: Some(2),
                name: "Frontend".to_string()
            },
        ]
    );
}

#[test]
fn import_with_clear_replaces_previous_rows() {
    let conn = setup();
    let service = importer(&conn);

    service.import_value(&company_payload(), true).unwrap();

    let replacement = json!([
        {"id": 10, "ParentId": null, "Name": "New Root"},
    ]);
    service.import_value(&replacement, true).unwrap();

    let repo = SqliteUnitRepository::try_new(&conn).unwrap();
    let units = repo.list_units().unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].id, 10);
}

#[test]
fn import_without_clear_appends_to_existing_rows() {
    let conn = setup();
    let service = importer(&conn);

    service.import_value(&company_payload(), true).unwrap();

    let extra = json!([
        {"id": 10, "ParentId": null, "Name": "Second Root"},
        {"id": 11, "ParentId": 10, "Name": "Second Branch"},
    ]);
    service.import_value(&extra, false).unwrap();

    let repo = SqliteUnitRepository::try_new(&conn).unwrap();
    let ids: Vec<i64> = repo.list_units().unwrap().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 10, 11]);
}

#[test]
fn empty_and_non_array_payloads_are_rejected_before_any_write() {
    let conn = setup();
    let service = importer(&conn);
    let repo = SqliteUnitRepository::try_new(&conn).unwrap();

    let err = service.import_value(&json!([]), true).unwrap_err();
    assert!(matches!(
        err,
        ImportError::Schema(SchemaViolation::EmptyPayload)
    ));

    let err = service
        .import_value(&json!({"id": 1, "ParentId": null, "Name": "A"}), true)
        .unwrap_err();
    assert!(matches!(
        err,
        ImportError::Schema(SchemaViolation::NotAnArray)
    ));

    assert_eq!(repo.count_units().unwrap(), 0);
}

#[test]
fn wrong_key_order_is_rejected_and_leaves_store_unchanged() {
    let conn = setup();
    let service = importer(&conn);

    service.import_value(&company_payload(), true).unwrap();

    let reordered = json!([
        {"ParentId": null, "id": 20, "Name": "Shuffled"},
    ]);
    let err = service.import_value(&reordered, true).unwrap_err();
    assert!(matches!(
        err,
        ImportError::Schema(SchemaViolation::WrongKeys { index: 0, .. })
    ));

    let repo = SqliteUnitRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_units().unwrap(), 4);
}

#[test]
fn bad_id_coercion_rolls_back_whole_import() {
    let conn = setup();
    let service = importer(&conn);

    service.import_value(&company_payload(), true).unwrap();
    let repo = SqliteUnitRepository::try_new(&conn).unwrap();
    let before = repo.count_units().unwrap();

    let bad = json!([
        {"id": 10, "ParentId": null, "Name": "Fine"},
        {"id": "abc", "ParentId": 10, "Name": "Broken"},
    ]);
    let err = service.import_value(&bad, true).unwrap_err();
    assert!(matches!(
        err,
        ImportError::RowData {
            index: 1,
            field: "id",
            ..
        }
    ));

    assert_eq!(repo.count_units().unwrap(), before);
}

#[test]
fn duplicate_id_fails_with_database_error_and_rolls_back() {
    let conn = setup();
    let service = importer(&conn);

    service.import_value(&company_payload(), true).unwrap();
    let repo = SqliteUnitRepository::try_new(&conn).unwrap();

    let with_duplicate = json!([
        {"id": 10, "ParentId": null, "Name": "Fresh"},
        {"id": 1, "ParentId": null, "Name": "Duplicate"},
    ]);
    let err = service.import_value(&with_duplicate, false).unwrap_err();
    assert!(matches!(err, ImportError::Repo(_)));

    // Neither the duplicate nor the fresh row from the failed call.
    let ids: Vec<i64> = repo.list_units().unwrap().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn null_name_fails_at_insert_and_rolls_back_clearing_delete() {
    let conn = setup();
    let service = importer(&conn);

    service.import_value(&company_payload(), true).unwrap();
    let repo = SqliteUnitRepository::try_new(&conn).unwrap();

    let with_null_name = json!([
        {"id": 10, "ParentId": null, "Name": "Fine"},
        {"id": 11, "ParentId": 10, "Name": null},
    ]);
    let err = service.import_value(&with_null_name, true).unwrap_err();
    assert!(matches!(err, ImportError::Repo(_)));

    // The clearing delete must be rolled back together with the inserts.
    let ids: Vec<i64> = repo.list_units().unwrap().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn reimport_with_clear_is_idempotent() {
    let conn = setup();
    let service = importer(&conn);
    let repo = SqliteUnitRepository::try_new(&conn).unwrap();

    service.import_value(&company_payload(), true).unwrap();
    let first = repo.list_units().unwrap();

    service.import_value(&company_payload(), true).unwrap();
    let second = repo.list_units().unwrap();

    assert_eq!(first, second);
}

#[test]
fn import_file_reports_missing_and_malformed_files() {
    let conn = setup();
    let service = importer(&conn);

    let err = service
        .import_file("/nonexistent/units.json", true)
        .unwrap_err();
    assert!(matches!(err, ImportError::Io { .. }));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{\"id\": 1,").unwrap();
    let err = service.import_file(&path, true).unwrap_err();
    assert!(matches!(err, ImportError::Json { .. }));

    let repo = SqliteUnitRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_units().unwrap(), 0);
}

#[test]
fn import_file_commits_valid_payload() {
    let conn = setup();
    let service = importer(&conn);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("units.json");
    std::fs::write(&path, company_payload().to_string()).unwrap();

    let count = service.import_file(&path, true).unwrap();
    assert_eq!(count, 4);

    let repo = SqliteUnitRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_units().unwrap(), 4);
}
