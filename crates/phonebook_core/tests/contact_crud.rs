use phonebook_core::db::migrations::latest_version;
use phonebook_core::db::open_db_in_memory;
use phonebook_core::{
    Contact, ContactRepository, ContactValidationError, RepoError, SqliteContactRepository,
};
use rusqlite::Connection;

#[test]
fn insert_assigns_fresh_ids_and_get_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let first = repo.insert_contact("A", "1234567890").unwrap();
    let second = repo.insert_contact("A", "1234567890").unwrap();
    assert_ne!(first, second);

    let loaded = repo.get_contact(first).unwrap().unwrap();
    assert_eq!(loaded, Contact::new(first, "A", "1234567890"));
    assert!(repo.get_contact(second + 100).unwrap().is_none());
}

#[test]
fn list_is_ordered_by_name_case_sensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    repo.insert_contact("bob", "0000000001").unwrap();
    repo.insert_contact("Alice", "0000000002").unwrap();
    repo.insert_contact("Bob", "0000000003").unwrap();

    let names: Vec<String> = repo
        .list_contacts()
        .unwrap()
        .into_iter()
        .map(|contact| contact.name)
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "bob"]);
}

#[test]
fn update_keeps_id_and_moves_position() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let a = repo.insert_contact("Anna", "0123456789").unwrap();
    repo.insert_contact("Minh", "0987654321").unwrap();

    let anna = repo.get_contact(a).unwrap().unwrap();
    repo.update_contact(&anna.with_fields("Zoe", "0111111111"))
        .unwrap();

    let listed = repo.list_contacts().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1], Contact::new(a, "Zoe", "0111111111"));
}

#[test]
fn update_missing_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let missing = Contact::new(42, "Ghost", "0123456789");
    let err = repo.update_contact(&missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn delete_removes_only_target_and_is_noop_when_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let a = repo.insert_contact("A", "0123456789").unwrap();
    let b = repo.insert_contact("B", "0987654321").unwrap();
    let target = repo.get_contact(a).unwrap().unwrap();

    assert!(repo.delete_contact(&target).unwrap());
    assert!(!repo.delete_contact(&target).unwrap());

    let remaining = repo.list_contacts().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b);
}

#[test]
fn validation_failure_blocks_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let err = repo.insert_contact("A", "12345").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ContactValidationError::InvalidPhoneNumber(_))
    ));
    let err = repo.insert_contact(" ", "0123456789").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ContactValidationError::BlankName)
    ));

    let id = repo.insert_contact("A", "0123456789").unwrap();
    let stored = repo.get_contact(id).unwrap().unwrap();
    let err = repo
        .update_contact(&stored.with_fields("A", "01234-56789"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.get_contact(id).unwrap().unwrap(), stored);
}

#[test]
fn legacy_rows_are_read_without_revalidation() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO contacts (name, phoneNumber) VALUES ('Legacy', '555');",
        [],
    )
    .unwrap();

    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let listed = repo.list_contacts().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].phone_number, "555");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteContactRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_contacts_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteContactRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("contacts"))
    ));
}

#[test]
fn repository_rejects_connection_missing_phone_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteContactRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "contacts",
            column: "phoneNumber"
        })
    ));
}
