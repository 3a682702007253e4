use std::error::Error;

use rusqlite::Connection;
use userstore_core::db::migrations::latest_version;
use userstore_core::db::{open_db_in_memory, DbError};
use userstore_core::{
    RepoError, RepoResult, SqliteUserRepository, User, UserId, UserRepository, UserService,
};

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let user = User::new(1, "John", "Doe").unwrap();
    let inserted = repo.insert(&user).unwrap();
    assert_eq!(inserted, user);

    let loaded = repo.get_by_id(1).unwrap();
    assert_eq!(loaded, user);
}

#[test]
fn get_missing_user_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let err = repo.get_by_id(-1).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(-1)));
}

#[test]
fn insert_duplicate_id_returns_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let user = User::new(2, "John", "Doe").unwrap();
    repo.insert(&user).unwrap();

    let err = repo.insert(&user).unwrap_err();
    assert!(matches!(err, RepoError::Conflict(2)));
}

#[test]
fn insert_invalid_user_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let invalid = User {
        id: -1,
        first_name: String::new(),
        last_name: "Doe".to_string(),
    };
    let err = repo.insert(&invalid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn backend_failure_during_get_surfaces_db_error_with_cause() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    // Simulate the backend going away underneath a live repository.
    conn.execute_batch("DROP TABLE users;").unwrap();

    let err = repo.get_by_id(1).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(err.source().is_some(), "driver cause must be retrievable");
}

#[test]
fn backend_failure_during_insert_surfaces_db_error_not_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    conn.execute_batch("DROP TABLE users;").unwrap();

    let user = User::new(3, "John", "Doe").unwrap();
    let err = repo.insert(&user).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(err.source().is_some(), "driver cause must be retrievable");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_users_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("users"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_users_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            firstname TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "users",
            column: "lastname"
        })
    ));
}

#[test]
fn corrupt_persisted_row_surfaces_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO users (id, firstname, lastname) VALUES (4, '', 'Doe');",
        [],
    )
    .unwrap();

    let err = repo.get_by_id(4).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

/// Double standing in for a connection whose backend is unreachable.
struct UnavailableRepository;

impl UserRepository for UnavailableRepository {
    fn get_by_id(&self, _id: UserId) -> RepoResult<User> {
        Err(RepoError::Db(DbError::Sqlite(
            rusqlite::Error::InvalidQuery,
        )))
    }

    fn insert(&self, _user: &User) -> RepoResult<User> {
        Err(RepoError::Db(DbError::Sqlite(
            rusqlite::Error::InvalidQuery,
        )))
    }
}

#[test]
fn service_propagates_errors_from_any_repository_impl() {
    let service = UserService::new(UnavailableRepository);

    let get_err = service.get_user(1).unwrap_err();
    assert!(matches!(get_err, RepoError::Db(_)));

    let user = User::new(1, "John", "Doe").unwrap();
    let insert_err = service.insert_user(&user).unwrap_err();
    assert!(matches!(insert_err, RepoError::Db(_)));
    assert!(insert_err.source().is_some());
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let service = UserService::new(repo);

    let created = service.create_user(5, "Jane", "Doe").unwrap();
    assert_eq!(created.id, 5);

    let fetched = service.get_user(5).unwrap();
    assert_eq!(fetched, created);

    let err = service.create_user(0, "Jane", "Doe").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}
