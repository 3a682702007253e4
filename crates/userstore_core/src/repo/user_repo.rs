//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup/insert APIs over the `users` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `User::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Each operation is a single backend round trip; retries belong to the
//!   caller.

use crate::db::DbError;
use crate::model::user::{User, UserId, UserValidationError};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USER_SELECT_SQL: &str = "SELECT
    id,
    firstname,
    lastname
FROM users";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence and query operations.
///
/// Callers branch on the variant, never on the message text:
/// `NotFound`/`Conflict` are recoverable outcomes, `Db` wraps driver
/// failures, `Validation` rejects malformed input before any round trip,
/// and the remaining variants report a misconfigured connection at
/// construction time.
#[derive(Debug)]
pub enum RepoError {
    Validation(UserValidationError),
    NotFound(UserId),
    Conflict(UserId),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::Conflict(id) => write!(f, "user id already exists: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is older than required {expected_version}; \
                 run migrations before constructing the repository"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for user lookup and insertion.
///
/// Callers and tests depend on this contract rather than on a concrete
/// driver type.
pub trait UserRepository {
    /// Fetches one user by ID.
    ///
    /// Zero matching rows is reported as `RepoError::NotFound`, never as a
    /// zero-value success.
    fn get_by_id(&self, id: UserId) -> RepoResult<User>;

    /// Persists one user and returns the stored record.
    ///
    /// A uniqueness violation on `id` is reported as `RepoError::Conflict`.
    fn insert(&self, user: &User) -> RepoResult<User>;
}

/// SQLite-backed user repository.
///
/// Borrows an externally owned connection; never opens or closes it.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were never applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema
    ///   does not carry the `users` layout this repository expects.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get_by_id(&self, id: UserId) -> RepoResult<User> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return parse_user_row(row);
        }

        Err(RepoError::NotFound(id))
    }

    fn insert(&self, user: &User) -> RepoResult<User> {
        user.validate()?;

        let outcome = self.conn.execute(
            "INSERT INTO users (id, firstname, lastname) VALUES (?1, ?2, ?3);",
            params![user.id, user.first_name.as_str(), user.last_name.as_str()],
        );

        match outcome {
            Ok(_) => Ok(user.clone()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict(user.id)),
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: row.get("id")?,
        first_name: row.get("firstname")?,
        last_name: row.get("lastname")?,
    };

    if let Err(err) = user.validate() {
        return Err(RepoError::InvalidData(format!(
            "row for user id {}: {err}",
            user.id
        )));
    }

    Ok(user)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(cause, _) if cause.code == ErrorCode::ConstraintViolation
    )
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "users")? {
        return Err(RepoError::MissingRequiredTable("users"));
    }

    for column in ["id", "firstname", "lastname"] {
        if !table_has_column(conn, "users", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "users",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
