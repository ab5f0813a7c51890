//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-entity persistence contracts (gateways) for groups, courses,
//!   students and enrollments.
//! - Isolate SQLite query details from service/business orchestration.
//! - Own referential cleanup (cascades) so no delete leaves dangling rows.
//!
//! # Invariants
//! - Absence is reported in the `Ok` value (`Option`, `bool`, empty `Vec`);
//!   `Err` is reserved for storage faults and invalid input/persisted data.
//! - Write paths validate records before SQL mutations.
//! - Multi-statement writes run inside one savepoint.

use crate::db::migrations::latest_version;
use crate::db::{with_savepoint, DbError};
use crate::model::ModelValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course_repo;
pub mod enrollment_repo;
pub mod group_repo;
pub mod school_repo;
pub mod student_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all school gateways.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed write-side validation.
    Validation(ModelValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "school repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "school repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
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

/// Groups several repository calls into one all-or-nothing unit.
///
/// Implementations backed by a shared connection cover every repository on
/// that connection, not only the one the scope was opened on.
pub trait AtomicScope {
    fn atomically<T, E>(&self, label: &str, body: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>;
}

struct Scoped<E>(E);

impl<E: From<RepoError>> From<rusqlite::Error> for Scoped<E> {
    fn from(value: rusqlite::Error) -> Self {
        Self(E::from(RepoError::from(value)))
    }
}

pub(crate) fn run_atomically<T, E>(
    conn: &Connection,
    label: &str,
    body: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<RepoError>,
{
    with_savepoint(conn, label, || body().map_err(Scoped)).map_err(|Scoped(err)| err)
}

/// Verifies migrations are applied and `tables` exist on `conn`.
pub(crate) fn ensure_schema_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
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

/// Restarts the AUTOINCREMENT sequence of `table` so the next assigned id is 1.
pub(crate) fn reset_sequence(conn: &Connection, table: &str) -> RepoResult<()> {
    conn.execute("DELETE FROM sqlite_sequence WHERE name = ?1;", [table])?;
    Ok(())
}

pub(crate) fn row_exists(conn: &Connection, sql: &str, id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(exists == 1)
}

pub(crate) fn invalid_row(table: &str, err: ModelValidationError) -> RepoError {
    RepoError::InvalidData(format!("{table}: {err}"))
}
