//! Whole-store maintenance: full reset and row counts.
//!
//! Entity repositories scope `delete_all` to their own table plus rows that
//! would otherwise dangle. Wiping every table at once is a separate
//! operation here so the two blast radii never share a method name.

use super::{
    ensure_schema_ready, reset_sequence, run_atomically, AtomicScope, RepoError, RepoResult,
};
use rusqlite::Connection;

const SCHOOL_TABLES: [&str; 4] = ["student_courses", "students", "courses", "school_groups"];

/// Row counts for every school table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchoolCounts {
    pub groups: u64,
    pub courses: u64,
    pub students: u64,
    pub enrollments: u64,
}

impl SchoolCounts {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Repository interface for store-wide maintenance.
pub trait SchoolRepository {
    /// Deletes all rows in all school tables and restarts every sequence.
    /// Safe to call on an already empty store.
    fn reset_all(&self) -> RepoResult<()>;
    fn counts(&self) -> RepoResult<SchoolCounts>;
}

/// SQLite-backed maintenance repository.
#[derive(Clone, Copy)]
pub struct SqliteSchoolRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSchoolRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &SCHOOL_TABLES)?;
        Ok(Self { conn })
    }

    fn count(&self, table: &str) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                    row.get(0)
                })?;
        Ok(count.max(0) as u64)
    }
}

impl SchoolRepository for SqliteSchoolRepository<'_> {
    fn reset_all(&self) -> RepoResult<()> {
        run_atomically(self.conn, "school_reset", || {
            // Children before parents so foreign keys hold at every step.
            for table in SCHOOL_TABLES {
                self.conn.execute(&format!("DELETE FROM {table};"), [])?;
            }
            for table in ["students", "courses", "school_groups"] {
                reset_sequence(self.conn, table)?;
            }
            Ok(())
        })
    }

    fn counts(&self) -> RepoResult<SchoolCounts> {
        Ok(SchoolCounts {
            groups: self.count("school_groups")?,
            courses: self.count("courses")?,
            students: self.count("students")?,
            enrollments: self.count("student_courses")?,
        })
    }
}

impl AtomicScope for SqliteSchoolRepository<'_> {
    fn atomically<T, E>(&self, label: &str, body: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        run_atomically(self.conn, label, body)
    }
}
