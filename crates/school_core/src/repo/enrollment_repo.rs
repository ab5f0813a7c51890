//! Enrollment (student ↔ course) repository.
//!
//! # Responsibility
//! - Manage the `student_courses` association set.
//!
//! # Invariants
//! - A `(student_id, course_id)` pair is stored at most once.
//! - A pair is only stored when both sides exist.
//! - `delete_all` clears association rows only; students and courses stay.

use super::{ensure_schema_ready, run_atomically, AtomicScope, RepoError, RepoResult};
use crate::model::course::CourseId;
use crate::model::enrollment::Enrollment;
use crate::model::student::StudentId;
use rusqlite::{params, Connection};

/// Repository interface for the enrollment association.
pub trait EnrollmentRepository {
    /// Inserts the pair when both sides exist. Returns whether the pair is
    /// stored afterwards; an already stored pair yields `true`.
    fn add_student_to_course(&self, student_id: StudentId, course_id: CourseId)
        -> RepoResult<bool>;
    /// Deletes the pair. `false` when it was not stored.
    fn remove_student_from_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<bool>;
    fn student_enrolled_on_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<bool>;
    /// Deletes every association row and returns how many were removed.
    fn delete_all(&self) -> RepoResult<usize>;
    /// All pairs ordered by student, then course.
    fn get_all(&self) -> RepoResult<Vec<Enrollment>>;
    fn course_ids_for_student(&self, student_id: StudentId) -> RepoResult<Vec<CourseId>>;
    fn student_ids_for_course(&self, course_id: CourseId) -> RepoResult<Vec<StudentId>>;
}

/// SQLite-backed enrollment repository.
#[derive(Clone, Copy)]
pub struct SqliteEnrollmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEnrollmentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["student_courses", "students", "courses"])?;
        Ok(Self { conn })
    }

    fn ids(&self, sql: &str, id: i64) -> RepoResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }
}

impl EnrollmentRepository for SqliteEnrollmentRepository<'_> {
    fn add_student_to_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<bool> {
        run_atomically(self.conn, "enrollment_add", || {
            let both_exist: i64 = self.conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM students WHERE student_id = ?1)
                    AND EXISTS(SELECT 1 FROM courses WHERE course_id = ?2);",
                params![student_id, course_id],
                |row| row.get(0),
            )?;
            if both_exist != 1 {
                return Ok(false);
            }

            self.conn.execute(
                "INSERT INTO student_courses (student_id, course_id)
                 VALUES (?1, ?2)
                 ON CONFLICT (student_id, course_id) DO NOTHING;",
                params![student_id, course_id],
            )?;
            self.student_enrolled_on_course(student_id, course_id)
        })
    }

    fn remove_student_from_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM student_courses WHERE student_id = ?1 AND course_id = ?2;",
            params![student_id, course_id],
        )?;
        Ok(changed > 0)
    }

    fn student_enrolled_on_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM student_courses
                WHERE student_id = ?1 AND course_id = ?2
            );",
            params![student_id, course_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let deleted = self.conn.execute("DELETE FROM student_courses;", [])?;
        Ok(deleted)
    }

    fn get_all(&self) -> RepoResult<Vec<Enrollment>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, course_id
             FROM student_courses
             ORDER BY student_id ASC, course_id ASC;",
        )?;
        let pairs = stmt
            .query_map([], |row| Ok(Enrollment::new(row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<Enrollment>>>()?;
        Ok(pairs)
    }

    fn course_ids_for_student(&self, student_id: StudentId) -> RepoResult<Vec<CourseId>> {
        self.ids(
            "SELECT course_id FROM student_courses WHERE student_id = ?1 ORDER BY course_id ASC;",
            student_id,
        )
    }

    fn student_ids_for_course(&self, course_id: CourseId) -> RepoResult<Vec<StudentId>> {
        self.ids(
            "SELECT student_id FROM student_courses WHERE course_id = ?1 ORDER BY student_id ASC;",
            course_id,
        )
    }
}

impl AtomicScope for SqliteEnrollmentRepository<'_> {
    fn atomically<T, E>(&self, label: &str, body: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        run_atomically(self.conn, label, body)
    }
}
