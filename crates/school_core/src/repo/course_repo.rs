//! Course repository contract and SQLite implementation.
//!
//! # Invariants
//! - Deleting a course removes its `student_courses` rows first, in the same
//!   savepoint. Students are untouched.
//! - `delete_all` restarts the course id sequence.

use super::{
    ensure_schema_ready, invalid_row, reset_sequence, row_exists, run_atomically, AtomicScope,
    RepoError, RepoResult,
};
use crate::model::course::{Course, CourseId, NewCourse};
use rusqlite::{params, Connection, Row};

const COURSE_SELECT_SQL: &str = "SELECT course_id, course_name, course_description FROM courses";

/// Repository interface for course persistence.
pub trait CourseRepository {
    fn get_all(&self) -> RepoResult<Vec<Course>>;
    fn get_by_id(&self, id: CourseId) -> RepoResult<Option<Course>>;
    fn exists_by_id(&self, id: CourseId) -> RepoResult<bool>;
    /// Inserts with the caller-assigned id. `false` when the id is taken.
    fn save(&self, course: &Course) -> RepoResult<bool>;
    /// Inserts with a store-assigned id and returns it.
    fn save_without_id(&self, name: &str, description: &str) -> RepoResult<CourseId>;
    fn update(&self, course: &Course) -> RepoResult<bool>;
    /// Deletes one course and its enrollments. `false` when absent.
    fn delete_by_id(&self, id: CourseId) -> RepoResult<bool>;
    /// Deletes every course and every enrollment, restarts the sequence.
    fn delete_all(&self) -> RepoResult<usize>;
    fn get_all_ids(&self) -> RepoResult<Vec<CourseId>>;
    /// Courses whose name equals `name`, in id order.
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Course>>;
}

/// SQLite-backed course repository.
#[derive(Clone, Copy)]
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["courses", "student_courses"])?;
        Ok(Self { conn })
    }

    fn query_courses(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }
        Ok(courses)
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<Course>> {
        self.query_courses(&format!("{COURSE_SELECT_SQL} ORDER BY course_id ASC;"), params![])
    }

    fn get_by_id(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let courses =
            self.query_courses(&format!("{COURSE_SELECT_SQL} WHERE course_id = ?1;"), [id])?;
        Ok(courses.into_iter().next())
    }

    fn exists_by_id(&self, id: CourseId) -> RepoResult<bool> {
        row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM courses WHERE course_id = ?1);",
            id,
        )
    }

    fn save(&self, course: &Course) -> RepoResult<bool> {
        course.validate_assigned()?;

        let changed = self.conn.execute(
            "INSERT INTO courses (course_id, course_name, course_description)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (course_id) DO NOTHING;",
            params![course.id, course.name.as_str(), course.description.as_str()],
        )?;
        Ok(changed == 1)
    }

    fn save_without_id(&self, name: &str, description: &str) -> RepoResult<CourseId> {
        NewCourse::new(name, description).validate()?;

        self.conn.execute(
            "INSERT INTO courses (course_name, course_description) VALUES (?1, ?2);",
            params![name, description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, course: &Course) -> RepoResult<bool> {
        course.validate()?;

        let changed = self.conn.execute(
            "UPDATE courses
             SET course_name = ?2,
                 course_description = ?3
             WHERE course_id = ?1;",
            params![course.id, course.name.as_str(), course.description.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn delete_by_id(&self, id: CourseId) -> RepoResult<bool> {
        run_atomically(self.conn, "course_delete", || {
            self.conn
                .execute("DELETE FROM student_courses WHERE course_id = ?1;", [id])?;
            let changed = self
                .conn
                .execute("DELETE FROM courses WHERE course_id = ?1;", [id])?;
            Ok(changed > 0)
        })
    }

    fn delete_all(&self) -> RepoResult<usize> {
        run_atomically(self.conn, "course_delete_all", || {
            self.conn.execute("DELETE FROM student_courses;", [])?;
            let deleted = self.conn.execute("DELETE FROM courses;", [])?;
            reset_sequence(self.conn, "courses")?;
            Ok(deleted)
        })
    }

    fn get_all_ids(&self) -> RepoResult<Vec<CourseId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT course_id FROM courses ORDER BY course_id ASC;")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<CourseId>>>()?;
        Ok(ids)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Course>> {
        self.query_courses(
            &format!("{COURSE_SELECT_SQL} WHERE course_name = ?1 ORDER BY course_id ASC;"),
            [name],
        )
    }
}

impl AtomicScope for SqliteCourseRepository<'_> {
    fn atomically<T, E>(&self, label: &str, body: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        run_atomically(self.conn, label, body)
    }
}

fn parse_course_row(row: &Row<'_>) -> RepoResult<Course> {
    let course = Course {
        id: row.get("course_id")?,
        name: row.get("course_name")?,
        description: row.get("course_description")?,
    };
    course
        .validate()
        .map_err(|err| invalid_row("courses", err))?;
    Ok(course)
}
