//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, existence and id listing over `students`.
//! - Answer membership queries (by course name, by group).
//!
//! # Invariants
//! - A student is never written with a `group_id` that does not exist; such
//!   writes report `false`/`None` instead of failing with a constraint error.
//! - Deleting a student removes its `student_courses` rows in the same
//!   savepoint. Courses are untouched.
//! - `delete_all` restarts the student id sequence.

use super::{
    ensure_schema_ready, invalid_row, reset_sequence, row_exists, run_atomically, AtomicScope,
    RepoError, RepoResult,
};
use crate::model::group::GroupId;
use crate::model::student::{NewStudent, Student, StudentId};
use rusqlite::{params, Connection, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    student_id,
    group_id,
    first_name,
    last_name
FROM students";

/// Repository interface for student persistence.
pub trait StudentRepository {
    fn get_all(&self) -> RepoResult<Vec<Student>>;
    fn get_by_id(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn exists_by_id(&self, id: StudentId) -> RepoResult<bool>;
    /// Inserts with the caller-assigned id. `false` when the id is taken or
    /// the referenced group does not exist.
    fn save(&self, student: &Student) -> RepoResult<bool>;
    /// Inserts with a store-assigned id. `None` when the referenced group
    /// does not exist.
    fn save_without_id(
        &self,
        group_id: Option<GroupId>,
        first_name: &str,
        last_name: &str,
    ) -> RepoResult<Option<StudentId>>;
    /// Replaces mutable fields. `false` when the student or the referenced
    /// group does not exist.
    fn update(&self, student: &Student) -> RepoResult<bool>;
    /// Deletes one student and its enrollments. `false` when absent.
    fn delete_by_id(&self, id: StudentId) -> RepoResult<bool>;
    /// Deletes every student and every enrollment, restarts the sequence.
    fn delete_all(&self) -> RepoResult<usize>;
    fn get_all_ids(&self) -> RepoResult<Vec<StudentId>>;
    /// Distinct students enrolled on any course named exactly `course_name`.
    fn find_by_course_name(&self, course_name: &str) -> RepoResult<Vec<Student>>;
    /// Students assigned to `group_id`.
    fn find_by_group(&self, group_id: GroupId) -> RepoResult<Vec<Student>>;
}

/// SQLite-backed student repository.
#[derive(Clone, Copy)]
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["students", "school_groups", "student_courses"])?;
        Ok(Self { conn })
    }

    fn group_reference_valid(&self, group_id: Option<GroupId>) -> RepoResult<bool> {
        match group_id {
            None => Ok(true),
            Some(group_id) => row_exists(
                self.conn,
                "SELECT EXISTS(SELECT 1 FROM school_groups WHERE group_id = ?1);",
                group_id,
            ),
        }
    }

    fn query_students(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<Student>> {
        self.query_students(
            &format!("{STUDENT_SELECT_SQL} ORDER BY student_id ASC;"),
            params![],
        )
    }

    fn get_by_id(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let students =
            self.query_students(&format!("{STUDENT_SELECT_SQL} WHERE student_id = ?1;"), [id])?;
        Ok(students.into_iter().next())
    }

    fn exists_by_id(&self, id: StudentId) -> RepoResult<bool> {
        row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM students WHERE student_id = ?1);",
            id,
        )
    }

    fn save(&self, student: &Student) -> RepoResult<bool> {
        student.validate_assigned()?;

        run_atomically(self.conn, "student_save", || {
            if !self.group_reference_valid(student.group_id)? {
                return Ok(false);
            }

            let changed = self.conn.execute(
                "INSERT INTO students (student_id, group_id, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (student_id) DO NOTHING;",
                params![
                    student.id,
                    student.group_id,
                    student.first_name.as_str(),
                    student.last_name.as_str(),
                ],
            )?;
            Ok(changed == 1)
        })
    }

    fn save_without_id(
        &self,
        group_id: Option<GroupId>,
        first_name: &str,
        last_name: &str,
    ) -> RepoResult<Option<StudentId>> {
        NewStudent::new(group_id, first_name, last_name).validate()?;

        run_atomically(self.conn, "student_save", || {
            if !self.group_reference_valid(group_id)? {
                return Ok(None);
            }

            self.conn.execute(
                "INSERT INTO students (group_id, first_name, last_name) VALUES (?1, ?2, ?3);",
                params![group_id, first_name, last_name],
            )?;
            Ok(Some(self.conn.last_insert_rowid()))
        })
    }

    fn update(&self, student: &Student) -> RepoResult<bool> {
        student.validate()?;

        run_atomically(self.conn, "student_update", || {
            if !self.group_reference_valid(student.group_id)? {
                return Ok(false);
            }

            let changed = self.conn.execute(
                "UPDATE students
                 SET group_id = ?2,
                     first_name = ?3,
                     last_name = ?4
                 WHERE student_id = ?1;",
                params![
                    student.id,
                    student.group_id,
                    student.first_name.as_str(),
                    student.last_name.as_str(),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete_by_id(&self, id: StudentId) -> RepoResult<bool> {
        run_atomically(self.conn, "student_delete", || {
            self.conn
                .execute("DELETE FROM student_courses WHERE student_id = ?1;", [id])?;
            let changed = self
                .conn
                .execute("DELETE FROM students WHERE student_id = ?1;", [id])?;
            Ok(changed > 0)
        })
    }

    fn delete_all(&self) -> RepoResult<usize> {
        run_atomically(self.conn, "student_delete_all", || {
            self.conn.execute("DELETE FROM student_courses;", [])?;
            let deleted = self.conn.execute("DELETE FROM students;", [])?;
            reset_sequence(self.conn, "students")?;
            Ok(deleted)
        })
    }

    fn get_all_ids(&self) -> RepoResult<Vec<StudentId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT student_id FROM students ORDER BY student_id ASC;")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<StudentId>>>()?;
        Ok(ids)
    }

    fn find_by_course_name(&self, course_name: &str) -> RepoResult<Vec<Student>> {
        self.query_students(
            "SELECT DISTINCT
                s.student_id AS student_id,
                s.group_id AS group_id,
                s.first_name AS first_name,
                s.last_name AS last_name
             FROM students s
             INNER JOIN student_courses sc ON sc.student_id = s.student_id
             INNER JOIN courses c ON c.course_id = sc.course_id
             WHERE c.course_name = ?1
             ORDER BY s.student_id ASC;",
            [course_name],
        )
    }

    fn find_by_group(&self, group_id: GroupId) -> RepoResult<Vec<Student>> {
        self.query_students(
            &format!("{STUDENT_SELECT_SQL} WHERE group_id = ?1 ORDER BY student_id ASC;"),
            [group_id],
        )
    }
}

impl AtomicScope for SqliteStudentRepository<'_> {
    fn atomically<T, E>(&self, label: &str, body: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        run_atomically(self.conn, label, body)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let student = Student {
        id: row.get("student_id")?,
        group_id: row.get("group_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
    };
    student
        .validate()
        .map_err(|err| invalid_row("students", err))?;
    Ok(student)
}
