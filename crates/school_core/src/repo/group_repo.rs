//! Group repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, existence and id listing over `school_groups`.
//! - Answer the "groups with at most N students" query.
//!
//! # Invariants
//! - Deleting a group clears `students.group_id` for its members in the same
//!   savepoint; students are never deleted by a group delete.
//! - `delete_all` restarts the group id sequence.

use super::{
    ensure_schema_ready, invalid_row, reset_sequence, row_exists, run_atomically, AtomicScope,
    RepoError, RepoResult,
};
use crate::model::group::{Group, GroupId, NewGroup};
use rusqlite::{params, Connection, Row};

const GROUP_SELECT_SQL: &str = "SELECT group_id, group_name FROM school_groups";

/// Repository interface for group persistence.
pub trait GroupRepository {
    /// Lists all groups in id order.
    fn get_all(&self) -> RepoResult<Vec<Group>>;
    fn get_by_id(&self, id: GroupId) -> RepoResult<Option<Group>>;
    fn exists_by_id(&self, id: GroupId) -> RepoResult<bool>;
    /// Inserts with the caller-assigned id. `false` when the id is taken.
    fn save(&self, group: &Group) -> RepoResult<bool>;
    /// Inserts with a store-assigned id and returns it.
    fn save_without_id(&self, name: &str) -> RepoResult<GroupId>;
    /// Replaces mutable fields. `false` when the id does not exist.
    fn update(&self, group: &Group) -> RepoResult<bool>;
    /// Deletes one group and detaches its students. `false` when absent.
    fn delete_by_id(&self, id: GroupId) -> RepoResult<bool>;
    /// Deletes every group, detaches all students, restarts the sequence.
    /// Returns the number of deleted groups.
    fn delete_all(&self) -> RepoResult<usize>;
    fn get_all_ids(&self) -> RepoResult<Vec<GroupId>>;
    /// Groups whose member count is `<= max_students`, in id order.
    fn find_with_student_count_at_most(&self, max_students: i64) -> RepoResult<Vec<Group>>;
}

/// SQLite-backed group repository.
#[derive(Clone, Copy)]
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["school_groups", "students"])?;
        Ok(Self { conn })
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<Group>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} ORDER BY group_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }
        Ok(groups)
    }

    fn get_by_id(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} WHERE group_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_group_row(row)?));
        }
        Ok(None)
    }

    fn exists_by_id(&self, id: GroupId) -> RepoResult<bool> {
        row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM school_groups WHERE group_id = ?1);",
            id,
        )
    }

    fn save(&self, group: &Group) -> RepoResult<bool> {
        group.validate_assigned()?;

        let changed = self.conn.execute(
            "INSERT INTO school_groups (group_id, group_name)
             VALUES (?1, ?2)
             ON CONFLICT (group_id) DO NOTHING;",
            params![group.id, group.name.as_str()],
        )?;
        Ok(changed == 1)
    }

    fn save_without_id(&self, name: &str) -> RepoResult<GroupId> {
        NewGroup::new(name).validate()?;

        self.conn.execute(
            "INSERT INTO school_groups (group_name) VALUES (?1);",
            [name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, group: &Group) -> RepoResult<bool> {
        group.validate()?;

        let changed = self.conn.execute(
            "UPDATE school_groups SET group_name = ?2 WHERE group_id = ?1;",
            params![group.id, group.name.as_str()],
        )?;
        Ok(changed > 0)
    }

    fn delete_by_id(&self, id: GroupId) -> RepoResult<bool> {
        run_atomically(self.conn, "group_delete", || {
            self.conn.execute(
                "UPDATE students SET group_id = NULL WHERE group_id = ?1;",
                [id],
            )?;
            let changed = self
                .conn
                .execute("DELETE FROM school_groups WHERE group_id = ?1;", [id])?;
            Ok(changed > 0)
        })
    }

    fn delete_all(&self) -> RepoResult<usize> {
        run_atomically(self.conn, "group_delete_all", || {
            self.conn.execute(
                "UPDATE students SET group_id = NULL WHERE group_id IS NOT NULL;",
                [],
            )?;
            let deleted = self.conn.execute("DELETE FROM school_groups;", [])?;
            reset_sequence(self.conn, "school_groups")?;
            Ok(deleted)
        })
    }

    fn get_all_ids(&self) -> RepoResult<Vec<GroupId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT group_id FROM school_groups ORDER BY group_id ASC;")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<GroupId>>>()?;
        Ok(ids)
    }

    fn find_with_student_count_at_most(&self, max_students: i64) -> RepoResult<Vec<Group>> {
        let mut stmt = self.conn.prepare(
            "SELECT g.group_id AS group_id, g.group_name AS group_name
             FROM school_groups g
             LEFT JOIN students s ON s.group_id = g.group_id
             GROUP BY g.group_id, g.group_name
             HAVING COUNT(s.student_id) <= ?1
             ORDER BY g.group_id ASC;",
        )?;
        let mut rows = stmt.query([max_students])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }
        Ok(groups)
    }
}

impl AtomicScope for SqliteGroupRepository<'_> {
    fn atomically<T, E>(&self, label: &str, body: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        run_atomically(self.conn, label, body)
    }
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<Group> {
    let group = Group {
        id: row.get("group_id")?,
        name: row.get("group_name")?,
    };
    group
        .validate()
        .map_err(|err| invalid_row("school_groups", err))?;
    Ok(group)
}
