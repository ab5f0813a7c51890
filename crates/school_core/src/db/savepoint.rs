//! Nestable atomic scopes on a shared connection.
//!
//! Repositories borrow the connection immutably, so `rusqlite::Transaction`
//! (which needs `&mut Connection`) is not available to them. Savepoints are
//! issued as plain statements instead. Outside a transaction a savepoint
//! opens one; inside a transaction or another savepoint it nests.

use log::warn;
use rusqlite::Connection;
use std::sync::atomic::{AtomicU64, Ordering};

static SAVEPOINT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Runs `body` inside a savepoint named after `label`.
///
/// The savepoint is released when `body` returns `Ok` and rolled back when it
/// returns `Err`. A failed release is rolled back too and its error returned.
/// A failed rollback is logged and the earlier error is returned.
pub fn with_savepoint<T, E>(
    conn: &Connection,
    label: &str,
    body: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<rusqlite::Error>,
{
    let name = format!(
        "sp_{label}_{}",
        SAVEPOINT_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    conn.execute_batch(&format!("SAVEPOINT {name};"))?;

    match body() {
        Ok(value) => {
            if let Err(release_err) = conn.execute_batch(&format!("RELEASE SAVEPOINT {name};")) {
                rollback(conn, &name);
                return Err(release_err.into());
            }
            Ok(value)
        }
        Err(err) => {
            rollback(conn, &name);
            Err(err)
        }
    }
}

fn rollback(conn: &Connection, name: &str) {
    if let Err(rollback_err) =
        conn.execute_batch(&format!("ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name};"))
    {
        warn!(
            "event=savepoint_rollback module=db status=error savepoint={name} error={rollback_err}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::with_savepoint;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE items (value INTEGER NOT NULL);")
            .unwrap();
        conn
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn ok_body_is_committed() {
        let conn = setup();
        let result: rusqlite::Result<()> = with_savepoint(&conn, "ok", || {
            conn.execute("INSERT INTO items (value) VALUES (1);", [])?;
            Ok(())
        });
        result.unwrap();
        assert_eq!(count(&conn), 1);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn err_body_is_rolled_back() {
        let conn = setup();
        let result: rusqlite::Result<()> = with_savepoint(&conn, "err", || {
            conn.execute("INSERT INTO items (value) VALUES (1);", [])?;
            Err(rusqlite::Error::QueryReturnedNoRows)
        });
        assert!(result.is_err());
        assert_eq!(count(&conn), 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn inner_rollback_keeps_outer_work() {
        let conn = setup();
        let result: rusqlite::Result<()> = with_savepoint(&conn, "outer", || {
            conn.execute("INSERT INTO items (value) VALUES (1);", [])?;
            let inner: rusqlite::Result<()> = with_savepoint(&conn, "inner", || {
                conn.execute("INSERT INTO items (value) VALUES (2);", [])?;
                Err(rusqlite::Error::QueryReturnedNoRows)
            });
            assert!(inner.is_err());
            Ok(())
        });
        result.unwrap();
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn failed_release_is_rolled_back() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parents (id INTEGER PRIMARY KEY);
             CREATE TABLE children (
                 parent_id INTEGER REFERENCES parents (id) DEFERRABLE INITIALLY DEFERRED
             );",
        )
        .unwrap();

        let result: rusqlite::Result<()> = with_savepoint(&conn, "release", || {
            conn.execute("INSERT INTO children (parent_id) VALUES (1);", [])?;
            Ok(())
        });

        assert!(result.is_err());
        assert!(conn.is_autocommit());
        let children: i64 = conn
            .query_row("SELECT COUNT(*) FROM children;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(children, 0);
    }
}
