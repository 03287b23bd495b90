//! Schema creation, validation and reset.
//!
//! # Responsibility
//! - Create the `areas`, `tasks`, `notes` and `bridge_notes` tables.
//! - Report whether a database has been set up.
//! - Drop and recreate every table on explicit reset.
//!
//! # Invariants
//! - All DDL runs inside one transaction; a failure leaves nothing committed.
//! - `setup_db` is idempotent (`IF NOT EXISTS` everywhere).
//! - `PRAGMA user_version` mirrors `SCHEMA_VERSION` after setup.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Schema version written to `PRAGMA user_version` by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

// Child tables first so foreign keys never block the drop.
const DROP_SQL: &str = "DROP TABLE IF EXISTS bridge_notes;
DROP TABLE IF EXISTS notes;
DROP TABLE IF EXISTS tasks;
DROP TABLE IF EXISTS areas;";

/// Returns whether the `tasks` table exists on this connection.
pub fn is_setup(conn: &Connection) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'tasks'
        );",
        [],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Creates all tables and indexes that do not exist yet.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `Sqlite` on any DDL failure; the transaction is rolled back.
pub fn setup_db(conn: &Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    if let Err(err) = create_tables(&tx) {
        error!("event=db_setup module=db status=error error={}", err);
        return Err(err.into());
    }
    tx.commit()?;

    info!(
        "event=db_setup module=db status=ok schema_version={}",
        SCHEMA_VERSION
    );
    Ok(())
}

/// Drops every table and recreates an empty schema. All data is discarded.
pub fn reset_db(conn: &Connection) -> DbResult<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let result = tx
        .execute_batch(DROP_SQL)
        .and_then(|()| tx.execute_batch("PRAGMA user_version = 0;"))
        .and_then(|()| create_tables(&tx));
    if let Err(err) = result {
        error!("event=db_reset module=db status=error error={}", err);
        return Err(err.into());
    }
    tx.commit()?;

    info!("event=db_reset module=db status=ok");
    Ok(())
}

fn create_tables(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{is_setup, setup_db, SCHEMA_VERSION};
    use rusqlite::Connection;

    #[test]
    fn fresh_connection_is_not_setup() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!is_setup(&conn).unwrap());
    }

    #[test]
    fn setup_records_schema_version() {
        let conn = Connection::open_in_memory().unwrap();
        setup_db(&conn).unwrap();
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert!(is_setup(&conn).unwrap());
    }
}
