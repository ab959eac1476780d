use rusqlite::{Connection, Result};
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS income (
        id TEXT PRIMARY KEY,
        profile TEXT NOT NULL CHECK (profile IN ('bride', 'groom')),
        occurred_at TEXT NOT NULL,
        amount TEXT NOT NULL,
        source TEXT NOT NULL,
        notes TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE IF NOT EXISTS expense (
        id TEXT PRIMARY KEY,
        profile TEXT NOT NULL CHECK (profile IN ('bride', 'groom')),
        occurred_at TEXT NOT NULL,
        amount TEXT NOT NULL,
        category TEXT NOT NULL,
        notes TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE IF NOT EXISTS pending_income (
        id TEXT PRIMARY KEY,
        profile TEXT NOT NULL CHECK (profile IN ('bride', 'groom')),
        expected_on TEXT NOT NULL,
        amount TEXT NOT NULL,
        source TEXT,
        notes TEXT,
        cleared INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS budget (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        profile TEXT NOT NULL CHECK (profile IN ('bride', 'groom')),
        category TEXT NOT NULL,
        limit_amount TEXT NOT NULL,
        UNIQUE (profile, category)
    );
";

pub fn establish_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

pub fn establish_in_memory_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creates_all_tables() {
        let conn = establish_in_memory_connection().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
                 AND name IN ('income', 'expense', 'pending_income', 'budget')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = establish_in_memory_connection().unwrap();
        assert!(create_schema(&conn).is_ok());
    }

    #[test]
    fn test_establish_connection_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        assert!(establish_connection(&path).is_ok());
        assert!(path.exists());
    }
}
