use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

/// Applies versioned schema migrations. Safe to run on every open.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    fn is_applied(conn: &Connection, version: i64) -> rusqlite::Result<bool> {
        let row: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM schema_migrations WHERE version = ?1",
                params![version],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row.is_some())
    }

    conn.execute(
        r"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )
        ",
        [],
    )?;

    // Version 1: key-value entries.
    if !is_applied(conn, 1)? {
        conn.execute_batch(
            r"
            BEGIN;
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            COMMIT;
            ",
        )?;
        conn.execute(
            r"
            INSERT INTO schema_migrations (version, applied_at)
            VALUES (?1, ?2)
            ON CONFLICT(version) DO NOTHING
            ",
            params![1_i64, Utc::now().to_rfc3339()],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
