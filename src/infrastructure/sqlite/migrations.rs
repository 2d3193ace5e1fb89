use rusqlite::Connection;

use crate::domain::error::DomainError;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS strategies (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            step_count INTEGER NOT NULL DEFAULT 0,
            definition TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_strategies_updated ON strategies(updated_at);
        "
    ).map_err(|e| DomainError::Database(format!("Migration failed: {e}")))
}
