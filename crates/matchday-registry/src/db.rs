use rusqlite::Connection;

use crate::error::Result;

/// Initialise the registry schema in `conn`. Safe to call on every startup —
/// CREATE IF NOT EXISTS makes it idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS recipients (
            chat_id       TEXT NOT NULL PRIMARY KEY,
            registered_at TEXT NOT NULL
        ) STRICT;
        ",
    )?;
    Ok(())
}
