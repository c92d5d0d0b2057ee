//! `matchday-registry` — SQLite-backed recipient registry.
//!
//! Holds the live set of chats subscribed to match reminders. The set is
//! mutated by the Telegram command handler (`/start`, `/stop`) and read by the
//! notification dispatcher at fire time, so every operation takes the shared
//! connection lock and reads are always consistent at call time. `add` and
//! `remove` are idempotent.

pub mod db;
pub mod error;

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// Cloneable handle to the recipient set. Safe to share between the command
/// handler, the dispatcher, and the liveness probe.
#[derive(Clone)]
pub struct RecipientRegistry {
    conn: Arc<Mutex<Connection>>,
}

impl RecipientRegistry {
    /// Wrap a connection, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        db::init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Register a chat. Returns `true` if it was newly added; a repeat
    /// registration is a no-op.
    pub fn add(&self, chat_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "INSERT OR IGNORE INTO recipients (chat_id, registered_at) VALUES (?1, ?2)",
            rusqlite::params![chat_id, Utc::now().to_rfc3339()],
        )?;
        if n > 0 {
            info!(%chat_id, "recipient registered");
        }
        Ok(n > 0)
    }

    /// Unregister a chat. Returns `true` if it was present; removing an
    /// absent chat is a no-op, not an error.
    pub fn remove(&self, chat_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM recipients WHERE chat_id = ?1", [chat_id])?;
        if n > 0 {
            info!(%chat_id, "recipient unregistered");
        }
        Ok(n > 0)
    }

    /// All registered chat ids, oldest registration first.
    pub fn list(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT chat_id FROM recipients ORDER BY registered_at, chat_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    /// Number of registered chats.
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM recipients", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
