use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use super::data::User;

/// Faults raised by the SQLite user store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not prepare database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("database connection lock was poisoned")]
    Poisoned,
    #[error("background database task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The UserStore manages the SQLite user table.
///
/// Every committed mutation bumps a revision counter published on a
/// watch channel, which is what drives the live queries upstream.
pub struct UserStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
    revision: watch::Sender<u64>,
}

impl UserStore {
    /// Open (or create) the database file at `path` and initialize the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path = path.as_ref().to_path_buf();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        info!("📁 Database opened at: {}", db_path.display());

        Self::with_connection(conn, Some(db_path))
    }

    /// Private in-memory database, gone when the store is dropped
    #[cfg(test)]
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(conn: Connection, db_path: Option<PathBuf>) -> StoreResult<Self> {
        let (revision, _) = watch::channel(0);
        let store = UserStore {
            conn: Mutex::new(conn),
            db_path,
            revision,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates the users table if it doesn't exist.
    fn init_schema(&self) -> StoreResult<()> {
        self.lock()?.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL,
                image_url   TEXT
            )",
            [],
        )?;

        info!("✅ Database schema initialized");
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Publish a new revision so live queries re-run
    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev += 1);
        debug!("store revision is now {}", *self.revision.borrow());
    }

    /// Current revision of the table
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Observe table revisions. The receiver starts at the current revision.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Number of live revision receivers
    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.revision.receiver_count()
    }

    /// Get a count of users in the store
    pub fn user_count(&self) -> StoreResult<i64> {
        let count = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert a user, replacing any row with the same id.
    /// An id of 0 lets SQLite assign a fresh one. Returns the row id.
    pub fn upsert(&self, user: &User) -> StoreResult<i64> {
        let id = (user.id != 0).then_some(user.id);
        let row_id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT OR REPLACE INTO users (id, name, email, image_url) VALUES (?1, ?2, ?3, ?4)",
                params![id, user.name, user.email, user.image_url],
            )?;
            conn.last_insert_rowid()
        };

        self.bump_revision();
        Ok(row_id)
    }

    /// Delete the row matching the user's id. Missing rows are not an error.
    pub fn delete(&self, user: &User) -> StoreResult<()> {
        self.lock()?
            .execute("DELETE FROM users WHERE id = ?1", params![user.id])?;
        self.bump_revision();
        Ok(())
    }

    /// Delete every row
    pub fn clear(&self) -> StoreResult<()> {
        self.lock()?.execute("DELETE FROM users", [])?;
        self.bump_revision();
        Ok(())
    }

    /// Get all users, in insertion (rowid) order
    pub fn all_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, email, image_url FROM users ORDER BY id")?;

        let user_iter = stmt.query_map([], user_from_row)?;

        let mut users = Vec::new();
        for user in user_iter {
            users.push(user?);
        }

        Ok(users)
    }

    /// Get users whose name or email contains `query`.
    ///
    /// Matching is case-sensitive and literal: `instr()` is used instead of
    /// `LIKE`, which would fold ASCII case and treat `%` and `_` as
    /// wildcards.
    pub fn search_users(&self, query: &str) -> StoreResult<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, email, image_url FROM users
             WHERE instr(name, ?1) > 0 OR instr(email, ?1) > 0
             ORDER BY id",
        )?;

        let users = stmt
            .query_map([query], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Run raw SQL against the connection and publish a revision.
    /// Used by tests to break the schema underneath live queries.
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> StoreResult<()> {
        self.lock()?.execute_batch(sql)?;
        self.bump_revision();
        Ok(())
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        image_url: row.get(3)?,
    })
}

// Implement Debug for better error messages
impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("db_path", &self.db_path)
            .field("revision", &self.revision())
            .finish()
    }
}
