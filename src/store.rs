use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared SQLite store.
///
/// One table holds every module's records; a module "collection" is the set
/// of rows with that `module_type`. The connection is shared behind a mutex,
/// so clones of `Store` operate on the same database.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the database and bootstrap the schema.
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        Self::bootstrap(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn bootstrap(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                module_type TEXT NOT NULL,
                tag TEXT NOT NULL,
                main_tag TEXT NOT NULL,
                identity TEXT NOT NULL,
                main TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create records table")?;

        // Listing predicate and sort both run over (module_type, tag, main_tag)
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_module_tag_main
             ON records (module_type, tag, main_tag)",
            [],
        )
        .context("Failed to create records index")?;

        Ok(())
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}
