//! SQLite-backed durable store for records.
//!
//! A bridge is opened for a single orchestrator operation and dropped
//! afterwards. Each namespace is a two-column table `(id, payload)`; batch
//! writes run inside one transaction so an interrupted batch leaves nothing
//! behind.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, params};
use tracing::debug;

use crate::roster::tally::error::{Result, SyncError};
use crate::roster::tally::model::{PersistedEntry, RecordId};

pub struct SqliteBridge {
    connection: Connection,
    table: Option<String>,
}

impl SqliteBridge {
    /// Opens the database at `path`, creating the file but not its parent
    /// directories. Fails when the file is unreachable or not a database.
    pub fn open(path: &Path) -> Result<Self> {
        let open_error = |source: rusqlite::Error| SyncError::Open {
            path: path.to_path_buf(),
            source,
        };
        let connection = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(open_error)?;
        // SQLite opens lazily; touching the schema surfaces corrupt files here.
        connection
            .query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(open_error)?;
        debug!(path = %path.display(), "record database opened");
        Ok(Self {
            connection,
            table: None,
        })
    }

    /// Scopes later operations to `name`, creating its table when missing.
    pub fn select_namespace(&mut self, name: &str) -> Result<()> {
        if !is_identifier(name) {
            return Err(SyncError::InvalidNamespace(name.to_string()));
        }
        self.connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{name}\" (
                id TEXT PRIMARY KEY NOT NULL,
                payload TEXT NOT NULL
            );"
        ))?;
        self.table = Some(name.to_string());
        Ok(())
    }

    /// Reads every entry of the active namespace in first-insert order.
    pub fn select_all(&self) -> Result<Vec<PersistedEntry>> {
        let table = self.table()?;
        let mut statement = self
            .connection
            .prepare(&format!("SELECT id, payload FROM \"{table}\" ORDER BY rowid"))?;
        let rows = statement.query_map([], |row| {
            Ok(PersistedEntry {
                id: row.get(0)?,
                payload: row.get(1)?,
            })
        })?;
        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(table = %table, entry_count = entries.len(), "entries selected");
        Ok(entries)
    }

    /// Writes or overwrites `entries` atomically. Overwritten entries keep
    /// their position in [`select_all`](Self::select_all) order.
    pub fn upsert_batch(&mut self, entries: &[PersistedEntry]) -> Result<()> {
        let table = self.table()?.to_string();
        let tx = self.connection.transaction()?;
        {
            let mut statement = tx.prepare(&format!(
                "INSERT INTO \"{table}\" (id, payload) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET payload = excluded.payload"
            ))?;
            for entry in entries {
                statement.execute(params![entry.id, entry.payload])?;
            }
        }
        tx.commit()?;
        debug!(table = %table, entry_count = entries.len(), "entries upserted");
        Ok(())
    }

    /// Removes `ids` atomically; unknown identities are ignored.
    pub fn delete_batch(&mut self, ids: &[RecordId]) -> Result<()> {
        let table = self.table()?.to_string();
        let tx = self.connection.transaction()?;
        {
            let mut statement = tx.prepare(&format!("DELETE FROM \"{table}\" WHERE id = ?1"))?;
            for id in ids {
                statement.execute(params![id])?;
            }
        }
        tx.commit()?;
        debug!(table = %table, id_count = ids.len(), "entries deleted");
        Ok(())
    }

    fn table(&self) -> Result<&str> {
        self.table.as_deref().ok_or(SyncError::NamespaceNotSelected)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
