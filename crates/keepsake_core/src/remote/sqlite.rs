//! Local `memories` table backed by SQLite.
//!
//! # Invariants
//! - The connection is migrated before the table is constructed.
//! - `id` is assigned by SQLite (`AUTOINCREMENT`), never by callers.

use super::{MemoryRow, MemoryTable, NewMemoryRow, RemoteError, RemoteResult};
use rusqlite::{params, Connection};

const SELECT_SQL: &str = "SELECT id, title, date, description, image_url
     FROM memories
     ORDER BY date ASC, id ASC;";

/// SQLite implementation of the remote table contract.
pub struct SqliteMemoryTable {
    conn: Connection,
}

impl SqliteMemoryTable {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `InvalidData` when the `memories` table is missing.
    pub fn try_new(conn: Connection) -> RemoteResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'memories'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RemoteError::InvalidData(
                "memories table is missing; open the database through open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }

    /// Borrow of the underlying connection, for diagnostics and fixtures.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl MemoryTable for SqliteMemoryTable {
    fn select_ordered_by_date(&self) -> RemoteResult<Vec<MemoryRow>> {
        let mut stmt = self.conn.prepare(SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(MemoryRow {
                id: row.get("id")?,
                title: row.get("title")?,
                date: row.get("date")?,
                description: row.get("description")?,
                image_url: row.get("image_url")?,
            });
        }
        Ok(out)
    }

    fn insert(&self, row: &NewMemoryRow) -> RemoteResult<()> {
        self.conn.execute(
            "INSERT INTO memories (title, date, description, image_url)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                row.title.as_str(),
                row.date.as_str(),
                row.description.as_str(),
                row.image_url.as_str(),
            ],
        )?;
        Ok(())
    }
}
