//! SQLite persistence layer for the ledger documents.
//!
//! RULE: Only the store talks to the database.
//! Services hand records to the store; they never execute SQL directly.
//! The store holds no business rules beyond "absent or unreadable means
//! defaults".

mod documents;

use crate::error::ArcadeResult;
use rusqlite::{params, Connection, OptionalExtension};

pub use documents::{ECONOMY_DOCUMENT, SESSION_DOCUMENT};

pub struct LedgerStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file or shared URI
}

impl LedgerStore {
    pub fn open(path: &str) -> ArcadeResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        log::debug!("ledger store opened at {path}");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ArcadeResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self { conn, path: None })
    }

    /// Open a named in-memory database shared by every connection in this
    /// process that uses the same name. Lives as long as one connection does.
    pub fn shared_memory(name: &str) -> ArcadeResult<Self> {
        Self::open(&format!("file:{name}?mode=memory&cache=shared"))
    }

    /// Reopen a new connection to the same database.
    /// For private in-memory databases, this returns a new, empty database.
    pub fn reopen(&self) -> ArcadeResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ArcadeResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_ledger.sql"))?;
        Ok(())
    }

    // ── Raw documents ──────────────────────────────────────────

    pub fn document(&self, name: &str) -> ArcadeResult<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM ledger_document WHERE name = ?1",
                params![name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(body)
    }

    pub fn put_document(&self, name: &str, body: &str) -> ArcadeResult<()> {
        upsert(&self.conn, name, body)
    }

    pub fn delete_document(&self, name: &str) -> ArcadeResult<()> {
        self.conn
            .execute("DELETE FROM ledger_document WHERE name = ?1", params![name])?;
        Ok(())
    }

    pub fn document_count(&self) -> ArcadeResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM ledger_document", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn upsert(conn: &Connection, name: &str, body: &str) -> ArcadeResult<()> {
    conn.execute(
        "INSERT INTO ledger_document (name, body, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(name) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
        params![name, body, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}
