//! Durability boundary for the note collection.
//!
//! # Responsibility
//! - Define the `load_all` / `save_all` contract the core relies on.
//! - Provide a SQLite implementation and an in-memory one.
//!
//! # Invariants
//! - `save_all` replaces the stored collection as a whole, atomically.
//! - `load_all` returns notes in the order they were saved.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::note::{Note, NoteId};
use log::{debug, error};
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use uuid::Uuid;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Persistence-layer error.
#[derive(Debug)]
pub enum PersistenceError {
    Db(DbError),
    /// Stored rows cannot be decoded into notes.
    InvalidData(String),
    /// Backend refused the write (used by non-SQLite backends).
    Unavailable(String),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Unavailable(message) => write!(f, "note storage unavailable: {message}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable storage for the whole note collection.
pub trait NotePersistence {
    /// Loads every stored note in saved order.
    fn load_all(&self) -> PersistenceResult<Vec<Note>>;
    /// Replaces the stored collection with `notes`.
    fn save_all(&mut self, notes: &[Note]) -> PersistenceResult<()>;
}

/// Snapshot kept in process memory. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    notes: Vec<Note>,
    saves: usize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self { notes, saves: 0 }
    }

    /// Number of successful `save_all` calls.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

impl NotePersistence for MemoryPersistence {
    fn load_all(&self) -> PersistenceResult<Vec<Note>> {
        Ok(self.notes.clone())
    }

    fn save_all(&mut self, notes: &[Note]) -> PersistenceResult<()> {
        self.notes = notes.to_vec();
        self.saves += 1;
        Ok(())
    }
}

/// SQLite-backed note storage.
pub struct SqliteNotePersistence {
    conn: Connection,
}

impl SqliteNotePersistence {
    /// Opens (or creates) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> PersistenceResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl NotePersistence for SqliteNotePersistence {
    fn load_all(&self) -> PersistenceResult<Vec<Note>> {
        let mut tags = load_string_sets(&self.conn, "SELECT note_id, tag FROM note_tags;")?;
        let mut unresolved = load_string_sets(
            &self.conn,
            "SELECT note_id, target FROM note_unresolved_links;",
        )?;
        let mut links = load_link_sets(&self.conn)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, created_at, updated_at
             FROM notes
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            let id = parse_note_id(&id_text, "notes.id")?;
            notes.push(Note {
                id,
                title: row.get("title")?,
                content: row.get("content")?,
                tags: tags.remove(&id).unwrap_or_default(),
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
                links_out: links.remove(&id).unwrap_or_default(),
                unresolved_links: unresolved.remove(&id).unwrap_or_default(),
            });
        }

        debug!(
            "event=notes_load module=persistence status=ok count={}",
            notes.len()
        );
        Ok(notes)
    }

    fn save_all(&mut self, notes: &[Note]) -> PersistenceResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Child rows go with the parent via ON DELETE CASCADE.
        tx.execute("DELETE FROM notes;", [])?;
        {
            let mut insert_note = tx.prepare(
                "INSERT INTO notes (id, position, title, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            let mut insert_tag =
                tx.prepare("INSERT INTO note_tags (note_id, tag) VALUES (?1, ?2);")?;
            let mut insert_link =
                tx.prepare("INSERT INTO note_links (source_id, target_id) VALUES (?1, ?2);")?;
            let mut insert_unresolved = tx.prepare(
                "INSERT INTO note_unresolved_links (note_id, target) VALUES (?1, ?2);",
            )?;

            for (position, note) in notes.iter().enumerate() {
                let id = note.id.to_string();
                insert_note.execute(params![
                    id,
                    position as i64,
                    note.title,
                    note.content,
                    note.created_at,
                    note.updated_at,
                ])?;
                for tag in &note.tags {
                    insert_tag.execute(params![id, tag])?;
                }
                for target in &note.links_out {
                    insert_link.execute(params![id, target.to_string()])?;
                }
                for target in &note.unresolved_links {
                    insert_unresolved.execute(params![id, target])?;
                }
            }
        }

        tx.commit().map_err(|err| {
            error!(
                "event=notes_save module=persistence status=error count={} error={}",
                notes.len(),
                err
            );
            err
        })?;
        debug!(
            "event=notes_save module=persistence status=ok count={}",
            notes.len()
        );
        Ok(())
    }
}

fn parse_note_id(value: &str, column: &str) -> PersistenceResult<NoteId> {
    Uuid::parse_str(value).map_err(|_| {
        PersistenceError::InvalidData(format!("invalid uuid value `{value}` in {column}"))
    })
}

fn load_string_sets(
    conn: &Connection,
    sql: &str,
) -> PersistenceResult<HashMap<NoteId, BTreeSet<String>>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut sets: HashMap<NoteId, BTreeSet<String>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let owner: String = row.get(0)?;
        let value: String = row.get(1)?;
        sets.entry(parse_note_id(&owner, "note_id")?)
            .or_default()
            .insert(value);
    }
    Ok(sets)
}

fn load_link_sets(conn: &Connection) -> PersistenceResult<HashMap<NoteId, BTreeSet<NoteId>>> {
    let mut stmt = conn.prepare("SELECT source_id, target_id FROM note_links;")?;
    let mut rows = stmt.query([])?;
    let mut sets: HashMap<NoteId, BTreeSet<NoteId>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let source: String = row.get(0)?;
        let target: String = row.get(1)?;
        sets.entry(parse_note_id(&source, "note_links.source_id")?)
            .or_default()
            .insert(parse_note_id(&target, "note_links.target_id")?);
    }
    Ok(sets)
}
