//! Note use-case service.
//!
//! # Responsibility
//! - Front the note store for presentation callers with owned `Note` values.
//! - Flush the collection through `NotePersistence` after every mutation.
//! - Wire daily notes, search, backlinks and export to one configuration.
//!
//! # Invariants
//! - A mutation is kept only if `save_all` succeeds; otherwise the store
//!   (notes and backlink index) is restored to its pre-mutation snapshot.
//! - Read paths never touch persistence.
//! - Mutations take `&mut self`; shared callers must serialize them behind a
//!   lock.

use crate::config::EngineConfig;
use crate::links::graph::LinkGraph;
use crate::model::clock::Clock;
use crate::model::note::{Note, NoteFields, NoteId};
use crate::repo::note_store::{NoteSort, NoteStore, StoreError};
use crate::repo::persistence::{NotePersistence, PersistenceError};
use crate::search::engine::search;
use crate::service::daily::DailyNotes;
use crate::service::export::{export_all, export_one, import_all, ExportError};
use chrono::NaiveDate;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Loaded or imported notes violate store identity rules.
    Store(StoreError),
    Persistence(PersistenceError),
    Export(ExportError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoteNotFound(_) => None,
            Self::Store(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<PersistenceError> for NoteServiceError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<ExportError> for NoteServiceError {
    fn from(value: ExportError) -> Self {
        match value {
            ExportError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Export(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Note service facade over a store and its persistence collaborator.
pub struct NoteService<P: NotePersistence> {
    store: NoteStore,
    persistence: P,
    daily: DailyNotes,
}

impl<P: NotePersistence> NoteService<P> {
    /// Loads every persisted note and rebuilds the backlink index.
    pub fn open(
        persistence: P,
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> ServiceResult<Self> {
        let notes = persistence.load_all()?;
        let count = notes.len();
        let store = NoteStore::from_notes(notes, clock)?;
        info!("event=service_open module=service status=ok notes={count}");
        Ok(Self {
            store,
            persistence,
            daily: DailyNotes::from_config(config),
        })
    }

    /// Creates one note from `fields` overlaid on empty defaults.
    pub fn create(&mut self, fields: NoteFields) -> ServiceResult<Note> {
        self.commit("note_create", |store| Ok(store.create(fields).clone()))
    }

    /// Merges `fields` into an existing note. Link state stays as last resolved.
    pub fn update(&mut self, id: NoteId, fields: NoteFields) -> ServiceResult<Note> {
        self.commit("note_update", |store| Ok(store.update(id, fields)?.clone()))
    }

    /// Deletes a note and purges every reference to it.
    pub fn remove(&mut self, id: NoteId) -> ServiceResult<Note> {
        self.commit("note_remove", |store| Ok(store.remove(id)?))
    }

    /// Re-parses one note's links and updates its backlink entries.
    pub fn resolve_links(&mut self, id: NoteId) -> ServiceResult<Note> {
        self.commit("note_resolve", |store| Ok(store.resolve(id)?.clone()))
    }

    /// Re-resolves every note in insertion order.
    pub fn resolve_all(&mut self) -> ServiceResult<usize> {
        self.commit("note_resolve_all", |store| Ok(store.resolve_all()))
    }

    pub fn get(&self, id: NoteId) -> Option<Note> {
        self.store.get(id).cloned()
    }

    /// Notes in insertion order.
    pub fn list(&self) -> Vec<Note> {
        self.store.to_vec()
    }

    pub fn list_sorted(&self, sort: NoteSort) -> Vec<Note> {
        owned(self.store.list_sorted(sort))
    }

    pub fn list_tags(&self) -> Vec<String> {
        self.store.list_tags()
    }

    /// Boolean-filter search; malformed queries degrade to free text.
    pub fn search(&self, query: &str) -> Vec<Note> {
        owned(search(&self.store, query))
    }

    /// Notes linking to `id`, most recently updated first. Empty for unknown ids.
    pub fn backlinks(&self, id: NoteId) -> Vec<Note> {
        owned(self.store.backlinks(id))
    }

    pub fn graph(&self) -> LinkGraph {
        self.store.graph()
    }

    /// Opens today's daily note, creating it on first access.
    pub fn daily(&mut self) -> ServiceResult<Note> {
        let today = self.store.clock().today();
        self.daily_for(today)
    }

    /// Opens the daily note for `date`, creating it on first access.
    pub fn daily_for(&mut self, date: NaiveDate) -> ServiceResult<Note> {
        let title = self.daily.title_for(date);
        if let Some(existing) = self.store.find_by_title(&title) {
            return Ok(existing.clone());
        }
        let daily = self.daily.clone();
        self.commit("note_daily", |store| {
            let opened = daily.open(store, date);
            store
                .get(opened.id)
                .cloned()
                .ok_or(NoteServiceError::NoteNotFound(opened.id))
        })
    }

    /// Exports every note as a JSON document.
    pub fn export_json(&self) -> ServiceResult<String> {
        Ok(export_all(&self.store)?)
    }

    /// Renders one note as markdown with a front-matter header.
    pub fn export_markdown(&self, id: NoteId) -> ServiceResult<String> {
        Ok(export_one(&self.store, id)?)
    }

    /// Replaces the whole collection with the notes of an export document.
    pub fn import_json(&mut self, json: &str) -> ServiceResult<usize> {
        let notes = import_all(json)?;
        self.commit("notes_import", move |store| {
            let count = notes.len();
            *store = NoteStore::from_notes(notes, Arc::clone(store.clock()))?;
            Ok(count)
        })
    }

    /// Writes the current collection through persistence.
    pub fn flush(&mut self) -> ServiceResult<()> {
        self.persistence.save_all(&self.store.to_vec())?;
        Ok(())
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    fn commit<T, F>(&mut self, event: &'static str, mutate: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut NoteStore) -> ServiceResult<T>,
    {
        let snapshot = self.store.clone();
        let outcome = mutate(&mut self.store).and_then(|value| {
            self.persistence
                .save_all(&self.store.to_vec())
                .map(|()| value)
                .map_err(NoteServiceError::from)
        });

        match outcome {
            Ok(value) => {
                info!(
                    "event={event} module=service status=ok notes={}",
                    self.store.len()
                );
                Ok(value)
            }
            Err(err) => {
                self.store = snapshot;
                error!("event={event} module=service status=error error={err}");
                Err(err)
            }
        }
    }
}

fn owned(notes: Vec<&Note>) -> Vec<Note> {
    notes.into_iter().cloned().collect()
}
