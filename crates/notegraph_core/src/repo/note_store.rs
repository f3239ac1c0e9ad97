//! In-memory note collection and its mutation contract.
//!
//! # Responsibility
//! - Own create/update/remove/get/list over the note collection.
//! - Own link resolution write-back and the backlink index, so a note's
//!   `links_out` and the index always change in the same call.
//!
//! # Invariants
//! - Iteration order is insertion order.
//! - `update` never touches `links_out`/`unresolved_links`; those are stale
//!   until the next `resolve`.
//! - After `remove(x)`, no note's `links_out` and no backlink set contains `x`.
//! - `updated_at` never moves backwards.

use crate::links::backlinks::BacklinkIndex;
use crate::links::graph::LinkGraph;
use crate::links::resolver::{normalize_title, resolve_targets, TitleIndex};
use crate::model::clock::Clock;
use crate::model::note::{new_note_id, normalize_tags, Note, NoteFields, NoteId};
use indexmap::IndexMap;
use log::warn;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Note store error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced note id is not in the store.
    NotFound(NoteId),
    /// Two loaded notes share one id.
    DuplicateId(NoteId),
    /// Loaded note carries the nil uuid.
    NilId,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::DuplicateId(id) => write!(f, "duplicate note id: {id}"),
            Self::NilId => write!(f, "note id must not be nil"),
        }
    }
}

impl Error for StoreError {}

/// Caller-selectable list order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoteSort {
    /// Creation/insertion order.
    #[default]
    Inserted,
    /// `updated_at DESC`, ties by id ascending.
    UpdatedDesc,
    /// Normalized title ascending, ties by insertion order.
    TitleAsc,
}

#[derive(Debug, Clone)]
pub struct NoteStore {
    notes: IndexMap<NoteId, Note>,
    backlinks: BacklinkIndex,
    clock: Arc<dyn Clock>,
}

impl NoteStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            notes: IndexMap::new(),
            backlinks: BacklinkIndex::default(),
            clock,
        }
    }

    /// Rebuilds a store from persisted notes, in the given order.
    ///
    /// Tags are re-normalized, `links_out` entries pointing at ids absent from
    /// `notes` are pruned, and the backlink index is rebuilt from scratch.
    ///
    /// # Errors
    /// - `NilId` / `DuplicateId` when identity is broken.
    pub fn from_notes(notes: Vec<Note>, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let mut by_id = IndexMap::with_capacity(notes.len());
        for mut note in notes {
            if note.id.is_nil() {
                return Err(StoreError::NilId);
            }
            let raw_tags: Vec<String> = std::mem::take(&mut note.tags).into_iter().collect();
            note.tags = normalize_tags(&raw_tags);
            let id = note.id;
            if by_id.insert(id, note).is_some() {
                return Err(StoreError::DuplicateId(id));
            }
        }

        let known: BTreeSet<NoteId> = by_id.keys().copied().collect();
        let mut pruned = 0usize;
        for note in by_id.values_mut() {
            let before = note.links_out.len();
            note.links_out.retain(|target| known.contains(target));
            pruned += before - note.links_out.len();
        }
        if pruned > 0 {
            warn!(
                "event=store_load module=repo status=pruned dangling_links={}",
                pruned
            );
        }

        let backlinks = BacklinkIndex::rebuild(by_id.values());
        Ok(Self {
            notes: by_id,
            backlinks,
            clock,
        })
    }

    /// Creates a note from `fields` overlaid on empty defaults.
    pub fn create(&mut self, fields: NoteFields) -> &Note {
        let mut id = new_note_id();
        while self.notes.contains_key(&id) {
            id = new_note_id();
        }
        let mut note = Note::blank(id, self.clock.now_ms());
        note.apply(fields);
        self.notes.entry(id).or_insert(note)
    }

    /// Merges `fields` into an existing note and refreshes `updated_at`.
    pub fn update(&mut self, id: NoteId, fields: NoteFields) -> StoreResult<&Note> {
        let now = self.clock.now_ms();
        let note = self.notes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        note.apply(fields);
        note.updated_at = now.max(note.updated_at);
        Ok(&*note)
    }

    /// Deletes a note and every reference other notes hold to it.
    pub fn remove(&mut self, id: NoteId) -> StoreResult<Note> {
        let removed = self
            .notes
            .shift_remove(&id)
            .ok_or(StoreError::NotFound(id))?;

        let sources: Vec<NoteId> = self.backlinks.sources_of(id).collect();
        for source in sources {
            if let Some(note) = self.notes.get_mut(&source) {
                note.links_out.remove(&id);
            }
        }
        self.backlinks.purge(id, &removed.links_out);
        Ok(removed)
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.notes.contains_key(&id)
    }

    /// All notes in insertion order.
    pub fn list(&self) -> impl Iterator<Item = &Note> + '_ {
        self.notes.values()
    }

    pub fn list_sorted(&self, sort: NoteSort) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self.notes.values().collect();
        match sort {
            NoteSort::Inserted => {}
            NoteSort::UpdatedDesc => sort_recent_first(&mut notes),
            NoteSort::TitleAsc => notes.sort_by_cached_key(|note| normalize_title(&note.title)),
        }
        notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Recomputes `links_out`/`unresolved_links` for one note from its content
    /// and applies the diff to the backlink index.
    ///
    /// Ambiguous titles resolve to the first matching note in insertion order.
    /// Does not cascade to notes linking to `id`.
    pub fn resolve(&mut self, id: NoteId) -> StoreResult<&Note> {
        let content = match self.notes.get(&id) {
            Some(note) => note.content.as_str(),
            None => return Err(StoreError::NotFound(id)),
        };
        let titles = TitleIndex::build(
            self.notes
                .values()
                .map(|note| (note.id, note.title.as_str())),
        );
        let resolution = resolve_targets(content, &titles);

        let now = self.clock.now_ms();
        let note = self.notes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if note.links_out != resolution.links_out
            || note.unresolved_links != resolution.unresolved_links
        {
            self.backlinks
                .replace_source(id, &note.links_out, &resolution.links_out);
            note.links_out = resolution.links_out;
            note.unresolved_links = resolution.unresolved_links;
            note.updated_at = now.max(note.updated_at);
        }
        Ok(&*note)
    }

    /// Resolves every note in insertion order. Returns the number resolved.
    pub fn resolve_all(&mut self) -> usize {
        let ids: Vec<NoteId> = self.notes.keys().copied().collect();
        let mut resolved = 0;
        for id in ids {
            if self.resolve(id).is_ok() {
                resolved += 1;
            }
        }
        resolved
    }

    /// Notes whose `links_out` contains `id`, most recently updated first.
    ///
    /// Unknown ids yield an empty list.
    pub fn backlinks(&self, id: NoteId) -> Vec<&Note> {
        let mut sources: Vec<&Note> = self
            .backlinks
            .sources_of(id)
            .filter_map(|source| self.notes.get(&source))
            .collect();
        sort_recent_first(&mut sources);
        sources
    }

    pub fn backlink_index(&self) -> &BacklinkIndex {
        &self.backlinks
    }

    /// Every distinct tag in use, sorted.
    pub fn list_tags(&self) -> Vec<String> {
        let tags: BTreeSet<&String> = self.notes.values().flat_map(|note| &note.tags).collect();
        tags.into_iter().cloned().collect()
    }

    /// First note whose title equals `title` exactly.
    pub fn find_by_title(&self, title: &str) -> Option<&Note> {
        self.notes.values().find(|note| note.title == title)
    }

    pub fn graph(&self) -> LinkGraph {
        LinkGraph::from_notes(self.notes.values(), |id| self.backlinks.sources_of(id).count())
    }

    /// Owned copy of every note, in insertion order.
    pub fn to_vec(&self) -> Vec<Note> {
        self.notes.values().cloned().collect()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

/// Sorts by `updated_at DESC, id ASC`.
pub fn sort_recent_first(notes: &mut [&Note]) {
    notes.sort_by_key(|note| (Reverse(note.updated_at), note.id));
}
