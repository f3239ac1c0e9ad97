//! Query execution over the note store.

use crate::model::note::Note;
use crate::repo::note_store::{sort_recent_first, NoteStore};
use crate::search::query::{parse_query, Query};
use log::debug;

/// Parses `query` and returns matching notes, most recently updated first.
pub fn search<'s>(store: &'s NoteStore, query: &str) -> Vec<&'s Note> {
    let parsed = parse_query(query);
    let hits = search_notes(store.list(), &parsed);
    debug!(
        "event=search module=search status=ok terms={} degraded={} hits={}",
        parsed.terms().len(),
        parsed.is_degraded(),
        hits.len()
    );
    hits
}

/// Filters `notes` by a parsed query and orders the hits.
pub fn search_notes<'a, I>(notes: I, query: &Query) -> Vec<&'a Note>
where
    I: IntoIterator<Item = &'a Note>,
{
    let mut hits: Vec<&Note> = notes.into_iter().filter(|note| query.matches(note)).collect();
    sort_recent_first(&mut hits);
    hits
}
