//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record shared by store, search and export.
//! - Own tag normalization so every entry point collapses tags the same way.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `created_at` is fixed at creation; `updated_at >= created_at`.
//! - `tags` are trimmed, lowercase and non-empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Display title. Not unique; link resolution matches it normalized.
    pub title: String,
    /// Raw text body. Opaque except for `[[...]]` link markers.
    pub content: String,
    pub tags: BTreeSet<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed on every mutation.
    pub updated_at: i64,
    /// Resolved targets as of the last resolve call.
    #[serde(default)]
    pub links_out: BTreeSet<NoteId>,
    /// Raw targets that matched no title as of the last resolve call.
    #[serde(default)]
    pub unresolved_links: BTreeSet<String>,
}

impl Note {
    /// Creates an empty note with the given id, stamped at `now_ms`.
    pub fn blank(id: NoteId, now_ms: i64) -> Self {
        Self {
            id,
            title: String::new(),
            content: String::new(),
            tags: BTreeSet::new(),
            created_at: now_ms,
            updated_at: now_ms,
            links_out: BTreeSet::new(),
            unresolved_links: BTreeSet::new(),
        }
    }

    /// Overlays every field present in `fields`; absent fields are kept.
    ///
    /// Does not touch timestamps or derived link state.
    pub fn apply(&mut self, fields: NoteFields) {
        if let Some(title) = fields.title {
            self.title = title;
        }
        if let Some(content) = fields.content {
            self.content = content;
        }
        if let Some(tags) = fields.tags {
            self.tags = normalize_tags(&tags);
        }
    }

    /// Returns whether any tag equals `tag` ignoring case.
    pub fn has_tag(&self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|wanted| self.tags.contains(&wanted))
    }
}

/// Editable note fields. `None` means "leave as is" (or "use default" on create).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NoteFields {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

/// Normalizes one tag value: trimmed and lowercased, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values.
pub fn normalize_tags(tags: &[String]) -> BTreeSet<String> {
    tags.iter().filter_map(|tag| normalize_tag(tag)).collect()
}

/// Generates a fresh note id.
pub fn new_note_id() -> NoteId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::{normalize_tags, Note, NoteFields};
    use uuid::Uuid;

    #[test]
    fn apply_overlays_only_present_fields() {
        let mut note = Note::blank(Uuid::new_v4(), 10);
        note.apply(NoteFields::default().title("Alpha").content("body"));
        note.apply(NoteFields::default().content("changed"));

        assert_eq!(note.title, "Alpha");
        assert_eq!(note.content, "changed");
        assert!(note.tags.is_empty());
        assert_eq!(note.updated_at, 10);
    }

    #[test]
    fn tags_are_trimmed_lowercased_and_collapsed() {
        let tags = normalize_tags(&[
            " Rust ".to_string(),
            "rust".to_string(),
            "".to_string(),
            "Notes".to_string(),
        ]);
        let collected: Vec<_> = tags.into_iter().collect();
        assert_eq!(collected, vec!["notes".to_string(), "rust".to_string()]);
    }

    #[test]
    fn has_tag_ignores_case() {
        let mut note = Note::blank(Uuid::new_v4(), 0);
        note.apply(NoteFields::default().tags(["Work"]));
        assert!(note.has_tag("WORK"));
        assert!(!note.has_tag("home"));
        assert!(!note.has_tag("  "));
    }
}
