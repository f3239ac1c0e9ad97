//! Date-keyed singleton notes.
//!
//! # Invariants
//! - One calendar date maps to one title via a fixed strftime pattern.
//! - Opening the same date twice never creates a second note.

use crate::config::{EngineConfig, DEFAULT_DAILY_TITLE_FORMAT};
use crate::model::note::{NoteFields, NoteId};
use crate::repo::note_store::NoteStore;
use chrono::NaiveDate;
use std::fmt::Write;

/// Result of opening a daily note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyNote {
    pub id: NoteId,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyNotes {
    title_format: String,
    tags: Vec<String>,
}

impl Default for DailyNotes {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl DailyNotes {
    pub fn new(title_format: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title_format: title_format.into(),
            tags,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.daily_title_format.clone(), config.daily_tags.clone())
    }

    pub fn title_for(&self, date: NaiveDate) -> String {
        daily_title(date, &self.title_format)
    }

    /// Returns the note titled for `date`, creating it if absent.
    pub fn open(&self, store: &mut NoteStore, date: NaiveDate) -> DailyNote {
        let title = self.title_for(date);
        if let Some(existing) = store.find_by_title(&title) {
            return DailyNote {
                id: existing.id,
                created: false,
            };
        }
        let created = store.create(
            NoteFields::default()
                .title(title)
                .tags(self.tags.iter().cloned()),
        );
        DailyNote {
            id: created.id,
            created: true,
        }
    }
}

/// Renders the daily title for `date`; falls back to ISO `YYYY-MM-DD` when
/// `format` cannot be rendered.
pub fn daily_title(date: NaiveDate, format: &str) -> String {
    let mut title = String::new();
    if write!(title, "{}", date.format(format)).is_err() || title.trim().is_empty() {
        title.clear();
        let _ = write!(title, "{}", date.format(DEFAULT_DAILY_TITLE_FORMAT));
    }
    title
}
