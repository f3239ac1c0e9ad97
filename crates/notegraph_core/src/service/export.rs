//! Interchange formats for notes.
//!
//! # Responsibility
//! - Serialize the whole collection to a versioned JSON document and back.
//! - Render one note as a markdown file with a front-matter header.
//!
//! # Invariants
//! - `import_all(export_all(store))` reproduces every field, ids and
//!   timestamps included, in insertion order.

use crate::model::clock::format_timestamp;
use crate::model::note::{Note, NoteId};
use crate::repo::note_store::NoteStore;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const EXPORT_FORMAT: &str = "notegraph";
pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum ExportError {
    NotFound(NoteId),
    Json(serde_json::Error),
    UnsupportedFormat { format: String, version: u32 },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Json(err) => write!(f, "export document error: {err}"),
            Self::UnsupportedFormat { format, version } => write!(
                f,
                "unsupported export document `{format}` v{version}; expected `{EXPORT_FORMAT}` v{EXPORT_VERSION}"
            ),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Self-describing export envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub format: String,
    pub version: u32,
    /// Unix epoch milliseconds.
    pub exported_at: i64,
    pub notes: Vec<Note>,
}

impl ExportDocument {
    pub fn new(notes: Vec<Note>, exported_at: i64) -> Self {
        Self {
            format: EXPORT_FORMAT.to_string(),
            version: EXPORT_VERSION,
            exported_at,
            notes,
        }
    }
}

/// Serializes every note to pretty JSON.
pub fn export_all(store: &NoteStore) -> Result<String, ExportError> {
    let document = ExportDocument::new(store.to_vec(), store.clock().now_ms());
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses an export document and returns its notes.
pub fn import_all(json: &str) -> Result<Vec<Note>, ExportError> {
    let document: ExportDocument = serde_json::from_str(json)?;
    if document.format != EXPORT_FORMAT || document.version != EXPORT_VERSION {
        return Err(ExportError::UnsupportedFormat {
            format: document.format,
            version: document.version,
        });
    }
    Ok(document.notes)
}

/// Renders one note as markdown with a front-matter header.
pub fn export_one(store: &NoteStore, id: NoteId) -> Result<String, ExportError> {
    store
        .get(id)
        .map(render_markdown)
        .ok_or(ExportError::NotFound(id))
}

pub fn render_markdown(note: &Note) -> String {
    let tags = note.tags.iter().cloned().collect::<Vec<_>>().join(", ");
    format!(
        "---\ntitle: {}\ntags: [{}]\ncreated: {}\nupdated: {}\n---\n\n{}",
        quote(&note.title),
        tags,
        format_timestamp(note.created_at),
        format_timestamp(note.updated_at),
        note.content
    )
}

/// File name for a markdown export: slugified title, or the id when the title
/// has nothing usable.
pub fn markdown_file_name(note: &Note) -> String {
    let mut slug = String::new();
    for ch in note.title.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        format!("{}.md", note.id)
    } else {
        format!("{slug}.md")
    }
}

// JSON string escaping is valid YAML double-quoted scalar syntax.
fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.replace('"', "'")))
}

#[cfg(test)]
mod tests {
    use super::{import_all, markdown_file_name, render_markdown, ExportError};
    use crate::model::note::{Note, NoteFields};
    use uuid::Uuid;

    #[test]
    fn markdown_has_header_blank_line_then_body() {
        let mut note = Note::blank(Uuid::new_v4(), 0);
        note.apply(
            NoteFields::default()
                .title("Say \"hi\"")
                .content("line one\n[[Other]]")
                .tags(["b", "a"]),
        );

        let rendered = render_markdown(&note);
        assert_eq!(
            rendered,
            "---\ntitle: \"Say \\\"hi\\\"\"\ntags: [a, b]\ncreated: 1970-01-01T00:00:00.000Z\nupdated: 1970-01-01T00:00:00.000Z\n---\n\nline one\n[[Other]]"
        );
    }

    #[test]
    fn file_name_is_slugified() {
        let mut note = Note::blank(Uuid::new_v4(), 0);
        note.apply(NoteFields::default().title("  Weekly Review: 2026/02 "));
        assert_eq!(markdown_file_name(&note), "weekly-review-2026-02.md");

        note.apply(NoteFields::default().title("!!!"));
        assert_eq!(markdown_file_name(&note), format!("{}.md", note.id));
    }

    #[test]
    fn import_rejects_foreign_documents() {
        let err = import_all(r#"{"format":"other","version":1,"exported_at":0,"notes":[]}"#)
            .unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat { .. }));

        let err = import_all("not json").unwrap_err();
        assert!(matches!(err, ExportError::Json(_)));
    }
}
