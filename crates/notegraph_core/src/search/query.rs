//! Query grammar: whitespace-separated terms, AND-combined.
//!
//! A term is free text or `field:value` with `field` in
//! `title | content | tag | before | after` (case-insensitive). Any malformed
//! term turns the whole input into one free-text term.

use crate::model::note::Note;
use chrono::{DateTime, NaiveDate};

/// One predicate over a note. Text values are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Substring of title or content.
    Text(String),
    Title(String),
    Content(String),
    /// Exact tag, case-insensitive.
    Tag(String),
    /// `updated_at` strictly before this epoch-ms instant.
    Before(i64),
    /// `updated_at` strictly after this epoch-ms instant.
    After(i64),
}

impl Term {
    pub fn matches(&self, note: &Note) -> bool {
        match self {
            Self::Text(needle) => {
                contains_folded(&note.title, needle) || contains_folded(&note.content, needle)
            }
            Self::Title(needle) => contains_folded(&note.title, needle),
            Self::Content(needle) => contains_folded(&note.content, needle),
            Self::Tag(tag) => note.tags.contains(tag),
            Self::Before(instant) => note.updated_at < *instant,
            Self::After(instant) => note.updated_at > *instant,
        }
    }
}

/// Parsed query: the conjunction of its terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    terms: Vec<Term>,
    degraded: bool,
}

impl Query {
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Whether the input was malformed and fell back to one free-text term.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn matches(&self, note: &Note) -> bool {
        self.terms.iter().all(|term| term.matches(note))
    }

    fn free_text(input: &str, degraded: bool) -> Self {
        Self {
            terms: vec![Term::Text(input.trim().to_lowercase())],
            degraded,
        }
    }
}

/// Parses `input`; never fails.
///
/// An empty query is one empty free-text term and matches every note.
pub fn parse_query(input: &str) -> Query {
    if input.trim().is_empty() {
        return Query::free_text(input, false);
    }

    let mut terms = Vec::new();
    for token in input.split_whitespace() {
        match parse_term(token) {
            Some(term) => terms.push(term),
            None => return Query::free_text(input, true),
        }
    }
    Query {
        terms,
        degraded: false,
    }
}

fn parse_term(token: &str) -> Option<Term> {
    let Some((field, value)) = token.split_once(':') else {
        return Some(Term::Text(token.to_lowercase()));
    };
    if value.is_empty() {
        return None;
    }
    match field.to_ascii_lowercase().as_str() {
        "title" => Some(Term::Title(value.to_lowercase())),
        "content" => Some(Term::Content(value.to_lowercase())),
        "tag" => Some(Term::Tag(value.to_lowercase())),
        "before" => parse_date(value).map(Term::Before),
        "after" => parse_date(value).map(Term::After),
        _ => None,
    }
}

/// Parses `YYYY-MM-DD` (UTC midnight) or RFC 3339 into epoch milliseconds.
pub fn parse_date(value: &str) -> Option<i64> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|instant| instant.timestamp_millis())
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}
