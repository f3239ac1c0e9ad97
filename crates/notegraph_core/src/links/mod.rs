//! Wiki-link extraction, resolution and the derived backlink index.
//!
//! # Responsibility
//! - Extract `[[Target]]` markers from raw note text.
//! - Partition raw targets into resolved ids and unresolved strings.
//! - Maintain the reverse mapping target -> sources.
//!
//! # Invariants
//! - Parsing never fails; malformed markers are plain text.
//! - The backlink index is a pure function of all notes' `links_out`.

pub mod backlinks;
pub mod graph;
pub mod parser;
pub mod resolver;
