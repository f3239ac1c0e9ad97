//! Domain model for the note graph.
//!
//! # Responsibility
//! - Define the canonical `Note` record and its editable field overlay.
//! - Provide the injectable time source used for all timestamps.
//!
//! # Invariants
//! - Every note is identified by a stable, non-nil `NoteId`.
//! - `links_out` / `unresolved_links` are derived state, written only by the
//!   store during link resolution and deletion.

pub mod clock;
pub mod note;
