//! Structured note search.
//!
//! # Responsibility
//! - Parse `field:value` / free-text queries into a predicate.
//! - Filter the note store and shape results in a stable order.
//!
//! # Invariants
//! - Parsing never fails outward; malformed queries degrade to free text.
//! - Results are ordered by `updated_at DESC`, ties by id.

pub mod engine;
pub mod query;
