//! Note collection and its durability boundary.
//!
//! # Responsibility
//! - Own the in-memory note store and its mutation contract.
//! - Define the `load_all` / `save_all` persistence collaborator contract.
//!
//! # Invariants
//! - The store is the only sanctioned writer of note fields.
//! - Persistence errors are semantic (`InvalidData`) or transport (`Db`).

pub mod note_store;
pub mod persistence;
