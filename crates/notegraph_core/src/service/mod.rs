//! Note use-case services.
//!
//! # Responsibility
//! - Orchestrate store, persistence, daily notes and export into use-case APIs.
//! - Keep UI/CLI layers decoupled from storage details.

pub mod daily;
pub mod export;
pub mod note_service;
