//! Core engine for a personal note graph.
//!
//! Notes reference each other through `[[Title]]` markers. This crate owns the
//! note collection, link resolution, the backlink index, structured search,
//! daily notes and export. Storage and UI are collaborators at its edges.

pub mod config;
pub mod db;
pub mod links;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use links::backlinks::BacklinkIndex;
pub use links::graph::{GraphEdge, GraphNode, LinkGraph};
pub use links::parser::{wiki_links, WikiLinks};
pub use links::resolver::{normalize_title, Resolution};
pub use logging::{
    active_log_settings, default_log_level, init_logging, init_logging_with_config, LogSettings,
    LoggingError,
};
pub use model::clock::{format_timestamp, Clock, ManualClock, SystemClock};
pub use model::note::{Note, NoteFields, NoteId};
pub use repo::note_store::{NoteSort, NoteStore, StoreError, StoreResult};
pub use repo::persistence::{
    MemoryPersistence, NotePersistence, PersistenceError, PersistenceResult,
    SqliteNotePersistence,
};
pub use search::engine::search;
pub use search::query::{parse_query, Query, Term};
pub use service::daily::{daily_title, DailyNote, DailyNotes};
pub use service::export::{
    export_all, export_one, import_all, markdown_file_name, ExportDocument, ExportError,
};
pub use service::note_service::{NoteService, NoteServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
