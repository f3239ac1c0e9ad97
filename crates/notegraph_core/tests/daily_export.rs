use chrono::NaiveDate;
use notegraph_core::{
    export_all, export_one, import_all, EngineConfig, ExportError, ManualClock, MemoryPersistence,
    NoteFields, NoteService, NoteStore,
};
use std::sync::Arc;
use uuid::Uuid;

const DAY_MS: i64 = 86_400_000;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn service_with(
    clock: &ManualClock,
    config: &EngineConfig,
) -> NoteService<MemoryPersistence> {
    NoteService::open(MemoryPersistence::new(), config, Arc::new(clock.clone())).unwrap()
}

#[test]
fn daily_is_idempotent_within_a_simulated_day() {
    let clock = ManualClock::at_date(date(2026, 3, 14));
    let mut service = service_with(&clock, &EngineConfig::default());

    let first = service.daily().unwrap();
    clock.advance(60_000);
    let second = service.daily().unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(service.list().len(), 1);
    assert!(first.has_tag("daily"));
}

#[test]
fn daily_creates_distinct_notes_for_distinct_days() {
    let clock = ManualClock::at_date(date(2026, 3, 14));
    let mut service = service_with(&clock, &EngineConfig::default());

    let first = service.daily().unwrap();
    clock.advance(2 * DAY_MS);
    let later = service.daily().unwrap();

    assert_ne!(first.id, later.id);
    assert_ne!(first.title, later.title);
    assert_eq!(service.list().len(), 2);
}

#[test]
fn daily_for_uses_configured_title_and_reuses_existing_note() {
    let clock = ManualClock::new(0);
    let config = EngineConfig::from_toml_str(
        "daily_title_format = \"Journal %Y-%m-%d\"\ndaily_tags = [\"Journal\"]",
    )
    .unwrap();
    let mut service = service_with(&clock, &config);

    let manual = service
        .create(NoteFields::default().title("Journal 2026-01-02").content("pre-existing"))
        .unwrap();
    let opened = service.daily_for(date(2026, 1, 2)).unwrap();
    assert_eq!(opened.id, manual.id);
    assert_eq!(opened.content, "pre-existing");

    let fresh = service.daily_for(date(2026, 1, 3)).unwrap();
    assert_eq!(fresh.title, "Journal 2026-01-03");
    assert!(fresh.has_tag("journal"));
}

#[test]
fn daily_note_is_a_link_target() {
    let clock = ManualClock::new(0);
    let mut service = service_with(&clock, &EngineConfig::default());
    let day = service.daily_for(date(2026, 5, 1)).unwrap();
    let mention = service
        .create(NoteFields::default().content("recap in [[2026-05-01]]"))
        .unwrap();
    service.resolve_links(mention.id).unwrap();

    assert_eq!(service.backlinks(day.id)[0].id, mention.id);
}

#[test]
fn export_then_import_reproduces_identical_notes() {
    let clock = ManualClock::new(1_700_000_000_000);
    let mut store = NoteStore::new(Arc::new(clock.clone()));
    let target = store
        .create(NoteFields::default().title("Target").tags(["x", "y"]))
        .id;
    clock.advance(1_234);
    let source = store
        .create(NoteFields::default().title("Source").content("[[Target]] [[Nope]]"))
        .id;
    store.resolve(source).unwrap();
    store.create(NoteFields::default());

    let json = export_all(&store).unwrap();
    let imported = import_all(&json).unwrap();
    assert_eq!(imported, store.to_vec());

    let rebuilt = NoteStore::from_notes(imported, Arc::new(clock)).unwrap();
    assert_eq!(rebuilt.backlinks(target)[0].id, source);
    assert_eq!(rebuilt.backlink_index(), store.backlink_index());
}

#[test]
fn export_document_is_field_named() {
    let clock = ManualClock::new(5);
    let mut store = NoteStore::new(Arc::new(clock));
    let id = store.create(NoteFields::default().title("Named")).id;

    let value: serde_json::Value = serde_json::from_str(&export_all(&store).unwrap()).unwrap();
    assert_eq!(value["format"], "notegraph");
    assert_eq!(value["version"], 1);
    assert_eq!(value["exported_at"], 5);
    let note = &value["notes"][0];
    assert_eq!(note["id"], id.to_string());
    assert_eq!(note["title"], "Named");
    assert_eq!(note["created_at"], 5);
    assert!(note["links_out"].as_array().unwrap().is_empty());
    assert!(note["unresolved_links"].as_array().unwrap().is_empty());
}

#[test]
fn export_one_renders_header_then_raw_body() {
    let clock = ManualClock::new(0);
    let mut store = NoteStore::new(Arc::new(clock));
    let id = store
        .create(
            NoteFields::default()
                .title("Plan")
                .content("# Heading\n[[Other]]")
                .tags(["work"]),
        )
        .id;

    let markdown = export_one(&store, id).unwrap();
    let (header, body) = markdown.split_once("\n---\n\n").unwrap();
    assert!(header.starts_with("---\ntitle: \"Plan\"\n"));
    assert!(header.contains("tags: [work]"));
    assert!(header.contains("created: 1970-01-01T00:00:00.000Z"));
    assert!(header.contains("updated: 1970-01-01T00:00:00.000Z"));
    assert_eq!(body, "# Heading\n[[Other]]");

    let missing = Uuid::new_v4();
    assert!(matches!(
        export_one(&store, missing),
        Err(ExportError::NotFound(id)) if id == missing
    ));
}
