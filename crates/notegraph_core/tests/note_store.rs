use notegraph_core::{ManualClock, NoteFields, NoteSort, NoteStore, StoreError};
use std::sync::Arc;
use uuid::Uuid;

fn store_at(now_ms: i64) -> (NoteStore, ManualClock) {
    let clock = ManualClock::new(now_ms);
    (NoteStore::new(Arc::new(clock.clone())), clock)
}

#[test]
fn create_overlays_fields_on_defaults() {
    let (mut store, _) = store_at(1_000);

    let blank = store.create(NoteFields::default()).clone();
    assert!(!blank.id.is_nil());
    assert_eq!(blank.title, "");
    assert_eq!(blank.content, "");
    assert!(blank.tags.is_empty());
    assert_eq!(blank.created_at, 1_000);
    assert_eq!(blank.updated_at, 1_000);

    let filled = store
        .create(NoteFields::default().title("Alpha").tags(["X", "x", " y "]))
        .clone();
    assert_eq!(filled.title, "Alpha");
    assert_eq!(filled.content, "");
    assert_eq!(filled.tags.iter().cloned().collect::<Vec<_>>(), vec!["x", "y"]);
    assert_ne!(blank.id, filled.id);
}

#[test]
fn update_merges_fields_and_bumps_updated_at() {
    let (mut store, clock) = store_at(1_000);
    let id = store
        .create(NoteFields::default().title("Draft").content("body"))
        .id;

    clock.advance(500);
    let updated = store
        .update(id, NoteFields::default().content("new body"))
        .unwrap();
    assert_eq!(updated.title, "Draft");
    assert_eq!(updated.content, "new body");
    assert_eq!(updated.created_at, 1_000);
    assert_eq!(updated.updated_at, 1_500);
}

#[test]
fn updated_at_never_moves_backwards() {
    let (mut store, clock) = store_at(5_000);
    let id = store.create(NoteFields::default()).id;

    clock.set(1_000);
    let updated = store.update(id, NoteFields::default().title("t")).unwrap();
    assert_eq!(updated.updated_at, 5_000);
}

#[test]
fn update_unknown_id_is_not_found() {
    let (mut store, _) = store_at(0);
    let missing = Uuid::new_v4();
    let err = store.update(missing, NoteFields::default()).unwrap_err();
    assert_eq!(err, StoreError::NotFound(missing));
}

#[test]
fn update_leaves_link_state_stale_until_resolve() {
    let (mut store, _) = store_at(0);
    let target = store.create(NoteFields::default().title("Target")).id;
    let source = store
        .create(NoteFields::default().content("see [[Target]]"))
        .id;
    store.resolve(source).unwrap();
    assert!(store.get(source).unwrap().links_out.contains(&target));

    store
        .update(source, NoteFields::default().content("no links now"))
        .unwrap();
    assert!(store.get(source).unwrap().links_out.contains(&target));
    assert_eq!(store.backlinks(target).len(), 1);

    store.resolve(source).unwrap();
    assert!(store.get(source).unwrap().links_out.is_empty());
    assert!(store.backlinks(target).is_empty());
}

#[test]
fn remove_twice_fails_the_second_time() {
    let (mut store, _) = store_at(0);
    let id = store.create(NoteFields::default().title("Gone")).id;

    let removed = store.remove(id).unwrap();
    assert_eq!(removed.id, id);
    assert!(store.get(id).is_none());
    assert_eq!(store.remove(id).unwrap_err(), StoreError::NotFound(id));
}

#[test]
fn list_keeps_insertion_order_after_removal() {
    let (mut store, _) = store_at(0);
    let a = store.create(NoteFields::default().title("a")).id;
    let b = store.create(NoteFields::default().title("b")).id;
    let c = store.create(NoteFields::default().title("c")).id;

    store.remove(b).unwrap();
    let ids: Vec<_> = store.list().map(|note| note.id).collect();
    assert_eq!(ids, vec![a, c]);
}

#[test]
fn list_sorted_supports_recency_and_title() {
    let (mut store, clock) = store_at(0);
    let zeta = store.create(NoteFields::default().title("Zeta")).id;
    clock.advance(10);
    let alpha = store.create(NoteFields::default().title("alpha")).id;
    clock.advance(10);
    store.update(zeta, NoteFields::default().content("touched")).unwrap();

    let recent: Vec<_> = store
        .list_sorted(NoteSort::UpdatedDesc)
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(recent, vec![zeta, alpha]);

    let by_title: Vec<_> = store
        .list_sorted(NoteSort::TitleAsc)
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(by_title, vec![alpha, zeta]);

    let inserted: Vec<_> = store
        .list_sorted(NoteSort::Inserted)
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(inserted, vec![zeta, alpha]);
}

#[test]
fn list_tags_is_sorted_and_distinct() {
    let (mut store, _) = store_at(0);
    store.create(NoteFields::default().tags(["work", "Rust"]));
    store.create(NoteFields::default().tags(["rust", "home"]));

    assert_eq!(store.list_tags(), vec!["home", "rust", "work"]);
}

#[test]
fn from_notes_rejects_duplicate_ids_and_prunes_dangling_links() {
    let (mut source, clock) = store_at(0);
    let a = source.create(NoteFields::default().title("A")).clone();
    let mut b = source.create(NoteFields::default().title("B")).clone();
    b.links_out.insert(a.id);
    b.links_out.insert(Uuid::new_v4());

    let rebuilt =
        NoteStore::from_notes(vec![a.clone(), b.clone()], Arc::new(clock.clone())).unwrap();
    let loaded_b = rebuilt.get(b.id).unwrap();
    assert_eq!(loaded_b.links_out.len(), 1);
    assert!(loaded_b.links_out.contains(&a.id));
    assert_eq!(rebuilt.backlinks(a.id)[0].id, b.id);

    let err = NoteStore::from_notes(vec![a.clone(), a.clone()], Arc::new(clock)).unwrap_err();
    assert_eq!(err, StoreError::DuplicateId(a.id));
}

#[test]
fn from_notes_normalizes_hand_edited_tags() {
    let (mut source, clock) = store_at(0);
    let mut note = source.create(NoteFields::default().title("A")).clone();
    note.tags = ["Work".to_string(), "  ".to_string(), "work ".to_string()].into();

    let rebuilt = NoteStore::from_notes(vec![note.clone()], Arc::new(clock)).unwrap();
    let loaded = rebuilt.get(note.id).unwrap();
    assert_eq!(loaded.tags.iter().collect::<Vec<_>>(), vec!["work"]);
    assert!(loaded.has_tag("WORK"));
}

#[test]
fn from_notes_rejects_nil_id() {
    let (mut source, clock) = store_at(0);
    let mut note = source.create(NoteFields::default()).clone();
    note.id = Uuid::nil();
    let err = NoteStore::from_notes(vec![note], Arc::new(clock)).unwrap_err();
    assert_eq!(err, StoreError::NilId);
}
