//! Derived target -> sources index.
//!
//! # Responsibility
//! - Answer "who links to X" without scanning every note.
//! - Apply per-source diffs when one note's `links_out` changes.
//!
//! # Invariants
//! - `sources_of(t)` contains `s` iff `t` is in `s.links_out`.
//! - Empty source sets are never stored, so a rebuilt index compares equal to
//!   an incrementally maintained one.

use crate::model::note::{Note, NoteId};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BacklinkIndex {
    sources_by_target: HashMap<NoteId, BTreeSet<NoteId>>,
}

impl BacklinkIndex {
    /// Rebuilds the full index by scanning every note.
    pub fn rebuild<'a, I>(notes: I) -> Self
    where
        I: IntoIterator<Item = &'a Note>,
    {
        let mut index = Self::default();
        for note in notes {
            for target in &note.links_out {
                index.link(note.id, *target);
            }
        }
        index
    }

    /// Sources currently linking to `target`; empty for unknown ids.
    pub fn sources_of(&self, target: NoteId) -> impl Iterator<Item = NoteId> + '_ {
        self.sources_by_target
            .get(&target)
            .into_iter()
            .flat_map(|sources| sources.iter().copied())
    }

    pub fn contains(&self, target: NoteId, source: NoteId) -> bool {
        self.sources_by_target
            .get(&target)
            .is_some_and(|sources| sources.contains(&source))
    }

    /// Replaces `source`'s outgoing edges from `previous` to `next`.
    pub fn replace_source(
        &mut self,
        source: NoteId,
        previous: &BTreeSet<NoteId>,
        next: &BTreeSet<NoteId>,
    ) {
        for dropped in previous.difference(next) {
            self.unlink(source, *dropped);
        }
        for added in next.difference(previous) {
            self.link(source, *added);
        }
    }

    /// Drops every edge touching `id`, as source or as target.
    pub fn purge(&mut self, id: NoteId, outgoing: &BTreeSet<NoteId>) {
        for target in outgoing {
            self.unlink(id, *target);
        }
        self.sources_by_target.remove(&id);
    }

    /// Number of targets with at least one backlink.
    pub fn target_count(&self) -> usize {
        self.sources_by_target.len()
    }

    fn link(&mut self, source: NoteId, target: NoteId) {
        self.sources_by_target
            .entry(target)
            .or_default()
            .insert(source);
    }

    fn unlink(&mut self, source: NoteId, target: NoteId) {
        if let Some(sources) = self.sources_by_target.get_mut(&target) {
            sources.remove(&source);
            if sources.is_empty() {
                self.sources_by_target.remove(&target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BacklinkIndex;
    use crate::model::note::Note;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    #[test]
    fn replace_source_applies_diff() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut index = BacklinkIndex::default();
        index.replace_source(a, &BTreeSet::new(), &BTreeSet::from([b, c]));
        assert!(index.contains(b, a));
        assert!(index.contains(c, a));

        index.replace_source(a, &BTreeSet::from([b, c]), &BTreeSet::from([c]));
        assert!(!index.contains(b, a));
        assert!(index.contains(c, a));
        assert_eq!(index.target_count(), 1);
    }

    #[test]
    fn incremental_matches_rebuild() {
        let mut first = Note::blank(Uuid::new_v4(), 0);
        let mut second = Note::blank(Uuid::new_v4(), 0);
        first.links_out.insert(second.id);
        second.links_out.insert(first.id);
        second.links_out.insert(second.id);

        let mut incremental = BacklinkIndex::default();
        incremental.replace_source(first.id, &BTreeSet::new(), &first.links_out);
        incremental.replace_source(second.id, &BTreeSet::new(), &second.links_out);

        assert_eq!(incremental, BacklinkIndex::rebuild([&first, &second]));
    }

    #[test]
    fn purge_removes_both_directions() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut index = BacklinkIndex::default();
        index.replace_source(a, &BTreeSet::new(), &BTreeSet::from([b]));
        index.replace_source(b, &BTreeSet::new(), &BTreeSet::from([a]));

        index.purge(a, &BTreeSet::from([b]));
        assert_eq!(index.sources_of(a).count(), 0);
        assert_eq!(index.sources_of(b).count(), 0);
        assert_eq!(index.target_count(), 0);
    }

    #[test]
    fn unknown_target_has_no_sources() {
        let index = BacklinkIndex::default();
        assert_eq!(index.sources_of(Uuid::new_v4()).count(), 0);
    }
}
