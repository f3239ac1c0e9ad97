//! Raw target -> note id resolution.
//!
//! # Invariants
//! - Titles match after `normalize_title` on both sides.
//! - Ambiguous titles resolve to the first note in store iteration order.
//! - Whitespace-only targets are dropped (neither resolved nor unresolved).

use crate::links::parser::wiki_links;
use crate::model::note::NoteId;
use std::collections::{BTreeSet, HashMap};

/// Outcome of resolving one note's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub links_out: BTreeSet<NoteId>,
    pub unresolved_links: BTreeSet<String>,
}

/// Normalized-title lookup table built from the store in iteration order.
#[derive(Debug, Default)]
pub struct TitleIndex {
    first_by_title: HashMap<String, NoteId>,
}

impl TitleIndex {
    /// Builds the table; the first id seen for a title wins.
    pub fn build<'a, I>(titles: I) -> Self
    where
        I: IntoIterator<Item = (NoteId, &'a str)>,
    {
        let mut first_by_title = HashMap::new();
        for (id, title) in titles {
            let key = normalize_title(title);
            if key.is_empty() {
                continue;
            }
            first_by_title.entry(key).or_insert(id);
        }
        Self { first_by_title }
    }

    pub fn lookup(&self, target: &str) -> Option<NoteId> {
        self.first_by_title.get(&normalize_title(target)).copied()
    }
}

/// Lowercases, trims and collapses inner whitespace runs to one space.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Partitions every marker in `content` into resolved ids and unresolved targets.
pub fn resolve_targets(content: &str, titles: &TitleIndex) -> Resolution {
    let mut resolution = Resolution::default();
    for raw in wiki_links(content) {
        let target = raw.trim();
        if target.is_empty() {
            continue;
        }
        match titles.lookup(target) {
            Some(id) => {
                resolution.links_out.insert(id);
            }
            None => {
                resolution.unresolved_links.insert(target.to_string());
            }
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, resolve_targets, TitleIndex};
    use uuid::Uuid;

    #[test]
    fn normalize_title_collapses_whitespace_and_case() {
        assert_eq!(normalize_title("  Project \t  Apollo\n"), "project apollo");
        assert_eq!(normalize_title("   "), "");
    }

    #[test]
    fn partitions_targets() {
        let alpha = Uuid::new_v4();
        let titles = TitleIndex::build([(alpha, "Alpha Note")]);
        let resolution =
            resolve_targets("[[alpha   note]] [[Missing]] [[ ]] [[ALPHA NOTE]]", &titles);

        assert_eq!(resolution.links_out.into_iter().collect::<Vec<_>>(), vec![alpha]);
        assert_eq!(
            resolution.unresolved_links.into_iter().collect::<Vec<_>>(),
            vec!["Missing".to_string()]
        );
    }

    #[test]
    fn first_title_in_iteration_order_wins() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let titles = TitleIndex::build([(first, "Same"), (second, " same ")]);
        assert_eq!(titles.lookup("SAME"), Some(first));
    }

    #[test]
    fn untitled_notes_are_never_link_targets() {
        let untitled = Uuid::new_v4();
        let titles = TitleIndex::build([(untitled, "")]);
        assert_eq!(titles.lookup(""), None);
    }
}
