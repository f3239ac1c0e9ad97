//! `[[Target]]` marker extraction.

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Regex};

static WIKI_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]\r\n]+)\]\]").expect("valid wiki link regex"));

/// Lazy iterator over raw link targets, in order of appearance.
pub struct WikiLinks<'t> {
    inner: CaptureMatches<'static, 't>,
}

impl<'t> Iterator for WikiLinks<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .and_then(|caps| caps.get(1).map(|m| m.as_str()))
    }
}

/// Returns every raw link target in `text`, duplicates included.
///
/// Unterminated, empty and nested openers are skipped, not errored.
pub fn wiki_links(text: &str) -> WikiLinks<'_> {
    WikiLinks {
        inner: WIKI_LINK_RE.captures_iter(text),
    }
}
