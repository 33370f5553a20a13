//! Normalization of documentation search results into reference entries.

use tracing::warn;
use url::Url;

use eksreview_shared::{ReferenceEntry, ReferenceItem};

/// Category under which search results are listed.
pub const SEARCH_CATEGORY: &str = "Documentation";

/// Resolve one search item, or `None` if it cannot be shown.
///
/// Plain titles get `placeholder` as their link. Titled links need a
/// non-empty title and a URL that parses.
pub fn normalize_item(item: &ReferenceItem, placeholder: &str) -> Option<ReferenceEntry> {
    let (title, link) = match item {
        ReferenceItem::PlainTitle(title) => (title.trim(), placeholder.to_string()),
        ReferenceItem::TitledLink { title, url } => {
            let parsed = Url::parse(url.trim()).ok()?;
            (title.trim(), String::from(parsed))
        }
    };
    if title.is_empty() {
        return None;
    }
    Some(ReferenceEntry {
        category: SEARCH_CATEGORY.to_string(),
        link,
        description: title.to_string(),
    })
}

/// Normalized search results plus how many raw items were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedReferences {
    pub entries: Vec<ReferenceEntry>,
    pub skipped: usize,
}

/// Normalize raw search items in order, skipping malformed ones.
pub fn normalize_references(raw: &[serde_json::Value], placeholder: &str) -> NormalizedReferences {
    let mut out = NormalizedReferences::default();
    for (index, value) in raw.iter().enumerate() {
        match ReferenceItem::from_value(value).and_then(|item| normalize_item(&item, placeholder)) {
            Some(entry) => out.entries.push(entry),
            None => {
                warn!(index, item = %value, "skipping malformed reference item");
                out.skipped += 1;
            }
        }
    }
    out
}
