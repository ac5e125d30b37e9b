// ── Domain-level deduplication ──

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::model::RawSiteEntry;

/// Collapse entries that share a domain.
///
/// The first entry seen for a domain is kept unless a later one is TLS
/// and the kept one is not, so a TLS definition always wins regardless
/// of discovery order. `is_enabled` plays no part in the decision.
pub fn dedupe(entries: impl IntoIterator<Item = RawSiteEntry>) -> IndexMap<String, RawSiteEntry> {
    let mut unique: IndexMap<String, RawSiteEntry> = IndexMap::new();
    for entry in entries {
        match unique.entry(entry.domain.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(mut slot) => {
                if entry.is_tls && !slot.get().is_tls {
                    slot.insert(entry);
                }
            }
        }
    }
    unique
}
