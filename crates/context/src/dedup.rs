//! Priority deduplication with backfill.
//!
//! The primary list keeps its first `target` items unconditionally. The
//! secondary list is scanned in rank order and keeps an item only if the
//! primary selection does not already contain its id, until it has `target`
//! items or runs out. Because the secondary query is over-fetched, skipped
//! duplicates are replaced by deeper results instead of leaving holes.

use graphhook_core::graph::{Ranked, RankedResultSet};
use serde::Serialize;

/// Bookkeeping from one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Secondary items skipped because the primary selection had them
    pub duplicates_removed: usize,

    /// Secondary items kept
    pub backfilled: usize,
}

/// The outcome of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<T> {
    pub primary: RankedResultSet<T>,
    pub secondary: RankedResultSet<T>,
    pub stats: DedupStats,
}

/// Reconcile a primary and a secondary ranked list down to `target` items
/// each, with the primary taking precedence on overlap.
pub fn reconcile<T>(
    primary: &RankedResultSet<T>,
    secondary: &RankedResultSet<T>,
    target: usize,
) -> Reconciled<T>
where
    T: Ranked + Clone,
{
    let primary = primary.top(target);
    let taken = primary.id_set();
    let (secondary, duplicates_removed) =
        secondary.select(target, |item| !taken.contains(item.id()));

    let stats = DedupStats {
        duplicates_removed,
        backfilled: secondary.len(),
    };
    Reconciled {
        primary,
        secondary,
        stats,
    }
}
