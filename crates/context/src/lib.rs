//! Dual-context knowledge-graph retrieval.
//!
//! Every user turn queries the graph twice: once with the user's prompt
//! (primary context) and once with the agent's previous reply (secondary
//! context). The primary context always keeps its top results; the secondary
//! query is over-fetched and gives way on overlap, backfilling from deeper
//! results so the two sections together surface as much unique information
//! as possible.
//!
//! | Stage | Module |
//! |-------|--------|
//! | Concurrent queries, degradation, timing | [`assembler`] |
//! | Priority deduplication with backfill | [`dedup`] |
//! | Tagged-section rendering for injection | [`render`] |

pub mod assembler;
pub mod dedup;
pub mod render;

#[cfg(test)]
mod test_helpers;

pub use assembler::{Assembly, AssemblyTiming, ContextAssembler};
pub use dedup::{DedupStats, Reconciled, reconcile};
pub use render::render_context;
