//! # graphhook core
//!
//! Domain types, traits, and error definitions shared by the graphhook
//! lifecycle hooks. Nothing here performs I/O — this crate defines the model
//! that the retrieval, state, context, and transcript crates implement against.
//!
//! ## Seams
//!
//! - [`RetrievalClient`] — the ranked-search oracle behind context injection
//! - [`StateStore`] — the narrow key-value store holding the capture anchor
//!   and turn counter between invocations

pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod retrieval;
pub mod state;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Error, Result};
pub use graph::{ContextBundle, GraphEdge, GraphNode, Ranked, RankedResultSet};
pub use retrieval::{ResultLimits, RetrievalClient, RetrievalResult};
pub use state::StateStore;
pub use turn::{ContentBlock, ConversationTurn, Role, TurnContent};
