//! Transcript capture for graphhook.
//!
//! Every N user turns, or at a lifecycle boundary, the turns since the last
//! capture are selected from the host's conversation log and handed to an
//! extraction agent.
//!
//! - [`store`] — JSON-lines transcript reading
//! - [`filter`] — drops non-conversational user turns
//! - [`window`] — anchor-based window selection
//! - [`format`] — plain-text rendering of a window
//! - [`cadence`] — when a capture is due, backed by a [`StateStore`](graphhook_core::StateStore)
//! - [`pipeline`] — the read → filter → select → format chain

pub mod cadence;
pub mod filter;
pub mod format;
pub mod pipeline;
pub mod store;
pub mod window;

pub use cadence::{CaptureCadence, CaptureDecision, ForcedEvent, SkipReason};
pub use filter::TranscriptFilter;
pub use format::format_window;
pub use pipeline::{CapturedWindow, WindowPipeline};
pub use store::{TranscriptLoad, TranscriptStore};
pub use window::{TriggerKind, WindowSelector};
