//! StateStore trait — the small amount of state the capture hook keeps
//! between invocations.
//!
//! The host runs at most one hook invocation per conversation at a time, so
//! implementations need no cross-process locking. Values are plain strings.

use async_trait::async_trait;

use crate::error::StateError;

/// Well-known state keys.
pub mod keys {
    /// Turn counter for the periodic capture cadence (`-1` means fresh)
    pub const MESSAGE_COUNT: &str = "message_count";

    /// Text of the turn that opened the current capture interval
    pub const ANCHOR: &str = "last_cached_message";

    /// Unix timestamp of the last pre-compaction capture
    pub const PRECOMPACT_RAN: &str = "precompact_ran";
}

/// A narrow key-value store.
///
/// Implementations: file-per-key directory, in-memory (for testing).
#[async_trait]
pub trait StateStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Read a value. Missing keys are `None`, not an error.
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, StateError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), StateError>;

    /// Delete a value. Returns whether it existed.
    async fn remove(&self, key: &str) -> std::result::Result<bool, StateError>;
}
