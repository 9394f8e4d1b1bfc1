//! State store implementations for graphhook.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FileStateStore;
pub use in_memory::InMemoryStateStore;
