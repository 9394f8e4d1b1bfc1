//! Retrieval client implementations for graphhook.
//!
//! - [`HttpRetrievalClient`] — talks to a graph search server over HTTP
//! - [`StaticGraph`] — an in-process ranked oracle over a fixed graph, for
//!   tests and offline runs

pub mod http;
pub mod static_graph;

pub use http::HttpRetrievalClient;
pub use static_graph::StaticGraph;
