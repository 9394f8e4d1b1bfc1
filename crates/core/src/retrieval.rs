//! RetrievalClient trait — the abstraction over the knowledge-graph oracle.
//!
//! A client takes a free-text query plus node and edge limits and returns the
//! oracle's ranked nodes and edges. How relevance is computed is the oracle's
//! business; graphhook only relies on the order.
//!
//! Implementations: HTTP search server, static in-process graph.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;
use crate::graph::{GraphEdge, GraphNode, RankedResultSet};

/// How many nodes and edges to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLimits {
    pub nodes: usize,
    pub edges: usize,
}

impl ResultLimits {
    pub const fn new(nodes: usize, edges: usize) -> Self {
        Self { nodes, edges }
    }

    /// Both limits multiplied by `factor`.
    pub const fn scaled(self, factor: usize) -> Self {
        Self {
            nodes: self.nodes * factor,
            edges: self.edges * factor,
        }
    }

    /// Reject zero limits; the oracle has no meaningful answer for them.
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.nodes == 0 {
            return Err(RetrievalError::InvalidLimit { kind: "node" });
        }
        if self.edges == 0 {
            return Err(RetrievalError::InvalidLimit { kind: "edge" });
        }
        Ok(())
    }
}

/// One query's worth of results.
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub nodes: RankedResultSet<GraphNode>,
    pub edges: RankedResultSet<GraphEdge>,

    /// Wall-clock time spent waiting on the oracle
    pub elapsed: Duration,
}

/// The core RetrievalClient trait.
///
/// `fetch` performs no retries; whether to retry or degrade is the caller's
/// decision.
#[async_trait]
pub trait RetrievalClient: Send + Sync {
    /// The client name (e.g., "http", "static").
    fn name(&self) -> &str;

    /// Run one context query.
    async fn fetch(
        &self,
        query: &str,
        limits: ResultLimits,
    ) -> std::result::Result<RetrievalResult, RetrievalError>;
}
