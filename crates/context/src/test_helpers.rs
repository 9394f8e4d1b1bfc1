//! Shared test helpers for assembler tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use graphhook_core::error::RetrievalError;
use graphhook_core::graph::{GraphEdge, GraphNode, RankedResultSet};
use graphhook_core::retrieval::{ResultLimits, RetrievalClient, RetrievalResult};

/// A retrieval client with canned answers keyed by query text.
///
/// Queries without a canned answer fail with a network error. Every call is
/// recorded, and the client tracks how many calls were in flight at once.
pub struct ScriptedClient {
    answers: HashMap<String, (Vec<GraphNode>, Vec<GraphEdge>)>,
    delay: Duration,
    calls: Mutex<Vec<(String, ResultLimits)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn answer(mut self, query: &str, nodes: &[&str], edges: &[&str]) -> Self {
        self.answers
            .insert(query.to_string(), (make_nodes(nodes), make_edges(edges)));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<(String, ResultLimits)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RetrievalClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(
        &self,
        query: &str,
        limits: ResultLimits,
    ) -> Result<RetrievalResult, RetrievalError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), limits));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let (nodes, edges) = self
            .answers
            .get(query)
            .cloned()
            .ok_or_else(|| RetrievalError::Network(format!("no route to graph for {query:?}")))?;

        Ok(RetrievalResult {
            nodes: RankedResultSet::try_from_ranked(nodes.into_iter().take(limits.nodes).collect())
                .unwrap(),
            edges: RankedResultSet::try_from_ranked(edges.into_iter().take(limits.edges).collect())
                .unwrap(),
            elapsed: self.delay,
        })
    }
}

pub fn make_nodes(ids: &[&str]) -> Vec<GraphNode> {
    ids.iter()
        .map(|id| GraphNode::new(*id, format!("Node {id}"), format!("About {id}")))
        .collect()
}

pub fn make_edges(ids: &[&str]) -> Vec<GraphEdge> {
    ids.iter()
        .map(|id| GraphEdge::new(*id, "RELATES_TO", format!("Fact {id}"), "src", "dst"))
        .collect()
}
