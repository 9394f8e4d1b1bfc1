//! Static in-process graph — useful for testing and offline runs.
//!
//! Ranks a fixed set of nodes and edges by how many query terms appear in
//! their text. Ties keep insertion order, so results are deterministic.

use std::time::Instant;

use async_trait::async_trait;
use graphhook_core::error::RetrievalError;
use graphhook_core::graph::{GraphEdge, GraphNode, RankedResultSet};
use graphhook_core::retrieval::{ResultLimits, RetrievalClient, RetrievalResult};

/// A fixed knowledge graph answering queries by keyword overlap.
#[derive(Debug, Clone, Default)]
pub struct StaticGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl StaticGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: GraphNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: GraphEdge) -> Self {
        self.edges.push(edge);
        self
    }

    fn rank<'a, T: Clone>(
        items: &'a [T],
        query: &[String],
        text_of: impl Fn(&'a T) -> String,
        limit: usize,
    ) -> Vec<T> {
        let mut scored: Vec<(usize, usize, &T)> = items
            .iter()
            .enumerate()
            .filter_map(|(pos, item)| {
                let haystack = text_of(item).to_lowercase();
                let score = query.iter().filter(|t| haystack.contains(t.as_str())).count();
                (score > 0).then_some((score, pos, item))
            })
            .collect();

        // Highest score first; insertion order breaks ties
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, _, item)| item.clone())
            .collect()
    }
}

fn query_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl RetrievalClient for StaticGraph {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(
        &self,
        query: &str,
        limits: ResultLimits,
    ) -> Result<RetrievalResult, RetrievalError> {
        limits.validate()?;
        let start = Instant::now();
        let terms = query_terms(query);

        let nodes = Self::rank(
            &self.nodes,
            &terms,
            |n| format!("{} {}", n.label, n.summary),
            limits.nodes,
        );
        let edges = Self::rank(
            &self.edges,
            &terms,
            |e| format!("{} {} {} {}", e.relation_name, e.fact_text, e.source_label, e.target_label),
            limits.edges,
        );

        Ok(RetrievalResult {
            nodes: RankedResultSet::from_ranked_lossy(nodes).0,
            edges: RankedResultSet::from_ranked_lossy(edges).0,
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> StaticGraph {
        StaticGraph::new()
            .with_node(GraphNode::new("n1", "Rust", "Systems language with ownership"))
            .with_node(GraphNode::new("n2", "Python", "Scripting language"))
            .with_node(GraphNode::new("n3", "Borrow checker", "Enforces Rust ownership rules"))
            .with_edge(GraphEdge::new(
                "e1",
                "ENFORCES",
                "The borrow checker enforces ownership",
                "n3",
                "n1",
            ))
    }

    #[tokio::test]
    async fn ranks_by_term_overlap() {
        let result = graph()
            .fetch("rust ownership", ResultLimits::new(5, 5))
            .await
            .unwrap();
        // n1 and n3 both match two terms; insertion order breaks the tie
        assert_eq!(result.nodes.ids(), vec!["n1", "n3"]);
        assert_eq!(result.edges.ids(), vec!["e1"]);
    }

    #[tokio::test]
    async fn respects_limits() {
        let result = graph()
            .fetch("language", ResultLimits::new(1, 1))
            .await
            .unwrap();
        assert_eq!(result.nodes.ids(), vec!["n1"]);
    }

    #[tokio::test]
    async fn no_match_is_empty() {
        let result = graph()
            .fetch("kubernetes", ResultLimits::new(3, 6))
            .await
            .unwrap();
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
    }

    #[tokio::test]
    async fn rejects_zero_limits() {
        assert!(graph().fetch("rust", ResultLimits::new(3, 0)).await.is_err());
    }
}
