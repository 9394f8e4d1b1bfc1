//! Knowledge-graph result types.
//!
//! Nodes and edges come back from the retrieval oracle already ranked. The
//! rank order is the only relevance signal graphhook ever sees, so every list
//! of results is carried as a [`RankedResultSet`] which keeps that order and
//! guarantees that no id appears twice.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconciliationError;

/// An entity in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Opaque identifier assigned by the graph store
    pub id: String,

    /// Entity name
    pub label: String,

    /// Entity summary
    pub summary: String,
}

impl GraphNode {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            summary: summary.into(),
        }
    }
}

/// A fact relating two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Opaque identifier assigned by the graph store
    pub id: String,

    /// Relation name (e.g. `USES`, `PREFERS`)
    pub relation_name: String,

    /// Natural-language statement of the fact
    pub fact_text: String,

    pub source_id: String,
    pub target_id: String,

    /// Display name of the source node; the source id when unknown
    pub source_label: String,

    /// Display name of the target node; the target id when unknown
    pub target_label: String,
}

impl GraphEdge {
    /// Create an edge whose endpoint labels default to the endpoint ids.
    pub fn new(
        id: impl Into<String>,
        relation_name: impl Into<String>,
        fact_text: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        let source_id = source_id.into();
        let target_id = target_id.into();
        Self {
            id: id.into(),
            relation_name: relation_name.into(),
            fact_text: fact_text.into(),
            source_label: source_id.clone(),
            target_label: target_id.clone(),
            source_id,
            target_id,
        }
    }

    /// Override the endpoint labels. `None` or an empty name keeps the id
    /// fallback.
    pub fn with_labels(mut self, source: Option<String>, target: Option<String>) -> Self {
        if let Some(source) = source.filter(|s| !s.is_empty()) {
            self.source_label = source;
        }
        if let Some(target) = target.filter(|t| !t.is_empty()) {
            self.target_label = target;
        }
        self
    }
}

/// Anything carried in a ranked result set has a stable identity.
pub trait Ranked {
    fn id(&self) -> &str;
}

impl Ranked for GraphNode {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Ranked for GraphEdge {
    fn id(&self) -> &str {
        &self.id
    }
}

/// An ordered list of results, most relevant first, with unique ids.
///
/// The constructors are the only way in, so a value of this type always
/// upholds the uniqueness invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedResultSet<T> {
    items: Vec<T>,
}

impl<T> Default for RankedResultSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Ranked> RankedResultSet<T> {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from items already in rank order.
    ///
    /// Fails on the first repeated id.
    pub fn try_from_ranked(items: Vec<T>) -> Result<Self, ReconciliationError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(ReconciliationError::DuplicateId(item.id().to_string()));
            }
        }
        Ok(Self { items })
    }

    /// Build a set from items in rank order, keeping the best-ranked
    /// occurrence of any repeated id.
    ///
    /// Returns the set and the number of items that were dropped.
    pub fn from_ranked_lossy(items: Vec<T>) -> (Self, usize) {
        let total = items.len();
        let mut seen = HashSet::with_capacity(total);
        let mut kept = Vec::with_capacity(total);
        for item in items {
            if seen.insert(item.id().to_string()) {
                kept.push(item);
            }
        }
        let dropped = total - kept.len();
        (Self { items: kept }, dropped)
    }

    /// The first `count` items, in rank order.
    pub fn top(&self, count: usize) -> Self
    where
        T: Clone,
    {
        Self {
            items: self.items.iter().take(count).cloned().collect(),
        }
    }

    /// Walk the set in rank order and collect up to `limit` items accepted by
    /// `accept`.
    ///
    /// Returns the selection and how many items were rejected before the
    /// selection filled up. Items past the point where the selection is full
    /// are never inspected.
    pub fn select<F>(&self, limit: usize, mut accept: F) -> (Self, usize)
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        let mut selected = Vec::with_capacity(limit.min(self.items.len()));
        let mut rejected = 0;
        for item in &self.items {
            if selected.len() >= limit {
                break;
            }
            if accept(item) {
                selected.push(item.clone());
            } else {
                rejected += 1;
            }
        }
        (Self { items: selected }, rejected)
    }

    /// The set of ids, for membership checks.
    pub fn id_set(&self) -> HashSet<&str> {
        self.items.iter().map(Ranked::id).collect()
    }

    /// Ids in rank order.
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(Ranked::id).collect()
    }
}

impl<T> RankedResultSet<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a RankedResultSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The retrieved context for one user turn.
///
/// Built once per turn and handed straight to the renderer; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextBundle {
    pub primary_nodes: RankedResultSet<GraphNode>,
    pub primary_edges: RankedResultSet<GraphEdge>,
    pub secondary_nodes: RankedResultSet<GraphNode>,
    pub secondary_edges: RankedResultSet<GraphEdge>,
}

impl ContextBundle {
    /// Whether the secondary context has anything to show.
    pub fn has_secondary(&self) -> bool {
        !self.secondary_nodes.is_empty() || !self.secondary_edges.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.primary_nodes.is_empty() && self.primary_edges.is_empty() && !self.has_secondary()
    }
}
