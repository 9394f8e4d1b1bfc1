//! Dual-context assembly.
//!
//! Issues the primary query at the primary limits and, when there is a
//! secondary text, the secondary query at the over-fetch limits. The two
//! queries run concurrently on the current task; dropping the `assemble`
//! future abandons both.
//!
//! # Failure policy
//!
//! - Primary query fails → the assembly fails. There is nothing meaningful
//!   to inject without it.
//! - Secondary query fails → the assembly degrades to primary-only context
//!   and records a diagnostic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use graphhook_config::ContextConfig;
use graphhook_core::diagnostics::{DiagnosticKind, Diagnostics};
use graphhook_core::error::{ReconciliationError, RetrievalError};
use graphhook_core::graph::ContextBundle;
use graphhook_core::retrieval::{ResultLimits, RetrievalClient, RetrievalResult};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dedup::{DedupStats, reconcile};

/// Where the time went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyTiming {
    /// Time spent reading the transcript for the secondary text, filled in
    /// by the caller that did the read
    pub transcript_read: Option<Duration>,
    pub primary_query: Duration,
    /// `None` when no secondary query was issued
    pub secondary_query: Option<Duration>,
    pub dedup: Duration,
    pub total: Duration,
}

/// The result of one assembly.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub bundle: ContextBundle,
    pub diagnostics: Diagnostics,
    pub timing: AssemblyTiming,
    pub node_stats: DedupStats,
    pub edge_stats: DedupStats,
    /// Total time exceeded the latency budget
    pub degraded: bool,
}

/// Runs the two context queries and reconciles their results.
pub struct ContextAssembler {
    client: Arc<dyn RetrievalClient>,
    primary: ResultLimits,
    secondary: ResultLimits,
    latency_budget: Duration,
}

impl ContextAssembler {
    /// Create an assembler.
    ///
    /// The secondary limits must be at least the primary limits, otherwise
    /// the secondary context could never fill its section after
    /// deduplication.
    pub fn new(
        client: Arc<dyn RetrievalClient>,
        primary: ResultLimits,
        secondary: ResultLimits,
    ) -> Result<Self, ReconciliationError> {
        check_limits(primary, secondary)?;
        Ok(Self {
            client,
            primary,
            secondary,
            latency_budget: Duration::from_secs(5),
        })
    }

    /// Create an assembler from the context section of the hook config.
    pub fn from_config(
        client: Arc<dyn RetrievalClient>,
        config: &ContextConfig,
    ) -> Result<Self, ReconciliationError> {
        Ok(Self::new(client, config.primary, config.secondary())?
            .with_latency_budget(Duration::from_millis(config.latency_budget_ms)))
    }

    pub fn with_latency_budget(mut self, budget: Duration) -> Self {
        self.latency_budget = budget;
        self
    }

    /// Assemble context with the configured limits.
    pub async fn assemble(
        &self,
        primary_text: &str,
        secondary_text: Option<&str>,
    ) -> Result<Assembly, RetrievalError> {
        self.assemble_with(primary_text, secondary_text, self.primary, self.secondary)
            .await
    }

    /// Assemble context with explicit limits.
    ///
    /// Each section ends up with at most `primary` nodes and edges; the
    /// secondary query is issued at `secondary` to leave backfill headroom.
    pub async fn assemble_with(
        &self,
        primary_text: &str,
        secondary_text: Option<&str>,
        primary: ResultLimits,
        secondary: ResultLimits,
    ) -> Result<Assembly, RetrievalError> {
        let start = Instant::now();
        let secondary_text = secondary_text.filter(|t| !t.trim().is_empty());

        let primary_query = self.client.fetch(primary_text, primary);
        let (primary_result, secondary_result) = match secondary_text {
            Some(text) => {
                let (p, s) = tokio::join!(primary_query, self.client.fetch(text, secondary));
                (p, Some(s))
            }
            None => (primary_query.await, None),
        };

        let primary_result = primary_result?;
        let mut diagnostics = Diagnostics::new();

        let secondary_elapsed = secondary_result
            .as_ref()
            .and_then(|r| r.as_ref().ok())
            .map(|r| r.elapsed);
        let secondary_result = match secondary_result {
            Some(Ok(result)) => result,
            Some(Err(e)) => {
                warn!(error = %e, "Secondary context query failed, continuing with primary only");
                diagnostics.push(DiagnosticKind::SecondaryQuery, e.to_string());
                RetrievalResult::default()
            }
            None => RetrievalResult::default(),
        };

        let dedup_start = Instant::now();
        let nodes = reconcile(&primary_result.nodes, &secondary_result.nodes, primary.nodes);
        let edges = reconcile(&primary_result.edges, &secondary_result.edges, primary.edges);
        let dedup = dedup_start.elapsed();

        debug!(
            nodes_removed = nodes.stats.duplicates_removed,
            edges_removed = edges.stats.duplicates_removed,
            "Deduplicated secondary context"
        );

        let total = start.elapsed();
        let degraded = total > self.latency_budget;
        if degraded {
            diagnostics.push(
                DiagnosticKind::Performance,
                format!(
                    "KG query took {:.3}s (threshold: {:.1}s)",
                    total.as_secs_f64(),
                    self.latency_budget.as_secs_f64()
                ),
            );
        }

        info!(
            primary_nodes = nodes.primary.len(),
            primary_edges = edges.primary.len(),
            secondary_nodes = nodes.secondary.len(),
            secondary_edges = edges.secondary.len(),
            elapsed_ms = total.as_millis() as u64,
            "Context assembled"
        );

        Ok(Assembly {
            bundle: ContextBundle {
                primary_nodes: nodes.primary,
                primary_edges: edges.primary,
                secondary_nodes: nodes.secondary,
                secondary_edges: edges.secondary,
            },
            diagnostics,
            timing: AssemblyTiming {
                transcript_read: None,
                primary_query: primary_result.elapsed,
                secondary_query: secondary_elapsed,
                dedup,
                total,
            },
            node_stats: nodes.stats,
            edge_stats: edges.stats,
            degraded,
        })
    }
}

fn check_limits(primary: ResultLimits, secondary: ResultLimits) -> Result<(), ReconciliationError> {
    if primary.nodes == 0 || primary.edges == 0 {
        return Err(ReconciliationError::InvalidTarget {
            what: "primary context",
            reason: format!(
                "node and edge targets must be > 0 (got {}/{})",
                primary.nodes, primary.edges
            ),
        });
    }
    if secondary.nodes < primary.nodes || secondary.edges < primary.edges {
        return Err(ReconciliationError::InvalidTarget {
            what: "secondary context",
            reason: format!(
                "over-fetch {}/{} is smaller than the primary target {}/{}",
                secondary.nodes, secondary.edges, primary.nodes, primary.edges
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedClient;
    use graphhook_core::graph::{GraphEdge, GraphNode};
    use graphhook_retrieval::StaticGraph;

    const PRIMARY: ResultLimits = ResultLimits::new(3, 6);
    const SECONDARY: ResultLimits = ResultLimits::new(6, 12);

    fn assembler(client: Arc<dyn RetrievalClient>) -> ContextAssembler {
        ContextAssembler::new(client, PRIMARY, SECONDARY).unwrap()
    }

    #[tokio::test]
    async fn end_to_end_backfill() {
        let client = Arc::new(
            ScriptedClient::new()
                .answer("rust ownership", &["n1", "n2", "n3"], &["e1", "e2"])
                .answer(
                    "rust borrow checker",
                    &["n2", "n4", "n1", "n5", "n6", "n7"],
                    &["e2", "e3"],
                ),
        );

        let assembly = assembler(client.clone())
            .assemble("rust ownership", Some("rust borrow checker"))
            .await
            .unwrap();

        let bundle = &assembly.bundle;
        assert_eq!(bundle.primary_nodes.ids(), vec!["n1", "n2", "n3"]);
        assert_eq!(bundle.secondary_nodes.ids(), vec!["n4", "n5", "n6"]);
        assert_eq!(bundle.primary_edges.ids(), vec!["e1", "e2"]);
        assert_eq!(bundle.secondary_edges.ids(), vec!["e3"]);
        assert_eq!(assembly.node_stats.duplicates_removed, 2);
        assert_eq!(assembly.edge_stats.duplicates_removed, 1);
        assert!(assembly.diagnostics.is_empty());

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&("rust ownership".to_string(), PRIMARY)));
        assert!(calls.contains(&("rust borrow checker".to_string(), SECONDARY)));
    }

    #[tokio::test]
    async fn no_secondary_text_issues_one_query() {
        let client = Arc::new(ScriptedClient::new().answer("hello", &["n1"], &[]));

        let assembly = assembler(client.clone()).assemble("hello", None).await.unwrap();

        assert_eq!(client.calls().len(), 1);
        assert!(!assembly.bundle.has_secondary());
        assert!(assembly.timing.secondary_query.is_none());
    }

    #[tokio::test]
    async fn blank_secondary_text_is_treated_as_absent() {
        let client = Arc::new(ScriptedClient::new().answer("hello", &["n1"], &[]));
        assembler(client.clone())
            .assemble("hello", Some("   \n"))
            .await
            .unwrap();
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn secondary_failure_degrades_to_primary_only() {
        let client = Arc::new(ScriptedClient::new().answer("prompt", &["n1", "n2"], &["e1"]));

        let assembly = assembler(client)
            .assemble("prompt", Some("unroutable reply"))
            .await
            .unwrap();

        assert_eq!(assembly.bundle.primary_nodes.ids(), vec!["n1", "n2"]);
        assert!(!assembly.bundle.has_secondary());
        assert!(assembly.diagnostics.has(DiagnosticKind::SecondaryQuery));
        assert!(assembly.timing.secondary_query.is_none());
    }

    #[tokio::test]
    async fn primary_failure_fails_assembly() {
        let client = Arc::new(ScriptedClient::new().answer("reply", &["n1"], &[]));
        let result = assembler(client).assemble("unroutable prompt", Some("reply")).await;
        assert!(matches!(result, Err(RetrievalError::Network(_))));
    }

    #[tokio::test]
    async fn queries_run_concurrently() {
        let client = Arc::new(
            ScriptedClient::new()
                .answer("a", &["n1"], &[])
                .answer("b", &["n2"], &[])
                .with_delay(Duration::from_millis(30)),
        );

        assembler(client.clone()).assemble("a", Some("b")).await.unwrap();

        assert_eq!(client.max_in_flight(), 2);
    }

    #[tokio::test]
    async fn slow_assembly_is_flagged_degraded() {
        let client = Arc::new(
            ScriptedClient::new()
                .answer("a", &["n1"], &[])
                .with_delay(Duration::from_millis(20)),
        );
        let assembly = assembler(client)
            .with_latency_budget(Duration::from_millis(1))
            .assemble("a", None)
            .await
            .unwrap();

        assert!(assembly.degraded);
        assert!(assembly.diagnostics.has(DiagnosticKind::Performance));
    }

    #[tokio::test]
    async fn explicit_limits_override_configured_ones() {
        let client = Arc::new(ScriptedClient::new().answer(
            "q",
            &["n1", "n2", "n3", "n4"],
            &["e1", "e2", "e3"],
        ));
        let assembly = assembler(client.clone())
            .assemble_with("q", None, ResultLimits::new(1, 2), ResultLimits::new(2, 4))
            .await
            .unwrap();

        assert_eq!(assembly.bundle.primary_nodes.ids(), vec!["n1"]);
        assert_eq!(assembly.bundle.primary_edges.ids(), vec!["e1", "e2"]);
        assert_eq!(client.calls()[0].1, ResultLimits::new(1, 2));
    }

    #[test]
    fn overfetch_smaller_than_target_rejected() {
        let client: Arc<dyn RetrievalClient> = Arc::new(ScriptedClient::new());
        let err = ContextAssembler::new(client, PRIMARY, ResultLimits::new(2, 12)).err();
        assert!(matches!(
            err,
            Some(ReconciliationError::InvalidTarget { what: "secondary context", .. })
        ));
    }

    #[test]
    fn from_config_uses_doubled_secondary() {
        let client: Arc<dyn RetrievalClient> = Arc::new(ScriptedClient::new());
        let asm = ContextAssembler::from_config(client, &ContextConfig::default()).unwrap();
        assert_eq!(asm.primary, PRIMARY);
        assert_eq!(asm.secondary, SECONDARY);
        assert_eq!(asm.latency_budget, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn works_against_static_graph() {
        let graph = StaticGraph::new()
            .with_node(GraphNode::new("rust", "Rust", "ownership and borrowing"))
            .with_node(GraphNode::new("lifetimes", "Lifetimes", "borrowing scopes"))
            .with_edge(GraphEdge::new(
                "e1",
                "HAS",
                "Rust has ownership",
                "rust",
                "ownership",
            ));
        let asm = assembler(Arc::new(graph));

        let assembly = asm.assemble("ownership", Some("borrowing")).await.unwrap();

        assert_eq!(assembly.bundle.primary_nodes.ids(), vec!["rust"]);
        // "rust" also matches the secondary query but belongs to the primary
        assert_eq!(assembly.bundle.secondary_nodes.ids(), vec!["lifetimes"]);
    }
}
