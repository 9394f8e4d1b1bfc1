//! `graphhook inject` — context injection for a submitted prompt.

use std::sync::Arc;
use std::time::{Duration, Instant};

use graphhook_config::HookConfig;
use graphhook_context::{ContextAssembler, render_context};
use graphhook_core::diagnostics::{DiagnosticKind, Diagnostics};
use graphhook_core::graph::ContextBundle;
use graphhook_core::retrieval::RetrievalClient;
use graphhook_retrieval::HttpRetrievalClient;
use graphhook_transcript::TranscriptStore;
use tracing::{debug, warn};

use super::HookInput;

/// Build the context block for `input`. `None` when there is no prompt.
pub async fn run(config: &HookConfig, input: &HookInput) -> Option<String> {
    match HttpRetrievalClient::from_config(&config.retrieval) {
        Ok(client) => run_with(Arc::new(client), config, input).await,
        Err(e) => {
            let mut diagnostics = Diagnostics::new();
            diagnostics.push(DiagnosticKind::Fatal, e.to_string());
            Some(render_context(&ContextBundle::default(), &diagnostics, Duration::ZERO))
        }
    }
}

pub async fn run_with(
    client: Arc<dyn RetrievalClient>,
    config: &HookConfig,
    input: &HookInput,
) -> Option<String> {
    if input.prompt.trim().is_empty() {
        return None;
    }
    debug!(
        session_id = input.session_id.as_deref().unwrap_or(""),
        client = client.name(),
        "Injecting context"
    );

    let start = Instant::now();
    let mut diagnostics = Diagnostics::new();

    let secondary = match &input.transcript_path {
        Some(path) => match TranscriptStore::new(path).last_assistant_text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Could not read previous reply");
                diagnostics.push(DiagnosticKind::Transcript, e.to_string());
                None
            }
        },
        None => None,
    };
    let transcript_read = start.elapsed();

    let mut bundle = ContextBundle::default();
    match ContextAssembler::from_config(client, &config.context) {
        Ok(assembler) => match assembler.assemble(&input.prompt, secondary.as_deref()).await {
            Ok(mut assembly) => {
                assembly.timing.transcript_read = Some(transcript_read);
                debug!(timing = ?assembly.timing, "Assembly timing");
                diagnostics.extend(assembly.diagnostics);
                bundle = assembly.bundle;
            }
            Err(e) => {
                warn!(error = %e, "Primary context query failed");
                diagnostics.push(DiagnosticKind::PrimaryQuery, e.to_string());
            }
        },
        Err(e) => diagnostics.push(DiagnosticKind::Reconciliation, e.to_string()),
    }

    let elapsed = start.elapsed();
    let budget = Duration::from_millis(config.context.latency_budget_ms);
    if elapsed > budget && !diagnostics.has(DiagnosticKind::Performance) {
        diagnostics.push(
            DiagnosticKind::Performance,
            format!(
                "KG query took {:.3}s (threshold: {:.1}s)",
                elapsed.as_secs_f64(),
                budget.as_secs_f64()
            ),
        );
    }

    Some(render_context(&bundle, &diagnostics, elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphhook_core::graph::{GraphEdge, GraphNode};
    use graphhook_retrieval::StaticGraph;
    use std::io::Write;

    fn graph() -> Arc<dyn RetrievalClient> {
        Arc::new(
            StaticGraph::new()
                .with_node(GraphNode::new("n1", "Tokio", "async runtime for Rust"))
                .with_node(GraphNode::new("n2", "Axum", "web framework built on tokio"))
                .with_node(GraphNode::new("n3", "Serde", "serialization framework"))
                .with_edge(
                    GraphEdge::new("e1", "BUILT_ON", "Axum is built on tokio", "n2", "n1")
                        .with_labels(Some("Axum".into()), Some("Tokio".into())),
                ),
        )
    }

    fn input(prompt: &str) -> HookInput {
        HookInput {
            prompt: prompt.into(),
            ..HookInput::default()
        }
    }

    #[tokio::test]
    async fn empty_prompt_prints_nothing() {
        let out = run_with(graph(), &HookConfig::default(), &input("  ")).await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn prompt_without_transcript_has_user_context_only() {
        let out = run_with(graph(), &HookConfig::default(), &input("tokio runtime"))
            .await
            .unwrap();

        assert!(out.starts_with("<knowledge-graph>\n<query-performance>"));
        assert!(out.contains("- [Tokio]: async runtime for Rust"));
        assert!(out.contains("- [Axum] → [BUILT_ON] → [Tokio]: Axum is built on tokio"));
        assert!(!out.contains("<agent-context>"));
        assert!(!out.contains("<errors>"));
    }

    #[tokio::test]
    async fn previous_reply_feeds_agent_context() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            r#"{{"type":"assistant","message":{{"content":[{{"type":"text","text":"Use serde for serialization"}}]}}}}"#
        )
        .unwrap();
        let input = HookInput {
            prompt: "tokio runtime".into(),
            transcript_path: Some(tmp.path().to_path_buf()),
            ..HookInput::default()
        };

        let out = run_with(graph(), &HookConfig::default(), &input).await.unwrap();

        assert!(out.contains("<agent-context>\nNodes:\n- [Serde]: serialization framework"));
    }

    #[tokio::test]
    async fn missing_transcript_is_not_an_error() {
        let input = HookInput {
            prompt: "tokio".into(),
            transcript_path: Some("/nonexistent/graphhook/t.jsonl".into()),
            ..HookInput::default()
        };
        let out = run_with(graph(), &HookConfig::default(), &input).await.unwrap();
        assert!(!out.contains("<errors>"));
    }

    #[tokio::test]
    async fn unreachable_server_still_renders() {
        let mut config = HookConfig::default();
        config.retrieval.base_url = "http://127.0.0.1:9".into();
        config.retrieval.request_timeout_ms = 500;

        let out = run(&config, &input("anything")).await.unwrap();

        assert!(out.contains("<errors>\nKnowledge graph query error:"));
        assert!(out.contains("Nodes: (none found)"));
        assert!(out.ends_with("</knowledge-graph>"));
    }
}
