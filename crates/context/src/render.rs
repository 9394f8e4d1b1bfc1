//! Render a context bundle as the tagged block injected ahead of the prompt.

use std::time::Duration;

use graphhook_core::diagnostics::Diagnostics;
use graphhook_core::graph::{ContextBundle, GraphEdge, GraphNode, RankedResultSet};

/// Render `bundle` as a `<knowledge-graph>` block.
///
/// The agent section is omitted when the secondary context is empty. Any
/// diagnostics are listed in an `<errors>` section ahead of the contexts.
pub fn render_context(bundle: &ContextBundle, diagnostics: &Diagnostics, elapsed: Duration) -> String {
    let mut lines = vec![
        "<knowledge-graph>".to_string(),
        format!("<query-performance>{:.3}s</query-performance>", elapsed.as_secs_f64()),
        String::new(),
    ];

    if !diagnostics.is_empty() {
        lines.push("<errors>".to_string());
        lines.extend(diagnostics.iter().map(ToString::to_string));
        lines.push("</errors>".to_string());
        lines.push(String::new());
    }

    lines.push("<user-context>".to_string());
    render_section(&mut lines, &bundle.primary_nodes, &bundle.primary_edges);
    lines.push("</user-context>".to_string());
    lines.push(String::new());

    if bundle.has_secondary() {
        lines.push("<agent-context>".to_string());
        render_section(&mut lines, &bundle.secondary_nodes, &bundle.secondary_edges);
        lines.push("</agent-context>".to_string());
    }

    lines.push("</knowledge-graph>".to_string());
    lines.join("\n")
}

fn render_section(
    lines: &mut Vec<String>,
    nodes: &RankedResultSet<GraphNode>,
    edges: &RankedResultSet<GraphEdge>,
) {
    if nodes.is_empty() {
        lines.push("Nodes: (none found)".to_string());
    } else {
        lines.push("Nodes:".to_string());
        lines.extend(nodes.iter().map(|n| format!("- [{}]: {}", n.label, n.summary)));
    }

    lines.push(String::new());

    if edges.is_empty() {
        lines.push("Facts: (none found)".to_string());
    } else {
        lines.push("Facts:".to_string());
        lines.extend(edges.iter().map(|e| {
            format!(
                "- [{}] → [{}] → [{}]: {}",
                e.source_label, e.relation_name, e.target_label, e.fact_text
            )
        }));
    }
}
