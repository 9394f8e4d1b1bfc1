//! HTTP retrieval client.
//!
//! Talks to a graph search server exposing two endpoints:
//!
//! - `POST /search/nodes` `{query, max_nodes}` → `{nodes: [{uuid, name, summary}]}`
//! - `POST /search` `{query, max_facts}` → `{facts: [{uuid, name, fact, …}]}`
//!
//! Both searches for one query are issued concurrently. Connection pooling is
//! left to `reqwest`; retries are left to the caller.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use graphhook_config::RetrievalConfig;
use graphhook_core::error::RetrievalError;
use graphhook_core::graph::{GraphEdge, GraphNode, RankedResultSet};
use graphhook_core::retrieval::{ResultLimits, RetrievalClient, RetrievalResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A retrieval client backed by a graph search server.
pub struct HttpRetrievalClient {
    base_url: String,
    node_search_path: String,
    fact_search_path: String,
    client: reqwest::Client,
}

impl HttpRetrievalClient {
    /// Create a client for `base_url` with the default endpoint paths.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            node_search_path: "/search/nodes".into(),
            fact_search_path: "/search".into(),
            client,
        })
    }

    /// Create a client from the retrieval section of the hook config.
    pub fn from_config(config: &RetrievalConfig) -> Result<Self, RetrievalError> {
        Ok(Self::new(
            config.base_url.as_str(),
            Duration::from_millis(config.request_timeout_ms),
        )?
        .with_paths(&config.node_search_path, &config.fact_search_path))
    }

    /// Override the endpoint paths.
    pub fn with_paths(mut self, node_search: &str, fact_search: &str) -> Self {
        self.node_search_path = node_search.to_string();
        self.fact_search_path = fact_search.to_string();
        self
    }

    async fn search_nodes(&self, query: &str, max_nodes: usize) -> Result<Vec<GraphNode>, RetrievalError> {
        let response: NodeSearchResponse = self
            .post_json(&self.node_search_path, &NodeSearchRequest { query, max_nodes })
            .await?;

        Ok(response
            .nodes
            .into_iter()
            .map(|n| GraphNode::new(n.uuid, n.name, n.summary))
            .collect())
    }

    async fn search_facts(&self, query: &str, max_facts: usize) -> Result<Vec<GraphEdge>, RetrievalError> {
        let response: FactSearchResponse = self
            .post_json(&self.fact_search_path, &FactSearchRequest { query, max_facts })
            .await?;

        Ok(response
            .facts
            .into_iter()
            .map(|f| {
                GraphEdge::new(f.uuid, f.name, f.fact, f.source_node_uuid, f.target_node_uuid)
                    .with_labels(f.source_node_name, f.target_node_name)
            })
            .collect())
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RetrievalError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RetrievalError::Timeout(format!("{url}: {e}"))
                } else {
                    RetrievalError::Network(format!("{url}: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), url = %url, "Graph search returned error");
            return Err(RetrievalError::ApiError {
                status_code: status.as_u16(),
                message: error_body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RetrievalError::Decode(format!("{url}: {e}")))
    }
}

#[async_trait]
impl RetrievalClient for HttpRetrievalClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(
        &self,
        query: &str,
        limits: ResultLimits,
    ) -> Result<RetrievalResult, RetrievalError> {
        limits.validate()?;

        debug!(
            nodes = limits.nodes,
            edges = limits.edges,
            query_len = query.len(),
            "Querying knowledge graph"
        );

        let start = Instant::now();
        let (nodes, edges) = tokio::try_join!(
            self.search_nodes(query, limits.nodes),
            self.search_facts(query, limits.edges),
        )?;
        let elapsed = start.elapsed();

        let (nodes, dup_nodes) = RankedResultSet::from_ranked_lossy(nodes);
        let (edges, dup_edges) = RankedResultSet::from_ranked_lossy(edges);
        if dup_nodes + dup_edges > 0 {
            debug!(dup_nodes, dup_edges, "Dropped repeated ids from search response");
        }

        Ok(RetrievalResult {
            nodes,
            edges,
            elapsed,
        })
    }
}

// ── Wire types ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct NodeSearchRequest<'a> {
    query: &'a str,
    max_nodes: usize,
}

#[derive(Serialize)]
struct FactSearchRequest<'a> {
    query: &'a str,
    max_facts: usize,
}

#[derive(Deserialize)]
struct NodeSearchResponse {
    #[serde(default)]
    nodes: Vec<ApiNode>,
}

#[derive(Deserialize)]
struct ApiNode {
    uuid: String,
    name: String,
    #[serde(default)]
    summary: String,
}

#[derive(Deserialize)]
struct FactSearchResponse {
    #[serde(default)]
    facts: Vec<ApiFact>,
}

#[derive(Deserialize)]
struct ApiFact {
    uuid: String,
    name: String,
    fact: String,
    #[serde(default)]
    source_node_uuid: String,
    #[serde(default)]
    target_node_uuid: String,
    #[serde(default)]
    source_node_name: Option<String>,
    #[serde(default)]
    target_node_name: Option<String>,
}
