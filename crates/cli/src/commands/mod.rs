pub mod capture;
pub mod config_cmd;
pub mod inject;
pub mod window;

use std::path::PathBuf;

use serde::Deserialize;
use tokio::io::AsyncReadExt;

/// The JSON payload a host hook passes on stdin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub prompt: String,

    #[serde(default)]
    pub transcript_path: Option<PathBuf>,

    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub hook_event_name: Option<String>,
}

impl HookInput {
    /// Parse a hook payload. Unreadable input yields an empty payload.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring malformed hook input");
            Self::default()
        })
    }
}

pub async fn read_hook_input() -> HookInput {
    let mut raw = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut raw).await {
        tracing::warn!(error = %e, "Failed to read hook input");
    }
    HookInput::parse(&raw)
}
