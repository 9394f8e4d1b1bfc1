//! Transcript store — reads the host's JSON-lines conversation log.
//!
//! Each line is one record: `{"type": "user" | "assistant" | …, "message":
//! {"content": …}, "isMeta": bool}`. Only user and assistant records become
//! turns. A line that is not valid UTF-8 or not valid JSON is skipped and
//! reported as a diagnostic; one bad line never loses the rest of the log.

use std::path::{Path, PathBuf};

use graphhook_core::diagnostics::{DiagnosticKind, Diagnostics};
use graphhook_core::error::TranscriptReadError;
use graphhook_core::turn::{ConversationTurn, Role, TurnContent};
use serde::Deserialize;
use tracing::{debug, warn};

/// Turns read from one transcript, with any per-line problems.
#[derive(Debug, Clone, Default)]
pub struct TranscriptLoad {
    pub turns: Vec<ConversationTurn>,
    pub diagnostics: Diagnostics,
}

impl TranscriptLoad {
    fn skip(&mut self, line: usize, reason: String) {
        let err = TranscriptReadError::Malformed { line, reason };
        warn!(error = %err, "Skipping transcript record");
        self.diagnostics.push(DiagnosticKind::Transcript, err.to_string());
    }
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: Option<RawMessage>,
    #[serde(rename = "isMeta", default)]
    is_meta: bool,
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    content: serde_json::Value,
}

/// Read-only access to one conversation log.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every user and assistant turn in log order.
    pub async fn load(&self) -> Result<TranscriptLoad, TranscriptReadError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TranscriptReadError::NotFound(self.path.clone()));
            }
            Err(e) => {
                return Err(TranscriptReadError::Io {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        let load = Self::parse_bytes(&content);
        debug!(
            path = %self.path.display(),
            turns = load.turns.len(),
            skipped = load.diagnostics.len(),
            "Transcript loaded"
        );
        Ok(load)
    }

    /// Parse JSON-lines content.
    pub fn parse(content: &str) -> TranscriptLoad {
        Self::parse_bytes(content.as_bytes())
    }

    /// Parse raw JSON-lines bytes. The host may still be appending, so each
    /// line is decoded on its own.
    pub fn parse_bytes(content: &[u8]) -> TranscriptLoad {
        let mut load = TranscriptLoad::default();

        for (idx, raw) in content.split(|b| *b == b'\n').enumerate() {
            let line = match std::str::from_utf8(raw) {
                Ok(l) => l,
                Err(e) => {
                    load.skip(idx + 1, e.to_string());
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let record: RawRecord = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(e) => {
                    load.skip(idx + 1, e.to_string());
                    continue;
                }
            };

            let role = match record.kind.as_str() {
                "user" => Role::User,
                "assistant" => Role::Assistant,
                _ => continue,
            };
            let content = record
                .message
                .map(|m| TurnContent::from_value(&m.content))
                .unwrap_or_else(|| TurnContent::Text(String::new()));

            load.turns
                .push(ConversationTurn::new(role, content).with_meta(record.is_meta));
        }

        load
    }

    /// Text of the newest assistant turn that has any.
    ///
    /// A missing transcript is not an error here; there is simply no
    /// previous reply.
    pub async fn last_assistant_text(&self) -> Result<Option<String>, TranscriptReadError> {
        let load = match self.load().await {
            Ok(load) => load,
            Err(TranscriptReadError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(load
            .turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant && !t.text().is_empty())
            .map(|t| t.text().to_string()))
    }
}
