//! Conversation turn types.
//!
//! A turn's content is either a plain string or an ordered list of typed
//! blocks. Only `text` blocks carry conversational text; tool invocations,
//! tool results, and block types we do not recognise contribute nothing.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Context that graphhook itself injected into a user turn. It is stripped
/// from extracted text so injected context never feeds back into capture.
static INJECTED_CONTEXT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s)<user-prompt-submit-hook>.*?</user-prompt-submit-hook>").ok()
});

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Upper-case label used in formatted transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }
}

/// One typed block of turn content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    ToolResult,
    /// Any block type we do not interpret
    Other(String),
}

impl ContentBlock {
    /// Interpret a raw JSON block. Non-object values become `Other`.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let Some(obj) = value.as_object() else {
            return ContentBlock::Other(String::new());
        };
        let kind = obj.get("type").and_then(|t| t.as_str()).unwrap_or_default();
        match kind {
            "text" => ContentBlock::Text(
                obj.get("text")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string(),
            ),
            "tool_result" => ContentBlock::ToolResult,
            other => ContentBlock::Other(other.to_string()),
        }
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self, ContentBlock::ToolResult)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Raw turn content as it appears in the log.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl TurnContent {
    /// Interpret a raw JSON `content` field.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => TurnContent::Text(s.clone()),
            serde_json::Value::Array(blocks) => {
                TurnContent::Blocks(blocks.iter().map(ContentBlock::from_value).collect())
            }
            serde_json::Value::Null => TurnContent::Text(String::new()),
            other => TurnContent::Text(other.to_string()),
        }
    }
}

/// A single turn of the conversation with its derived text.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: TurnContent,

    /// Host-injected record rather than something a participant said
    pub meta: bool,

    text: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: TurnContent) -> Self {
        let text = extract_text(&content);
        Self {
            role,
            content,
            meta: false,
            text,
        }
    }

    /// Mark the turn as a host-injected meta record.
    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    /// A user turn with plain string content.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, TurnContent::Text(text.into()))
    }

    /// An assistant turn with plain string content.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, TurnContent::Text(text.into()))
    }

    /// The extracted conversational text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Text blocks joined by newlines, with injected context removed and the
/// result trimmed.
pub fn extract_text(content: &TurnContent) -> String {
    let raw = match content {
        TurnContent::Text(s) => s.clone(),
        TurnContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    strip_injected_context(&raw).trim().to_string()
}

/// Remove every injected-context span from `text`.
pub fn strip_injected_context(text: &str) -> String {
    match INJECTED_CONTEXT.as_ref() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}
