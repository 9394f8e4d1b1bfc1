//! Drops user turns that are not part of the conversation proper.

use graphhook_config::CaptureConfig;
use graphhook_core::turn::{ConversationTurn, TurnContent};

/// Removes non-conversational user turns, preserving order.
///
/// A user turn is dropped when it is made up only of tool results, when the
/// host marked it as meta, when it contains a control marker (interrupt
/// notices, slash-command echoes, the capture agent's own instruction), or
/// when it has no text. Assistant turns always pass.
#[derive(Debug, Clone)]
pub struct TranscriptFilter {
    markers: Vec<String>,
}

impl TranscriptFilter {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.control_markers.iter().cloned())
    }

    /// Whether `text` contains any control marker.
    pub fn is_control(&self, text: &str) -> bool {
        self.markers.iter().any(|m| text.contains(m.as_str()))
    }

    pub fn keep(&self, turn: &ConversationTurn) -> bool {
        if !turn.is_user() {
            return true;
        }
        if turn.meta || turn.text().is_empty() || self.is_control(turn.text()) {
            return false;
        }
        !is_tool_results_only(&turn.content)
    }

    pub fn filter(&self, turns: Vec<ConversationTurn>) -> Vec<ConversationTurn> {
        turns.into_iter().filter(|t| self.keep(t)).collect()
    }
}

impl Default for TranscriptFilter {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}

fn is_tool_results_only(content: &TurnContent) -> bool {
    match content {
        TurnContent::Blocks(blocks) => blocks.iter().all(|b| b.is_tool_result()),
        TurnContent::Text(_) => false,
    }
}
