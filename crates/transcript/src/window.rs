//! Anchor-based window selection over a filtered transcript.
//!
//! The window runs from the most recent user turn containing the cached
//! anchor to the end of the transcript. Without an anchor, or when the
//! anchor is no longer present, it is the last `fallback_window` turns.
//! Periodic captures then drop trailing user turns that have no reply yet;
//! final captures keep them since the log may not be readable afterwards.

use graphhook_config::CaptureConfig;
use graphhook_core::turn::ConversationTurn;
use serde::{Deserialize, Serialize};

/// Why a capture is happening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// The regular every-N-turns capture
    Periodic,
    /// A lifecycle boundary (compaction, session end)
    Final,
}

#[derive(Debug, Clone, Copy)]
pub struct WindowSelector {
    fallback_window: usize,
}

impl WindowSelector {
    pub fn new(fallback_window: usize) -> Self {
        Self { fallback_window }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(config.fallback_window)
    }

    /// Select the window to analyze: a contiguous run of `filtered`, never
    /// reordered.
    ///
    /// An empty result means there is nothing to analyze.
    pub fn select<'a>(
        &self,
        filtered: &'a [ConversationTurn],
        anchor: Option<&str>,
        trigger: TriggerKind,
    ) -> &'a [ConversationTurn] {
        let start = anchor
            .filter(|a| !a.trim().is_empty())
            .and_then(|a| find_anchor(filtered, a))
            .unwrap_or_else(|| filtered.len().saturating_sub(self.fallback_window));

        let mut window = &filtered[start..];
        if trigger == TriggerKind::Periodic {
            while let Some((last, rest)) = window.split_last() {
                if !last.is_user() {
                    break;
                }
                window = rest;
            }
        }
        window
    }
}

impl Default for WindowSelector {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}

/// Index of the newest user turn whose text contains `anchor`.
fn find_anchor(turns: &[ConversationTurn], anchor: &str) -> Option<usize> {
    turns
        .iter()
        .rposition(|t| t.is_user() && t.text().contains(anchor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(turns: &[ConversationTurn]) -> Vec<&str> {
        turns.iter().map(|t| t.text()).collect()
    }

    fn conversation() -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::user("U1 start"),
            ConversationTurn::assistant("A1"),
            ConversationTurn::user("U2 anchor here"),
            ConversationTurn::assistant("A2"),
            ConversationTurn::user("U3 pending"),
        ]
    }

    #[test]
    fn periodic_window_from_anchor_trims_pending_user_turn() {
        let turns = conversation();
        let window = WindowSelector::default().select(&turns, Some("anchor"), TriggerKind::Periodic);
        assert_eq!(texts(window), vec!["U2 anchor here", "A2"]);
    }

    #[test]
    fn final_window_keeps_pending_user_turn() {
        let turns = conversation();
        let window = WindowSelector::default().select(&turns, Some("anchor"), TriggerKind::Final);
        assert_eq!(texts(window), vec!["U2 anchor here", "A2", "U3 pending"]);
    }

    #[test]
    fn newest_matching_user_turn_wins() {
        let turns = vec![
            ConversationTurn::user("deploy it"),
            ConversationTurn::assistant("done"),
            ConversationTurn::user("deploy it again"),
            ConversationTurn::assistant("done again"),
        ];
        let window = WindowSelector::default().select(&turns, Some("deploy it"), TriggerKind::Final);
        assert_eq!(texts(window), vec!["deploy it again", "done again"]);
    }

    #[test]
    fn assistant_turns_never_match_the_anchor() {
        let turns = vec![
            ConversationTurn::user("question"),
            ConversationTurn::assistant("the anchor text"),
        ];
        let window = WindowSelector::new(1).select(&turns, Some("anchor"), TriggerKind::Final);
        assert_eq!(texts(window), vec!["the anchor text"]);
    }

    fn fifteen_turns() -> Vec<ConversationTurn> {
        (0..15)
            .map(|i| {
                if i % 2 == 0 {
                    ConversationTurn::user(format!("u{i}"))
                } else {
                    ConversationTurn::assistant(format!("a{i}"))
                }
            })
            .collect()
    }

    #[test]
    fn no_anchor_falls_back_to_last_ten() {
        let turns = fifteen_turns();

        let final_window = WindowSelector::default().select(&turns, None, TriggerKind::Final);
        assert_eq!(final_window.len(), 10);
        assert_eq!(final_window[0].text(), "a5");

        // the last turn (u14) is a pending user turn
        let periodic = WindowSelector::default().select(&turns, None, TriggerKind::Periodic);
        assert_eq!(periodic.len(), 9);
        assert_eq!(periodic.last().map(|t| t.text()), Some("a13"));
    }

    #[test]
    fn missing_anchor_falls_back_too() {
        let turns = fifteen_turns();
        let window = WindowSelector::default().select(&turns, Some("never said"), TriggerKind::Final);
        assert_eq!(window.len(), 10);

        let empty_anchor = WindowSelector::default().select(&turns, Some(""), TriggerKind::Final);
        assert_eq!(empty_anchor.len(), 10);

        let turns = vec![
            ConversationTurn::user("a  b"),
            ConversationTurn::assistant("x"),
            ConversationTurn::user("c"),
            ConversationTurn::assistant("y"),
        ];
        let blank_anchor = WindowSelector::new(2).select(&turns, Some("  "), TriggerKind::Final);
        assert_eq!(texts(blank_anchor), vec!["c", "y"]);
    }

    #[test]
    fn short_transcript_is_taken_whole() {
        let turns = conversation();
        let window = WindowSelector::default().select(&turns, None, TriggerKind::Final);
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn only_user_turns_trims_to_empty() {
        let turns = vec![ConversationTurn::user("one"), ConversationTurn::user("two")];
        let window = WindowSelector::default().select(&turns, None, TriggerKind::Periodic);
        assert!(window.is_empty());
        assert!(WindowSelector::default().select(&[], None, TriggerKind::Final).is_empty());
    }

    #[test]
    fn selection_is_idempotent() {
        let turns = conversation();
        let selector = WindowSelector::default();
        let first = selector.select(&turns, Some("anchor"), TriggerKind::Periodic);
        let second = selector.select(&turns, Some("anchor"), TriggerKind::Periodic);
        assert_eq!(first, second);

        // selecting again from the window itself is stable
        let again = selector.select(first, Some("anchor"), TriggerKind::Periodic);
        assert_eq!(first, again);
    }
}
