//! Plain-text rendering of a capture window.

use graphhook_core::turn::ConversationTurn;

const HEADER: &str = "=== CONVERSATION TRANSCRIPT TO ANALYZE ===\n\n";
const FOOTER: &str = "=== END OF TRANSCRIPT ===\n";

/// Render `turns` for the extraction agent. Turns without text are skipped;
/// `None` when no turn has text.
pub fn format_window(turns: &[ConversationTurn]) -> Option<String> {
    let mut out = String::from(HEADER);
    let mut rendered = 0;

    for turn in turns.iter().filter(|t| !t.text().is_empty()) {
        out.push_str(&format!("[{}]:\n{}\n\n", turn.role.label(), turn.text()));
        rendered += 1;
    }

    if rendered == 0 {
        return None;
    }
    out.push_str(FOOTER);
    Some(out)
}
