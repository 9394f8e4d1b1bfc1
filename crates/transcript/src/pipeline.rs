//! Transcript → filter → window → formatted text, for one capture.

use graphhook_config::CaptureConfig;
use graphhook_core::diagnostics::Diagnostics;
use graphhook_core::error::TranscriptReadError;
use graphhook_core::turn::ConversationTurn;
use tracing::debug;

use crate::filter::TranscriptFilter;
use crate::format::format_window;
use crate::store::TranscriptStore;
use crate::window::{TriggerKind, WindowSelector};

/// A selected window ready for extraction.
#[derive(Debug, Clone, Default)]
pub struct CapturedWindow {
    pub turns: Vec<ConversationTurn>,
    /// `None` when no turn in the window has text
    pub text: Option<String>,
    pub diagnostics: Diagnostics,
}

impl CapturedWindow {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct WindowPipeline {
    filter: TranscriptFilter,
    selector: WindowSelector,
}

impl WindowPipeline {
    pub fn new(filter: TranscriptFilter, selector: WindowSelector) -> Self {
        Self { filter, selector }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(
            TranscriptFilter::from_config(config),
            WindowSelector::from_config(config),
        )
    }

    pub async fn run(
        &self,
        store: &TranscriptStore,
        anchor: Option<&str>,
        trigger: TriggerKind,
    ) -> Result<CapturedWindow, TranscriptReadError> {
        let load = store.load().await?;
        let total = load.turns.len();
        let filtered = self.filter.filter(load.turns);
        let window = self.selector.select(&filtered, anchor, trigger);

        debug!(
            total,
            filtered = filtered.len(),
            window = window.len(),
            ?trigger,
            "Capture window selected"
        );

        Ok(CapturedWindow {
            text: format_window(window),
            turns: window.to_vec(),
            diagnostics: load.diagnostics,
        })
    }
}

impl Default for WindowPipeline {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}
