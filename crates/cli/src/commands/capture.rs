//! `graphhook capture` — periodic and forced transcript capture.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use graphhook_config::HookConfig;
use graphhook_core::Result;
use graphhook_state::FileStateStore;
use graphhook_transcript::{
    CaptureCadence, CaptureDecision, ForcedEvent, TranscriptStore, TriggerKind, WindowPipeline,
};
use tracing::{info, warn};

use super::HookInput;

#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    pub force: bool,
    pub event: Option<String>,
    pub output: Option<PathBuf>,
}

/// Run one capture step. Returns the path of the written window, if any.
pub async fn run(
    config: &HookConfig,
    input: &HookInput,
    options: CaptureOptions,
) -> Result<Option<PathBuf>> {
    let store = Arc::new(FileStateStore::new(config.state_dir()));
    let cadence = CaptureCadence::new(store, &config.capture);

    let decision = if options.force {
        let name = options
            .event
            .as_deref()
            .or(input.hook_event_name.as_deref())
            .unwrap_or_default();
        cadence
            .on_forced(ForcedEvent::from_event_name(name), Utc::now())
            .await?
    } else {
        cadence.on_prompt(&input.prompt).await?
    };

    let (anchor, trigger) = match decision {
        CaptureDecision::Capture { anchor, trigger } => (anchor, trigger),
        CaptureDecision::Skip(reason) => {
            info!(?reason, "No capture due");
            return Ok(None);
        }
    };

    let Some(transcript) = input.transcript_path.as_deref() else {
        warn!("Capture due but the hook input has no transcript path");
        return Ok(None);
    };

    if trigger == TriggerKind::Final && config.capture.forced_settle_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.capture.forced_settle_ms)).await;
    }

    let captured = WindowPipeline::from_config(&config.capture)
        .run(&TranscriptStore::new(transcript), anchor.as_deref(), trigger)
        .await?;
    for diagnostic in captured.diagnostics.iter() {
        warn!(%diagnostic, "Transcript problem during capture");
    }

    let Some(text) = captured.text else {
        info!("Nothing to analyze in capture window");
        return Ok(None);
    };

    let path = options.output.unwrap_or_else(|| {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        config
            .log_dir()
            .join("capture")
            .join(format!("{stamp}_{}.txt", trigger_label(trigger)))
    });
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, text).await?;

    info!(
        path = %path.display(),
        turns = captured.turns.len(),
        ?trigger,
        "Capture window written"
    );
    Ok(Some(path))
}

fn trigger_label(trigger: TriggerKind) -> &'static str {
    match trigger {
        TriggerKind::Periodic => "periodic",
        TriggerKind::Final => "final",
    }
}
