//! `graphhook window` — show what a capture would analyze.

use std::path::PathBuf;

use graphhook_config::HookConfig;
use graphhook_core::Result;
use graphhook_transcript::{TranscriptStore, TriggerKind, WindowPipeline};

pub async fn run(
    config: &HookConfig,
    transcript: PathBuf,
    anchor: Option<String>,
    final_capture: bool,
) -> Result<()> {
    let trigger = if final_capture {
        TriggerKind::Final
    } else {
        TriggerKind::Periodic
    };

    let captured = WindowPipeline::from_config(&config.capture)
        .run(&TranscriptStore::new(transcript), anchor.as_deref(), trigger)
        .await?;

    for diagnostic in captured.diagnostics.iter() {
        eprintln!("⚠️  {diagnostic}");
    }

    match captured.text {
        Some(text) => print!("{text}"),
        None => eprintln!("Nothing to analyze: the window has no conversational turns."),
    }
    Ok(())
}
