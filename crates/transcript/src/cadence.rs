//! Capture cadence — decides when a transcript window is due.
//!
//! Periodic captures happen every `interval` qualifying user prompts. The
//! counter lives in the state store and has a `-1` sentinel meaning "start a
//! fresh interval". The prompt that opens an interval is cached as the
//! anchor for the next window.
//!
//! ```text
//!   fresh(-1) ──prompt──▶ 1 (anchor := prompt)
//!   n ──prompt──▶ n+1                     while n+1 < interval
//!   n ──prompt──▶ 0 (capture from old anchor, anchor := prompt)
//!   any ──forced──▶ fresh(-1) (capture from anchor, final)
//! ```
//!
//! Forced triggers fire at compaction and at session end. A session end that
//! closely follows a compaction capture is skipped so the same turns are not
//! extracted twice.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use graphhook_config::CaptureConfig;
use graphhook_core::error::StateError;
use graphhook_core::state::{StateStore, keys};
use tracing::{debug, info, warn};

use crate::filter::TranscriptFilter;
use crate::window::TriggerKind;

const FRESH: i64 = -1;

/// The lifecycle event behind a forced trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedEvent {
    PreCompact,
    SessionEnd,
}

impl ForcedEvent {
    /// Classify a host event name. Anything that is not a pre-compaction
    /// event is treated as a session end.
    pub fn from_event_name(name: &str) -> Self {
        if name.to_lowercase().contains("precompact") {
            ForcedEvent::PreCompact
        } else {
            ForcedEvent::SessionEnd
        }
    }
}

/// Why no capture is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty prompt or a control message
    NotQualifying,
    /// First prompt after a forced capture
    IntervalStarted,
    /// Still counting toward the interval
    Counting(i64),
    /// A pre-compaction capture already covered this session end
    RecentPreCompact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureDecision {
    Skip(SkipReason),
    Capture {
        anchor: Option<String>,
        trigger: TriggerKind,
    },
}

impl CaptureDecision {
    pub fn is_capture(&self) -> bool {
        matches!(self, CaptureDecision::Capture { .. })
    }
}

pub struct CaptureCadence {
    store: Arc<dyn StateStore>,
    filter: TranscriptFilter,
    interval: i64,
    forced_dedup: Duration,
}

impl CaptureCadence {
    pub fn new(store: Arc<dyn StateStore>, config: &CaptureConfig) -> Self {
        Self {
            store,
            filter: TranscriptFilter::from_config(config),
            interval: i64::from(config.interval),
            forced_dedup: Duration::from_secs(config.forced_dedup_secs),
        }
    }

    /// Advance the cadence for one user prompt.
    pub async fn on_prompt(&self, prompt: &str) -> Result<CaptureDecision, StateError> {
        if prompt.trim().is_empty() || self.filter.is_control(prompt) {
            debug!("Prompt does not count toward the capture interval");
            return Ok(CaptureDecision::Skip(SkipReason::NotQualifying));
        }

        let count = match self.read_count().await {
            Ok(count) => count,
            Err(e @ StateError::Corrupt { .. }) => {
                warn!(error = %e, "Restarting capture interval");
                FRESH
            }
            Err(e) => return Err(e),
        };

        if count == FRESH {
            self.store.set(keys::ANCHOR, prompt).await?;
            self.write_count(1).await?;
            return Ok(CaptureDecision::Skip(SkipReason::IntervalStarted));
        }

        let count = count + 1;
        if count == 1 && self.store.get(keys::ANCHOR).await?.is_none() {
            self.store.set(keys::ANCHOR, prompt).await?;
        }

        if count < self.interval {
            self.write_count(count).await?;
            return Ok(CaptureDecision::Skip(SkipReason::Counting(count)));
        }

        let anchor = self.read_anchor().await?;
        self.store.set(keys::ANCHOR, prompt).await?;
        self.write_count(0).await?;

        info!(has_anchor = anchor.is_some(), "Periodic capture due");
        Ok(CaptureDecision::Capture {
            anchor,
            trigger: TriggerKind::Periodic,
        })
    }

    /// Handle a forced trigger at `now`.
    pub async fn on_forced(
        &self,
        event: ForcedEvent,
        now: DateTime<Utc>,
    ) -> Result<CaptureDecision, StateError> {
        match event {
            ForcedEvent::PreCompact => {
                let stamp = format!("{:.3}", now.timestamp_millis() as f64 / 1000.0);
                self.store.set(keys::PRECOMPACT_RAN, &stamp).await?;
            }
            ForcedEvent::SessionEnd => {
                if let Some(age) = self.precompact_age(now).await? {
                    self.store.remove(keys::PRECOMPACT_RAN).await?;
                    if age < self.forced_dedup {
                        info!(age_secs = age.as_secs_f64(), "Session end skipped after recent compaction capture");
                        return Ok(CaptureDecision::Skip(SkipReason::RecentPreCompact));
                    }
                }
            }
        }

        let anchor = self.read_anchor().await?;
        self.write_count(FRESH).await?;

        info!(?event, has_anchor = anchor.is_some(), "Forced capture due");
        Ok(CaptureDecision::Capture {
            anchor,
            trigger: TriggerKind::Final,
        })
    }

    async fn read_count(&self) -> Result<i64, StateError> {
        match self.store.get(keys::MESSAGE_COUNT).await? {
            None => Ok(0),
            // a count with no successor is as unusable as garbage
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|count| count.checked_add(1).is_some())
                .ok_or(StateError::Corrupt {
                    key: keys::MESSAGE_COUNT.into(),
                    value: raw,
                }),
        }
    }

    async fn write_count(&self, count: i64) -> Result<(), StateError> {
        self.store.set(keys::MESSAGE_COUNT, &count.to_string()).await
    }

    async fn read_anchor(&self) -> Result<Option<String>, StateError> {
        Ok(self
            .store
            .get(keys::ANCHOR)
            .await?
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()))
    }

    /// Time since the last pre-compaction capture. A flag that cannot be
    /// parsed is reported as infinitely old so the session end proceeds.
    async fn precompact_age(&self, now: DateTime<Utc>) -> Result<Option<Duration>, StateError> {
        let Some(raw) = self.store.get(keys::PRECOMPACT_RAN).await? else {
            return Ok(None);
        };
        let Ok(stamp) = raw.trim().parse::<f64>() else {
            warn!(value = %raw, "Ignoring unreadable compaction timestamp");
            return Ok(Some(Duration::MAX));
        };
        let now_secs = now.timestamp_millis() as f64 / 1000.0;
        Ok(Some(
            Duration::try_from_secs_f64((now_secs - stamp).max(0.0)).unwrap_or(Duration::MAX),
        ))
    }
}
