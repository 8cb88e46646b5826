//! Scripted session replay
//!
//! A replay script is JSON lines. Each line has an `at_ms` offset and either
//! a `page` change, a DOM `event`, or both (page change applied first):
//!
//! ```text
//! {"at_ms": 0, "event": {"type": "click", "path": [{"tagName": "A", "textContent": "Fees"}]}}
//! {"at_ms": 300, "page": {"type": "navigate", "path": "/fees/"}}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use crate::capture::dom::DomEvent;
use crate::capture::simulated::{ManualClock, PageChange, SimulatedPage};
use crate::collector::Collector;
use crate::config::DEAD_CLICK_DELAY;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Invalid replay entry on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Replay entry on line {line} has neither `page` nor `event`")]
    EmptyEntry { line: usize },

    #[error("Replay entries out of order on line {line}: {at_ms}ms after {previous_ms}ms")]
    OutOfOrder {
        line: usize,
        at_ms: u64,
        previous_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEntry {
    pub at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<DomEvent>,
}

/// Totals reported at the end of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub page_changes: usize,
    pub dom_events: usize,
    pub duration_ms: u64,
}

pub fn parse_script(input: &str) -> Result<Vec<ReplayEntry>, ReplayError> {
    let mut entries = Vec::new();
    let mut previous_ms = 0;

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }

        let entry: ReplayEntry =
            serde_json::from_str(raw).map_err(|source| ReplayError::Parse { line, source })?;
        if entry.page.is_none() && entry.event.is_none() {
            return Err(ReplayError::EmptyEntry { line });
        }
        if entry.at_ms < previous_ms {
            return Err(ReplayError::OutOfOrder {
                line,
                at_ms: entry.at_ms,
                previous_ms,
            });
        }
        previous_ms = entry.at_ms;
        entries.push(entry);
    }

    Ok(entries)
}

/// Play `entries` against `collector`.
///
/// `clock` follows the script offsets so timing heuristics see script time.
/// Real waits are divided by `speed`; a non-positive speed replays without
/// waiting. After the last entry the replay waits out pending dead-click
/// checks.
pub async fn run(
    collector: &Collector,
    page: &SimulatedPage,
    clock: &ManualClock,
    entries: &[ReplayEntry],
    speed: f64,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    let mut last_ms = 0;

    for entry in entries {
        let delta = entry.at_ms.saturating_sub(last_ms);
        wait(Duration::from_millis(delta), speed).await;
        last_ms = entry.at_ms;
        clock.set(entry.at_ms);

        if let Some(change) = &entry.page {
            tracing::debug!(at_ms = entry.at_ms, ?change, "page change");
            page.apply(change);
            summary.page_changes += 1;
        }
        if let Some(event) = &entry.event {
            tracing::debug!(at_ms = entry.at_ms, kind = %event.kind(), "dom event");
            collector.handle(event.clone());
            summary.dom_events += 1;
        }
    }

    wait(DEAD_CLICK_DELAY + Duration::from_millis(50), speed).await;
    summary.duration_ms = last_ms;
    summary
}

async fn wait(duration: Duration, speed: f64) {
    if duration.is_zero() {
        return;
    }
    if speed > 0.0 && speed.is_finite() {
        tokio::time::sleep(duration.div_f64(speed)).await;
    } else {
        tokio::task::yield_now().await;
    }
}
