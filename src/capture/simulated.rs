//! Scripted host capabilities
//!
//! Used by the replay tool and by tests to drive the collector without a
//! browser.

use crate::capture::traits::{BeaconSink, Clock, PageContext, ScrollMetrics, Visibility};
use parking_lot::Mutex as ParkingMutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// A change to the simulated page between DOM events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageChange {
    Navigate { path: String },
    Visibility { state: Visibility },
    Scroll {
        scroll_top: f64,
        scroll_height: f64,
        viewport_height: f64,
    },
}

#[derive(Debug, Clone)]
struct PageState {
    path: String,
    referrer: String,
    visibility: Visibility,
    metrics: ScrollMetrics,
}

/// In-memory page whose path, visibility and scroll position can be changed
#[derive(Debug)]
pub struct SimulatedPage {
    state: ParkingMutex<PageState>,
}

impl SimulatedPage {
    pub fn new(path: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            state: ParkingMutex::new(PageState {
                path: path.into(),
                referrer: referrer.into(),
                visibility: Visibility::Visible,
                metrics: ScrollMetrics::default(),
            }),
        }
    }

    pub fn apply(&self, change: &PageChange) {
        let mut state = self.state.lock();
        match change {
            PageChange::Navigate { path } => state.path = path.clone(),
            PageChange::Visibility { state: visibility } => state.visibility = *visibility,
            PageChange::Scroll {
                scroll_top,
                scroll_height,
                viewport_height,
            } => {
                state.metrics = ScrollMetrics {
                    window_page_y_offset: Some(*scroll_top),
                    document_scroll_height: Some(*scroll_height),
                    window_inner_height: Some(*viewport_height),
                    ..Default::default()
                };
            }
        }
    }

    pub fn set_metrics(&self, metrics: ScrollMetrics) {
        self.state.lock().metrics = metrics;
    }
}

impl PageContext for SimulatedPage {
    fn pathname(&self) -> String {
        self.state.lock().path.clone()
    }

    fn referrer(&self) -> String {
        self.state.lock().referrer.clone()
    }

    fn visibility(&self) -> Option<Visibility> {
        Some(self.state.lock().visibility)
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.state.lock().metrics
    }
}

/// Clock advanced explicitly by the caller
#[derive(Debug)]
pub struct ManualClock {
    epoch_ms: u64,
    elapsed_ms: AtomicU64,
    high_res: bool,
}

impl ManualClock {
    pub fn new(epoch_ms: u64) -> Self {
        Self {
            epoch_ms,
            elapsed_ms: AtomicU64::new(0),
            high_res: true,
        }
    }

    /// Clock without a high-resolution timer
    pub fn without_high_res(epoch_ms: u64) -> Self {
        Self {
            high_res: false,
            ..Self::new(epoch_ms)
        }
    }

    pub fn set(&self, elapsed_ms: u64) {
        self.elapsed_ms.store(elapsed_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.elapsed_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.epoch_ms + self.elapsed_ms.load(Ordering::SeqCst)
    }

    fn high_res_ms(&self) -> Option<f64> {
        self.high_res
            .then(|| self.elapsed_ms.load(Ordering::SeqCst) as f64)
    }
}

/// Beacon that writes each body as one line to a writer
pub struct WriterBeacon<W: Write + Send> {
    writer: ParkingMutex<W>,
}

impl<W: Write + Send> WriterBeacon<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: ParkingMutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> BeaconSink for WriterBeacon<W> {
    fn send_beacon(&self, url: &str, body: Vec<u8>, _content_type: &str) -> bool {
        if let Err(e) = write_line(&mut *self.writer.lock(), &body) {
            tracing::warn!(url, error = %e, "failed to write beacon body");
            return false;
        }
        true
    }
}

fn write_line<W: Write>(writer: &mut W, body: &[u8]) -> std::io::Result<()> {
    writer.write_all(body)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
