//! Shared test doubles

use crate::capture::dom::ElementInfo;
use crate::capture::simulated::{ManualClock, SimulatedPage};
use crate::capture::traits::BeaconSink;
use crate::collector::{Capabilities, Collector};
use crate::config::CollectorConfig;
use crate::event::{EventRecord, EventType};
use parking_lot::Mutex as ParkingMutex;
use std::sync::Arc;

/// Beacon that keeps every record it is handed
#[derive(Default)]
pub struct RecordingBeacon {
    sent: ParkingMutex<Vec<(String, String, EventRecord)>>,
    reject: bool,
}

impl RecordingBeacon {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<EventRecord> {
        self.sent.lock().iter().map(|(_, _, r)| r.clone()).collect()
    }

    pub fn of_type(&self, event_type: EventType) -> Vec<EventRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.event_type == event_type)
            .collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(u, _, _)| u.clone()).collect()
    }

    pub fn content_types(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, c, _)| c.clone()).collect()
    }
}

impl BeaconSink for RecordingBeacon {
    fn send_beacon(&self, url: &str, body: Vec<u8>, content_type: &str) -> bool {
        if self.reject {
            return false;
        }
        let record: EventRecord =
            serde_json::from_slice(&body).expect("transport produced invalid JSON");
        self.sent
            .lock()
            .push((url.to_string(), content_type.to_string(), record));
        true
    }
}

/// A collector wired to a simulated page, manual clock and recording beacon
pub struct Harness {
    pub collector: Collector,
    pub page: Arc<SimulatedPage>,
    pub clock: Arc<ManualClock>,
    pub beacon: Arc<RecordingBeacon>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_clock(ManualClock::new(1_700_000_000_000))
    }

    pub fn with_clock(clock: ManualClock) -> Self {
        let page = Arc::new(SimulatedPage::new("/services/", "https://search.example/"));
        let clock = Arc::new(clock);
        let beacon = Arc::new(RecordingBeacon::default());
        let capabilities = Capabilities::new(page.clone())
            .with_clock(clock.clone())
            .with_beacon(beacon.clone());
        let collector = Collector::new(CollectorConfig::default(), capabilities);
        Self {
            collector,
            page,
            clock,
            beacon,
        }
    }
}

pub fn button(handle: u64, text: &str) -> ElementInfo {
    ElementInfo::new(handle, "BUTTON")
        .with_class("btn btn-primary")
        .with_text(text)
}

pub fn anchor(handle: u64, href: &str, text: &str) -> ElementInfo {
    ElementInfo::new(handle, "A")
        .with_attr("href", href)
        .with_text(text)
}
