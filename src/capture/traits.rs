//! Host capabilities
//!
//! Everything the collector needs from the page it runs in is expressed as a
//! trait here, each with a default implementation so the collector keeps
//! working (with degraded fidelity) when the host cannot provide it.

use crate::capture::dom::{DomEvent, DomEventKind};
use parking_lot::Mutex as ParkingMutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a [`SessionStore`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage quota exceeded")]
    QuotaExceeded,
}

/// Key/value store that lives as long as the browsing context
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store scoped to the collector's lifetime
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: ParkingMutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Source of random identifiers
pub trait RandomSource: Send + Sync {
    /// Cryptographically backed UUID, if the host has one
    fn secure_uuid(&self) -> Option<Uuid>;

    /// Non-cryptographic random number for fallback identifiers
    fn next_u64(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn secure_uuid(&self) -> Option<Uuid> {
        Some(Uuid::new_v4())
    }

    fn next_u64(&self) -> u64 {
        let bits = Uuid::new_v4().as_u128();
        (bits >> 64) as u64 ^ bits as u64
    }
}

/// Wall clock plus an optional high-resolution monotonic timer
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;

    /// Monotonic milliseconds with sub-millisecond precision, if available
    fn high_res_ms(&self) -> Option<f64>;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }

    fn high_res_ms(&self) -> Option<f64> {
        Some(self.origin.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Page visibility state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Scroll readings from the various document/body/window APIs.
///
/// Each reading is optional because hosts expose different subsets; zero and
/// missing values are both treated as "no reading".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollMetrics {
    pub window_page_y_offset: Option<f64>,
    pub document_scroll_top: Option<f64>,
    pub body_scroll_top: Option<f64>,
    pub document_scroll_height: Option<f64>,
    pub body_scroll_height: Option<f64>,
    pub window_inner_height: Option<f64>,
    pub document_client_height: Option<f64>,
    pub body_client_height: Option<f64>,
}

/// Read access to the current page
pub trait PageContext: Send + Sync {
    /// Current location path (without query string where the host strips it)
    fn pathname(&self) -> String;

    /// Document referrer, empty when none
    fn referrer(&self) -> String;

    /// `None` when the host has no visibility API
    fn visibility(&self) -> Option<Visibility>;

    fn scroll_metrics(&self) -> ScrollMetrics;
}

/// Unload-safe, fire-and-forget POST
pub trait BeaconSink: Send + Sync {
    /// Queue `body` for delivery; `false` if the host refused it
    fn send_beacon(&self, url: &str, body: Vec<u8>, content_type: &str) -> bool;
}

/// Callback invoked for each subscribed DOM event
pub type DomHandler = Arc<dyn Fn(DomEvent) + Send + Sync>;

/// Object a listener is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Document,
    Window,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
}

/// Host event subscription facility
pub trait ListenerRegistry {
    fn add_listener(
        &self,
        target: ListenerTarget,
        kind: DomEventKind,
        options: ListenerOptions,
        handler: DomHandler,
    );
}
