//! Rage-click detection
//!
//! Keeps recent click timestamps per target and reports every click that
//! leaves at least `threshold` clicks inside the trailing window. A sustained
//! burst therefore reports once per click after the threshold is reached.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RageClickDetector {
    history: HashMap<String, Vec<u64>>,
    window_ms: u64,
    threshold: usize,
}

impl RageClickDetector {
    pub fn new(window_ms: u64, threshold: usize) -> Self {
        Self {
            history: HashMap::new(),
            window_ms,
            threshold,
        }
    }

    /// Record a click on `key` at `now_ms`; returns the click count when it
    /// meets the threshold
    pub fn record(&mut self, key: &str, now_ms: u64) -> Option<usize> {
        let window_ms = self.window_ms;
        let recent = self.history.entry(key.to_string()).or_default();
        recent.retain(|&t| now_ms.saturating_sub(t) < window_ms);
        recent.push(now_ms);

        let count = recent.len();
        (count >= self.threshold).then_some(count)
    }

    /// Clicks currently held for `key`
    pub fn recent_clicks(&self, key: &str) -> usize {
        self.history.get(key).map_or(0, Vec::len)
    }
}
