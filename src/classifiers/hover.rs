//! Hover-intent tracking
//!
//! A hover starts on a `mouseenter` that resolves to a tracked element and
//! ends on that element's `mouseleave`. Each enter restamps the start, so
//! moving through descendants measures from the last one entered.

use crate::capture::dom::ElementHandle;
use crate::config::HOVER_TRACKED_LIMIT;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct HoverState {
    started_ms: f64,
    label: String,
}

/// A hover that lasted long enough to count as intent
#[derive(Debug, Clone, PartialEq)]
pub struct HoverIntent {
    pub label: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct HoverTracker {
    active: HashMap<ElementHandle, HoverState>,
    threshold_ms: f64,
}

impl HoverTracker {
    pub fn new(threshold_ms: f64) -> Self {
        Self {
            active: HashMap::new(),
            threshold_ms,
        }
    }

    /// Start (or restart) the hover on `element`
    pub fn enter(&mut self, element: ElementHandle, now_ms: f64, label: String) {
        if !self.active.contains_key(&element) && self.active.len() >= HOVER_TRACKED_LIMIT {
            self.evict_oldest();
        }
        self.active.insert(
            element,
            HoverState {
                started_ms: now_ms,
                label,
            },
        );
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .active
            .iter()
            .min_by(|a, b| a.1.started_ms.total_cmp(&b.1.started_ms))
            .map(|(handle, _)| *handle);
        if let Some(handle) = oldest {
            tracing::debug!(?handle, "dropping stale hover");
            self.active.remove(&handle);
        }
    }

    /// End the hover on `element`. State is always cleared; an intent is
    /// returned only if the hover reached the threshold.
    pub fn leave(&mut self, element: ElementHandle, now_ms: f64) -> Option<HoverIntent> {
        let state = self.active.remove(&element)?;
        let elapsed = now_ms - state.started_ms;
        if !(elapsed >= self.threshold_ms) {
            return None;
        }
        Some(HoverIntent {
            label: state.label,
            duration_ms: elapsed.round() as u64,
        })
    }

    pub fn is_hovering(&self, element: ElementHandle) -> bool {
        self.active.contains_key(&element)
    }

    pub fn tracked(&self) -> usize {
        self.active.len()
    }
}
