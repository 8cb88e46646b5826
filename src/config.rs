//! Collector configuration
//!
//! Thresholds and limits are fixed constants. Only the endpoint origin, the
//! session storage key and the selector sets live in [`CollectorConfig`].

use crate::capture::dom::Selector;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Collection path appended to the configured origin.
pub const ENDPOINT_PATH: &str = "/api/analytics/";

/// Storage key holding the per-tab session identifier.
pub const SESSION_KEY: &str = "lcpsych_session_id";

/// Number of click labels kept for the exit payload.
pub const CLICK_PATH_LIMIT: usize = 5;

/// Hovers shorter than this are discarded.
pub const HOVER_THRESHOLD_MS: f64 = 700.0;

/// Hovers tracked at once. Elements removed mid-hover never see a
/// `mouseleave`, so the oldest hover is dropped past this bound.
pub const HOVER_TRACKED_LIMIT: usize = 16;

/// Trailing window used by rage-click detection.
pub const RAGE_WINDOW_MS: u64 = 1200;

/// Clicks inside the window needed to report a rage click.
pub const RAGE_CLICK_THRESHOLD: usize = 3;

/// Delay before a click is checked for having had no effect.
pub const DEAD_CLICK_DELAY: Duration = Duration::from_millis(1800);

pub const LABEL_MAX_CHARS: usize = 80;
pub const PATH_MAX_CHARS: usize = 500;
pub const REFERRER_MAX_CHARS: usize = 500;

/// Origin used when nothing else is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// Environment variable overriding [`CollectorConfig::origin`].
pub const ORIGIN_ENV_VAR: &str = "BEHAVIOR_ANALYTICS_ORIGIN";

/// Runtime configuration for a [`Collector`](crate::collector::Collector)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectorConfig {
    /// Scheme and host of the collection endpoint (e.g. `https://example.org`)
    pub origin: String,
    /// Key under which the session id is stored
    pub session_key: String,
    /// Elements whose clicks are tracked
    pub click_selectors: Vec<Selector>,
    /// Elements whose hovers are measured
    pub hover_selectors: Vec<Selector>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            session_key: SESSION_KEY.to_string(),
            click_selectors: default_click_selectors(),
            hover_selectors: default_hover_selectors(),
        }
    }
}

impl CollectorConfig {
    /// Defaults with the origin taken from `BEHAVIOR_ANALYTICS_ORIGIN` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(origin) = std::env::var(ORIGIN_ENV_VAR) {
            let origin = origin.trim();
            if !origin.is_empty() {
                config.origin = origin.to_string();
            }
        }
        config
    }

    /// Full URL events are posted to
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), ENDPOINT_PATH)
    }
}

/// `a, button, [role="button"], [data-analytics-label]`
pub fn default_click_selectors() -> Vec<Selector> {
    vec![
        Selector::Tag("a".into()),
        Selector::Tag("button".into()),
        Selector::AttrEquals("role".into(), "button".into()),
        Selector::HasAttr("data-analytics-label".into()),
    ]
}

/// Hover-intent markers, cards, FAQ entries and call-to-action elements
pub fn default_hover_selectors() -> Vec<Selector> {
    vec![
        Selector::HasAttr("data-hover-intent".into()),
        Selector::Class("therapist-card".into()),
        Selector::Class("service-card".into()),
        Selector::Class("faq-item".into()),
        Selector::Class("faq-question".into()),
        Selector::Class("cta".into()),
        Selector::Class("btn".into()),
        Selector::TagClass("a".into(), "button".into()),
    ]
}
