//! Event records sent to the collection endpoint

use serde::{Deserialize, Serialize};

/// Free-form, event-specific metadata
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Kinds of events the collector emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Click,
    RageClick,
    DeadClick,
    HoverIntent,
    SessionExit,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::RageClick => "rage_click",
            EventType::DeadClick => "dead_click",
            EventType::HoverIntent => "hover_intent",
            EventType::SessionExit => "session_exit",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event as produced by a classifier, before the transport fills in
/// session, path and referrer.
///
/// `M` is any serializable value that serializes to a JSON object.
#[derive(Debug, Clone)]
pub struct EventDraft<M = Metadata> {
    pub event_type: EventType,
    pub label: String,
    /// Page path; the current location is used when absent
    pub path: Option<String>,
    /// Referrer; the document referrer is used when absent
    pub referrer: Option<String>,
    pub duration_ms: Option<u64>,
    pub scroll_percent: Option<u8>,
    pub metadata: Option<M>,
}

impl EventDraft<Metadata> {
    pub fn new(event_type: EventType, label: impl Into<String>) -> Self {
        Self {
            event_type,
            label: label.into(),
            path: None,
            referrer: None,
            duration_ms: None,
            scroll_percent: None,
            metadata: None,
        }
    }
}

impl<M> EventDraft<M> {
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_scroll_percent(mut self, scroll_percent: u8) -> Self {
        self.scroll_percent = Some(scroll_percent);
        self
    }

    /// Attach metadata, changing the draft's metadata type
    pub fn with_metadata<N>(self, metadata: N) -> EventDraft<N> {
        EventDraft {
            event_type: self.event_type,
            label: self.label,
            path: self.path,
            referrer: self.referrer,
            duration_ms: self.duration_ms,
            scroll_percent: self.scroll_percent,
            metadata: Some(metadata),
        }
    }
}

/// Wire format of a single event (one JSON object per POST)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_type: EventType,
    pub label: String,
    pub session_id: String,
    pub path: String,
    pub referrer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_percent: Option<u8>,
    #[serde(default)]
    pub metadata: Metadata,
}
