use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque identity of a DOM node, stable while the node is attached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub u64);

/// Snapshot of the parts of an element the classifiers look at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementInfo {
    pub handle: ElementHandle,
    pub tag_name: String,
    pub id: String,
    /// `None` when the class attribute is not a plain string (SVG elements)
    pub class_name: Option<String>,
    pub title: String,
    pub text_content: String,
    pub attributes: BTreeMap<String, String>,
}

impl ElementInfo {
    pub fn new(handle: u64, tag_name: impl Into<String>) -> Self {
        Self {
            handle: ElementHandle(handle),
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = text.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Raw attribute value; present-but-empty attributes return `Some("")`
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value, treating empty values as missing
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.is_empty())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.class_name.as_deref().unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Browser signals the collector reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomEvent {
    /// Click; `path` is the event target followed by its ancestors
    Click { path: Vec<ElementInfo> },
    /// Capture-phase `mouseenter`; `path` as for clicks
    MouseEnter { path: Vec<ElementInfo> },
    /// Capture-phase `mouseleave` on `target`
    MouseLeave { target: ElementInfo },
    PageHide,
    VisibilityChange,
    BeforeUnload,
}

impl DomEvent {
    pub fn kind(&self) -> DomEventKind {
        match self {
            DomEvent::Click { .. } => DomEventKind::Click,
            DomEvent::MouseEnter { .. } => DomEventKind::MouseEnter,
            DomEvent::MouseLeave { .. } => DomEventKind::MouseLeave,
            DomEvent::PageHide => DomEventKind::PageHide,
            DomEvent::VisibilityChange => DomEventKind::VisibilityChange,
            DomEvent::BeforeUnload => DomEventKind::BeforeUnload,
        }
    }
}

/// DOM event names, used when subscribing listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEventKind {
    Click,
    MouseEnter,
    MouseLeave,
    PageHide,
    VisibilityChange,
    BeforeUnload,
}

impl std::fmt::Display for DomEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomEventKind::Click => write!(f, "click"),
            DomEventKind::MouseEnter => write!(f, "mouseenter"),
            DomEventKind::MouseLeave => write!(f, "mouseleave"),
            DomEventKind::PageHide => write!(f, "pagehide"),
            DomEventKind::VisibilityChange => write!(f, "visibilitychange"),
            DomEventKind::BeforeUnload => write!(f, "beforeunload"),
        }
    }
}
