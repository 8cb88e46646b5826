//! Event classifiers
//!
//! Stateful heuristics that turn raw DOM signals into the events the
//! collector reports. Each classifier is pure state plus timing; the
//! collector feeds them and forwards what they produce to the transport.

pub mod click_path;
pub mod dead_click;
pub mod hover;
pub mod label;
pub mod rage;
pub mod scroll;

pub use click_path::ClickPath;
pub use dead_click::PendingDeadClick;
pub use hover::{HoverIntent, HoverTracker};
pub use label::{click_label, element_key, hover_label, safe_label};
pub use rage::RageClickDetector;
pub use scroll::scroll_percent;
