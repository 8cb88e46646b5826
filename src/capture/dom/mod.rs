//! DOM signal model
//!
//! Describes elements and the browser events the collector consumes, plus the
//! selector matching used to find the interesting ancestor of an event target.

pub mod selector;
pub mod types;

pub use selector::{closest, Selector, SelectorError};
pub use types::{DomEvent, DomEventKind, ElementHandle, ElementInfo};
