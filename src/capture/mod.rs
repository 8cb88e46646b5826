//! Host integration
//!
//! This module describes what the collector observes (DOM signals) and the
//! capabilities it borrows from its host page.

pub mod dom;
pub mod simulated;
pub mod traits;

// Re-export traits
pub use traits::{
    BeaconSink, Clock, DomHandler, ListenerOptions, ListenerRegistry, ListenerTarget,
    MemorySessionStore, PageContext, RandomSource, ScrollMetrics, SessionStore, StorageError,
    SystemClock, SystemRandom, Visibility,
};

pub use dom::{DomEvent, DomEventKind, ElementHandle, ElementInfo, Selector};
pub use simulated::{ManualClock, PageChange, SimulatedPage, WriterBeacon};
