//! Behavior Analytics - client-side behavioral telemetry.
//!
//! Observes clicks, hovers, scrolling and page exit, classifies low-signal
//! raw events into rage clicks, dead clicks and hover intent, and sends each
//! event as one JSON POST to the collection endpoint.
//!
//! The host page is reached only through the capability traits in
//! [`capture::traits`], so every classifier runs without a browser.

pub mod bootstrap;
pub mod capture;
pub mod classifiers;
pub mod collector;
pub mod config;
pub mod event;
pub mod identity;
pub mod replay;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod testing;

pub use collector::{Capabilities, Collector};
pub use config::CollectorConfig;
pub use event::{EventDraft, EventRecord, EventType, Metadata};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber (stderr, `RUST_LOG` aware).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "behavior_analytics=info,behavior_replay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
