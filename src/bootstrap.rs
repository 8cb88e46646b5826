//! Listener installation
//!
//! Subscribes a collector to the host's DOM events. Without a host registry
//! (no window) installation is a silent no-op.

use crate::capture::dom::{DomEvent, DomEventKind};
use crate::capture::traits::{ListenerOptions, ListenerRegistry, ListenerTarget};
use crate::collector::Collector;
use std::sync::Arc;

const BINDINGS: [(ListenerTarget, DomEventKind, ListenerOptions); 6] = [
    (
        ListenerTarget::Document,
        DomEventKind::Click,
        ListenerOptions {
            capture: false,
            passive: false,
        },
    ),
    (
        ListenerTarget::Document,
        DomEventKind::MouseEnter,
        ListenerOptions {
            capture: true,
            passive: false,
        },
    ),
    (
        ListenerTarget::Document,
        DomEventKind::MouseLeave,
        ListenerOptions {
            capture: true,
            passive: false,
        },
    ),
    (
        ListenerTarget::Window,
        DomEventKind::PageHide,
        ListenerOptions {
            capture: false,
            passive: true,
        },
    ),
    (
        ListenerTarget::Document,
        DomEventKind::VisibilityChange,
        ListenerOptions {
            capture: false,
            passive: false,
        },
    ),
    (
        ListenerTarget::Window,
        DomEventKind::BeforeUnload,
        ListenerOptions {
            capture: false,
            passive: false,
        },
    ),
];

/// Install the collector's listeners. Returns `false` when there is no host.
pub fn install(registry: Option<&dyn ListenerRegistry>, collector: &Collector) -> bool {
    let Some(registry) = registry else {
        tracing::debug!("no listener registry available, behavior collector disabled");
        return false;
    };

    for (target, kind, options) in BINDINGS {
        let collector = collector.clone();
        registry.add_listener(
            target,
            kind,
            options,
            Arc::new(move |event: DomEvent| {
                if event.kind() == kind {
                    collector.handle(event);
                }
            }),
        );
    }

    tracing::info!(listeners = BINDINGS.len(), "behavior collector installed");
    true
}
