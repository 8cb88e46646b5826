//! Exit detection
//!
//! Page-hide, visibility-hidden and before-unload all race to signal that the
//! user is leaving. The first two share one idempotent exit routine guarded by
//! `exit_sent`; before-unload only marks that a navigation started (it also
//! fires for navigations the user cancels).

use super::Collector;
use crate::capture::traits::Visibility;
use crate::classifiers::scroll_percent;
use crate::event::{EventDraft, EventType};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Page-lifetime flags; once set they are never cleared
#[derive(Debug, Default)]
pub struct LifecycleFlags {
    exit_sent: AtomicBool,
    navigation_started: AtomicBool,
}

impl LifecycleFlags {
    /// Claim the single exit report; `true` only for the first caller
    pub fn claim_exit(&self) -> bool {
        self.exit_sent
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn exit_sent(&self) -> bool {
        self.exit_sent.load(Ordering::SeqCst)
    }

    pub fn mark_navigation_started(&self) {
        self.navigation_started.store(true, Ordering::SeqCst);
    }

    pub fn navigation_started(&self) -> bool {
        self.navigation_started.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Serialize)]
struct ExitMetadata {
    exit_scroll: u8,
    click_path: String,
}

impl Collector {
    pub fn on_page_hide(&self) {
        self.send_exit_event();
    }

    pub fn on_visibility_change(&self) {
        if self.inner.page.visibility() == Some(Visibility::Hidden) {
            self.send_exit_event();
        }
    }

    pub fn on_before_unload(&self) {
        self.inner.flags.mark_navigation_started();
        tracing::debug!("navigation started");
    }

    /// Emit the `session_exit` event once. Returns whether this call sent it.
    pub fn send_exit_event(&self) -> bool {
        if !self.inner.flags.claim_exit() {
            return false;
        }

        let scroll = scroll_percent(&self.inner.page.scroll_metrics());
        let click_path = self.inner.state.lock().click_path.joined();
        tracing::debug!(scroll, click_path = %click_path, "sending exit event");

        self.inner.transport.send(
            EventDraft::new(EventType::SessionExit, "exit")
                .with_scroll_percent(scroll)
                .with_metadata(ExitMetadata {
                    exit_scroll: scroll,
                    click_path,
                }),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::dom::DomEvent;
    use crate::capture::simulated::PageChange;
    use crate::capture::traits::ScrollMetrics;
    use crate::testing::{anchor, button, Harness};
    use serde_json::json;

    #[test]
    fn test_claim_exit_once() {
        let flags = LifecycleFlags::default();
        assert!(flags.claim_exit());
        assert!(!flags.claim_exit());
        assert!(flags.exit_sent());
    }

    #[test]
    fn test_competing_signals_send_one_exit() {
        let h = Harness::new();
        h.collector.handle(DomEvent::PageHide);
        h.page.apply(&PageChange::Visibility {
            state: Visibility::Hidden,
        });
        h.collector.handle(DomEvent::VisibilityChange);
        h.collector.handle(DomEvent::BeforeUnload);

        assert_eq!(h.beacon.of_type(EventType::SessionExit).len(), 1);
        assert!(h.collector.exit_sent());
        assert!(h.collector.navigation_started());
    }

    #[test]
    fn test_visible_visibility_change_does_not_exit() {
        let h = Harness::new();
        h.collector.handle(DomEvent::VisibilityChange);
        assert!(h.beacon.of_type(EventType::SessionExit).is_empty());

        h.page.apply(&PageChange::Visibility {
            state: Visibility::Hidden,
        });
        h.collector.handle(DomEvent::VisibilityChange);
        assert_eq!(h.beacon.of_type(EventType::SessionExit).len(), 1);
    }

    #[test]
    fn test_before_unload_alone_does_not_exit() {
        let h = Harness::new();
        h.collector.handle(DomEvent::BeforeUnload);
        assert!(h.beacon.of_type(EventType::SessionExit).is_empty());
        assert!(h.collector.navigation_started());
    }

    #[test]
    fn test_exit_payload_carries_scroll_and_click_path() {
        let h = Harness::new();
        for (i, text) in ["One", "Two", "Three", "Four", "Five", "Six"].iter().enumerate() {
            h.clock.advance(5_000);
            h.collector.handle(DomEvent::Click {
                path: vec![button(i as u64, text)],
            });
        }
        h.page.apply(&PageChange::Scroll {
            scroll_top: 750.0,
            scroll_height: 2000.0,
            viewport_height: 1000.0,
        });

        assert!(h.collector.send_exit_event());

        let exits = h.beacon.of_type(EventType::SessionExit);
        assert_eq!(exits.len(), 1);
        let exit = &exits[0];
        assert_eq!(exit.label, "exit");
        assert_eq!(exit.scroll_percent, Some(75));
        assert_eq!(exit.metadata["exit_scroll"], json!(75));
        assert_eq!(exit.metadata["click_path"], json!("Two > Three > Four > Five > Six"));
    }

    #[test]
    fn test_exit_reads_state_at_exit_time() {
        let h = Harness::new();
        h.collector.handle(DomEvent::Click {
            path: vec![anchor(1, "/contact/", "Contact")],
        });
        h.page.apply(&PageChange::Scroll {
            scroll_top: 10_000.0,
            scroll_height: 2000.0,
            viewport_height: 1000.0,
        });
        h.collector.handle(DomEvent::PageHide);

        let exit = &h.beacon.of_type(EventType::SessionExit)[0];
        assert_eq!(exit.scroll_percent, Some(100));
        assert_eq!(exit.metadata["click_path"], json!("Contact"));
    }

    #[test]
    fn test_exit_scroll_uses_body_readings_when_window_reports_none() {
        let h = Harness::new();
        h.page.set_metrics(ScrollMetrics {
            window_page_y_offset: Some(0.0),
            body_scroll_top: Some(600.0),
            body_scroll_height: Some(2200.0),
            body_client_height: Some(1000.0),
            ..Default::default()
        });
        h.collector.handle(DomEvent::PageHide);

        let exit = &h.beacon.of_type(EventType::SessionExit)[0];
        assert_eq!(exit.scroll_percent, Some(50));
        assert_eq!(exit.metadata["exit_scroll"], json!(50));
    }
}
