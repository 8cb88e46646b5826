//! The collector
//!
//! One [`Collector`] is built per page. It owns the classifier state, the
//! lifecycle flags and the transport, and is the single entry point for DOM
//! events. Clones share the same state.

pub mod lifecycle;

use crate::capture::dom::{closest, DomEvent, ElementInfo};
use crate::capture::traits::{
    BeaconSink, Clock, MemorySessionStore, PageContext, RandomSource, SessionStore, SystemClock,
    SystemRandom,
};
use crate::classifiers::dead_click::PendingDeadClick;
use crate::classifiers::{
    click_label, element_key, hover_label, ClickPath, HoverTracker, RageClickDetector,
};
use crate::config::{
    CollectorConfig, CLICK_PATH_LIMIT, DEAD_CLICK_DELAY, HOVER_THRESHOLD_MS, RAGE_CLICK_THRESHOLD,
    RAGE_WINDOW_MS,
};
use crate::event::{EventDraft, EventType};
use crate::identity::SessionIdentity;
use crate::transport::{HttpPoster, ReqwestPoster, Transport};
use lifecycle::LifecycleFlags;
use parking_lot::Mutex as ParkingMutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Host capabilities handed to a collector
pub struct Capabilities {
    pub page: Arc<dyn PageContext>,
    pub store: Arc<dyn SessionStore>,
    pub random: Arc<dyn RandomSource>,
    pub clock: Arc<dyn Clock>,
    pub beacon: Option<Arc<dyn BeaconSink>>,
    pub http: Arc<dyn HttpPoster>,
}

impl Capabilities {
    /// Defaults for everything but the page: in-memory session store, system
    /// clock and randomness, no beacon, `reqwest` fallback
    pub fn new(page: Arc<dyn PageContext>) -> Self {
        Self {
            page,
            store: Arc::new(MemorySessionStore::new()),
            random: Arc::new(SystemRandom),
            clock: Arc::new(SystemClock::new()),
            beacon: None,
            http: Arc::new(ReqwestPoster::new()),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_beacon(mut self, beacon: Arc<dyn BeaconSink>) -> Self {
        self.beacon = Some(beacon);
        self
    }

    pub fn with_http(mut self, http: Arc<dyn HttpPoster>) -> Self {
        self.http = http;
        self
    }
}

/// Classifier state mutated from event handlers
struct ClassifierState {
    click_path: ClickPath,
    rage: RageClickDetector,
    hover: HoverTracker,
}

struct Inner {
    config: CollectorConfig,
    page: Arc<dyn PageContext>,
    clock: Arc<dyn Clock>,
    transport: Arc<Transport>,
    state: ParkingMutex<ClassifierState>,
    flags: Arc<LifecycleFlags>,
}

#[derive(Debug, Serialize)]
struct ClickMetadata<'a> {
    kind: &'static str,
    target: &'a str,
    href: &'a str,
}

#[derive(Debug, Serialize)]
struct RageClickMetadata<'a> {
    target: &'a str,
    clicks: usize,
}

#[derive(Debug, Serialize)]
struct HoverMetadata<'a> {
    target: &'a str,
}

#[derive(Clone)]
pub struct Collector {
    inner: Arc<Inner>,
}

impl Collector {
    pub fn new(config: CollectorConfig, capabilities: Capabilities) -> Self {
        let identity = Arc::new(SessionIdentity::new(
            config.session_key.clone(),
            capabilities.store,
            capabilities.random,
            capabilities.clock.clone(),
        ));
        let transport = Arc::new(Transport::new(
            config.endpoint_url(),
            identity,
            capabilities.page.clone(),
            capabilities.beacon,
            capabilities.http,
        ));

        tracing::info!(endpoint = %transport.endpoint(), "behavior collector initialized");
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!(
                "collector built outside an async runtime; dead-click checks and HTTP fallback are disabled"
            );
        }

        Self {
            inner: Arc::new(Inner {
                config,
                page: capabilities.page,
                clock: capabilities.clock,
                transport,
                state: ParkingMutex::new(ClassifierState {
                    click_path: ClickPath::new(CLICK_PATH_LIMIT),
                    rage: RageClickDetector::new(RAGE_WINDOW_MS, RAGE_CLICK_THRESHOLD),
                    hover: HoverTracker::new(HOVER_THRESHOLD_MS),
                }),
                flags: Arc::new(LifecycleFlags::default()),
            }),
        }
    }

    /// Route a DOM event to its classifier
    pub fn handle(&self, event: DomEvent) {
        match event {
            DomEvent::Click { path } => self.on_click(&path),
            DomEvent::MouseEnter { path } => self.on_mouse_enter(&path),
            DomEvent::MouseLeave { target } => self.on_mouse_leave(&target),
            DomEvent::PageHide => self.on_page_hide(),
            DomEvent::VisibilityChange => self.on_visibility_change(),
            DomEvent::BeforeUnload => self.on_before_unload(),
        }
    }

    /// Handle events from a channel until every sender is dropped
    pub async fn run(self, mut events: mpsc::Receiver<DomEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        tracing::debug!("dom event stream closed");
    }

    pub fn click_path(&self) -> Vec<String> {
        self.inner.state.lock().click_path.entries()
    }

    pub fn exit_sent(&self) -> bool {
        self.inner.flags.exit_sent()
    }

    pub fn navigation_started(&self) -> bool {
        self.inner.flags.navigation_started()
    }

    pub fn on_click(&self, path: &[ElementInfo]) {
        let Some(target) = closest(path, &self.inner.config.click_selectors) else {
            return;
        };

        let key = element_key(target);
        let label = click_label(target);
        let href = target.attr("href").unwrap_or_default();

        self.inner.state.lock().click_path.record(&label);

        self.inner.transport.send(
            EventDraft::new(EventType::Click, label.clone()).with_metadata(ClickMetadata {
                kind: "click",
                target: &key,
                href,
            }),
        );

        let rage_key = if key.is_empty() { label.clone() } else { key };
        self.detect_rage_click(&rage_key, &label);
        self.schedule_dead_click_check(PendingDeadClick {
            label,
            target: rage_key,
            href: href.to_string(),
            start_path: self.inner.page.pathname(),
        });
    }

    fn detect_rage_click(&self, key: &str, label: &str) {
        let now = self.inner.clock.now_ms();
        let clicks = self.inner.state.lock().rage.record(key, now);
        if let Some(clicks) = clicks {
            tracing::debug!(target_key = %key, clicks, "rage click");
            self.inner.transport.send(
                EventDraft::new(EventType::RageClick, label)
                    .with_metadata(RageClickMetadata { target: key, clicks }),
            );
        }
    }

    fn schedule_dead_click_check(&self, pending: PendingDeadClick) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime, skipping dead-click check");
            return;
        };

        let flags = Arc::clone(&self.inner.flags);
        let page = Arc::clone(&self.inner.page);
        let transport = Arc::clone(&self.inner.transport);
        handle.spawn(async move {
            tokio::time::sleep(DEAD_CLICK_DELAY).await;
            if !pending.is_dead(&flags, page.as_ref()) {
                return;
            }
            tracing::debug!(target_key = %pending.target, "dead click");
            transport.send(
                EventDraft::new(EventType::DeadClick, pending.label.as_str())
                    .with_metadata(pending.metadata()),
            );
        });
    }

    fn hover_now(&self) -> f64 {
        self.inner
            .clock
            .high_res_ms()
            .unwrap_or_else(|| self.inner.clock.now_ms() as f64)
    }

    pub fn on_mouse_enter(&self, path: &[ElementInfo]) {
        let Some(target) = closest(path, &self.inner.config.hover_selectors) else {
            return;
        };
        let now = self.hover_now();
        self.inner
            .state
            .lock()
            .hover
            .enter(target.handle, now, hover_label(target));
    }

    pub fn on_mouse_leave(&self, target: &ElementInfo) {
        let now = self.hover_now();
        let Some(intent) = self.inner.state.lock().hover.leave(target.handle, now) else {
            return;
        };

        let key = element_key(target);
        tracing::debug!(target_key = %key, duration_ms = intent.duration_ms, "hover intent");
        self.inner.transport.send(
            EventDraft::new(EventType::HoverIntent, intent.label)
                .with_duration_ms(intent.duration_ms)
                .with_metadata(HoverMetadata { target: &key }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::dom::ElementInfo;
    use crate::capture::simulated::{ManualClock, PageChange};
    use crate::capture::traits::Visibility;
    use crate::testing::{anchor, button, Harness};
    use serde_json::json;
    use std::time::Duration;

    fn click(h: &Harness, el: ElementInfo) {
        h.collector.handle(DomEvent::Click { path: vec![el] });
    }

    #[test]
    fn test_click_emits_event_with_metadata() {
        let h = Harness::new();
        click(&h, anchor(1, "/contact/", "  Contact   us "));

        let clicks = h.beacon.of_type(EventType::Click);
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].label, "Contact us");
        assert_eq!(clicks[0].path, "/services/");
        assert_eq!(
            serde_json::Value::Object(clicks[0].metadata.clone()),
            json!({"kind": "click", "target": "a", "href": "/contact/"})
        );
        assert_eq!(h.collector.click_path(), vec!["Contact us"]);
    }

    #[test]
    fn test_click_resolves_interactive_ancestor() {
        let h = Harness::new();
        let icon = ElementInfo::new(2, "svg");
        let btn = ElementInfo::new(3, "div")
            .with_attr("role", "button")
            .with_attr("aria-label", "Close menu");
        h.collector.handle(DomEvent::Click {
            path: vec![icon, btn, ElementInfo::new(4, "nav")],
        });

        let clicks = h.beacon.of_type(EventType::Click);
        assert_eq!(clicks.len(), 1);
        assert_eq!(clicks[0].label, "Close menu");
        assert_eq!(clicks[0].metadata["href"], json!(""));
    }

    #[test]
    fn test_click_outside_interactive_elements_is_ignored() {
        let h = Harness::new();
        h.collector.handle(DomEvent::Click {
            path: vec![ElementInfo::new(1, "p").with_text("Body copy")],
        });
        h.collector.handle(DomEvent::Click { path: vec![] });
        assert!(h.beacon.records().is_empty());
        assert!(h.collector.click_path().is_empty());
    }

    #[test]
    fn test_rage_click_sequence() {
        let h = Harness::new();
        for at in [0, 400, 900] {
            h.clock.set(at);
            click(&h, button(1, "Submit"));
        }
        let rage = h.beacon.of_type(EventType::RageClick);
        assert_eq!(rage.len(), 1);
        assert_eq!(rage[0].metadata["clicks"], json!(3));
        assert_eq!(rage[0].metadata["target"], json!("button.btn.btn-primary"));
        assert_eq!(rage[0].label, "Submit");

        h.clock.set(1000);
        click(&h, button(1, "Submit"));
        let rage = h.beacon.of_type(EventType::RageClick);
        assert_eq!(rage.len(), 2);
        assert_eq!(rage[1].metadata["clicks"], json!(4));

        h.clock.set(3000);
        click(&h, button(1, "Submit"));
        assert_eq!(h.beacon.of_type(EventType::RageClick).len(), 2);
    }

    #[test]
    fn test_rage_key_falls_back_to_label() {
        let h = Harness::new();
        let el = || ElementInfo::new(1, "").with_attr("data-analytics-label", "Mystery");
        for at in [0, 100, 200] {
            h.clock.set(at);
            click(&h, el());
        }
        let rage = h.beacon.of_type(EventType::RageClick);
        assert_eq!(rage.len(), 1);
        assert_eq!(rage[0].metadata["target"], json!("Mystery"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_click_reported_after_delay() {
        let h = Harness::new();
        click(&h, anchor(1, "#pricing", "Pricing"));

        tokio::time::sleep(Duration::from_millis(1700)).await;
        assert!(h.beacon.of_type(EventType::DeadClick).is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let dead = h.beacon.of_type(EventType::DeadClick);
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].label, "Pricing");
        assert_eq!(
            serde_json::Value::Object(dead[0].metadata.clone()),
            json!({"target": "a", "href": "#pricing", "path": "/services/"})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_click_suppressed_by_path_change() {
        let h = Harness::new();
        click(&h, anchor(1, "/services/couples/", "Couples"));
        tokio::time::sleep(Duration::from_millis(500)).await;
        h.page.apply(&PageChange::Navigate {
            path: "/services/couples/".into(),
        });
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(h.beacon.of_type(EventType::DeadClick).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_click_suppressed_by_navigation_or_hidden_page() {
        let h = Harness::new();
        click(&h, anchor(1, "/blog/", "Blog"));
        h.collector.handle(DomEvent::BeforeUnload);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(h.beacon.of_type(EventType::DeadClick).is_empty());

        let h = Harness::new();
        click(&h, anchor(1, "/blog/", "Blog"));
        h.page.apply(&PageChange::Visibility {
            state: Visibility::Hidden,
        });
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(h.beacon.of_type(EventType::DeadClick).is_empty());
    }

    #[test]
    fn test_hover_intent_threshold() {
        let h = Harness::new();
        let card = ElementInfo::new(7, "div")
            .with_class("therapist-card")
            .with_text("Dr. Rivera");

        h.clock.set(0);
        h.collector.handle(DomEvent::MouseEnter {
            path: vec![card.clone()],
        });
        h.clock.set(650);
        h.collector.handle(DomEvent::MouseLeave {
            target: card.clone(),
        });
        assert!(h.beacon.of_type(EventType::HoverIntent).is_empty());

        h.clock.set(1000);
        h.collector.handle(DomEvent::MouseEnter {
            path: vec![card.clone()],
        });
        h.clock.set(1750);
        h.collector.handle(DomEvent::MouseLeave { target: card });

        let hovers = h.beacon.of_type(EventType::HoverIntent);
        assert_eq!(hovers.len(), 1);
        assert_eq!(hovers[0].duration_ms, Some(750));
        assert_eq!(hovers[0].label, "Dr. Rivera");
        assert_eq!(hovers[0].metadata["target"], json!("div.therapist-card"));
    }

    #[test]
    fn test_hover_restarts_when_entering_a_descendant() {
        let h = Harness::new();
        let card = ElementInfo::new(8, "div")
            .with_class("service-card")
            .with_text("Couples Therapy");
        let title = ElementInfo::new(9, "span").with_text("Couples Therapy");

        h.clock.set(0);
        h.collector.handle(DomEvent::MouseEnter {
            path: vec![card.clone()],
        });
        h.clock.set(500);
        h.collector.handle(DomEvent::MouseEnter {
            path: vec![title.clone(), card.clone()],
        });
        h.clock.set(1100);
        h.collector.handle(DomEvent::MouseLeave {
            target: card.clone(),
        });
        assert!(h.beacon.of_type(EventType::HoverIntent).is_empty());

        h.clock.set(2000);
        h.collector.handle(DomEvent::MouseEnter {
            path: vec![card.clone()],
        });
        h.clock.set(2100);
        h.collector.handle(DomEvent::MouseEnter {
            path: vec![title, card.clone()],
        });
        h.clock.set(2900);
        h.collector.handle(DomEvent::MouseLeave { target: card });

        let hovers = h.beacon.of_type(EventType::HoverIntent);
        assert_eq!(hovers.len(), 1);
        assert_eq!(hovers[0].duration_ms, Some(800));
    }

    #[test]
    fn test_synchronous_host_still_gets_click_events() {
        let h = Harness::new();
        assert!(tokio::runtime::Handle::try_current().is_err());
        h.collector.handle(DomEvent::Click {
            path: vec![anchor(3, "#faq", "FAQ")],
        });
        h.clock.advance(5_000);

        assert_eq!(h.beacon.of_type(EventType::Click).len(), 1);
        assert!(h.beacon.of_type(EventType::DeadClick).is_empty());
        assert_eq!(h.collector.click_path(), vec!["FAQ".to_string()]);
    }

    #[test]
    fn test_hover_on_descendant_tracks_matching_ancestor() {
        let h = Harness::new();
        let item = ElementInfo::new(5, "li")
            .with_class("faq-item")
            .with_attr("data-hover-intent", "faq-insurance");
        let text = ElementInfo::new(6, "span").with_text("Insurance");

        h.clock.set(0);
        h.collector.handle(DomEvent::MouseEnter {
            path: vec![text.clone(), item.clone()],
        });
        h.clock.set(900);
        // Leaving the inner span carries no hover state
        h.collector.handle(DomEvent::MouseLeave { target: text });
        assert!(h.beacon.of_type(EventType::HoverIntent).is_empty());

        h.clock.set(1200);
        h.collector.handle(DomEvent::MouseLeave { target: item });
        let hovers = h.beacon.of_type(EventType::HoverIntent);
        assert_eq!(hovers.len(), 1);
        assert_eq!(hovers[0].label, "faq-insurance");
        assert_eq!(hovers[0].duration_ms, Some(1200));
    }

    #[test]
    fn test_hover_falls_back_to_wall_clock() {
        let h = Harness::with_clock(ManualClock::without_high_res(10_000));
        let cta = ElementInfo::new(1, "a").with_class("cta").with_text("Start");
        h.collector.handle(DomEvent::MouseEnter {
            path: vec![cta.clone()],
        });
        h.clock.advance(800);
        h.collector.handle(DomEvent::MouseLeave { target: cta });
        assert_eq!(h.beacon.of_type(EventType::HoverIntent)[0].duration_ms, Some(800));
    }

    #[tokio::test]
    async fn test_run_drains_channel() {
        let h = Harness::new();
        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(h.collector.clone().run(rx));

        tx.send(DomEvent::Click {
            path: vec![button(1, "Go")],
        })
        .await
        .unwrap();
        tx.send(DomEvent::PageHide).await.unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(h.beacon.of_type(EventType::Click).len(), 1);
        assert_eq!(h.beacon.of_type(EventType::SessionExit).len(), 1);
    }
}
