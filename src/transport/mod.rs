//! Event transport
//!
//! Completes a classifier's [`EventDraft`] (session id, normalized path,
//! referrer, metadata) and hands the JSON body to the host. A beacon is used
//! when the host has one, because ordinary requests can be cancelled while the
//! page is torn down; otherwise the body is posted from a spawned task.
//! Nothing is retried and no error ever reaches the caller.

pub mod delivery;

pub use delivery::{HttpPoster, ReqwestPoster, TransportError, TransportResult};

use crate::capture::traits::{BeaconSink, PageContext};
use crate::config::{LABEL_MAX_CHARS, PATH_MAX_CHARS, REFERRER_MAX_CHARS};
use crate::event::{EventDraft, EventRecord, Metadata};
use crate::identity::SessionIdentity;
use crate::utils::{strip_query, truncate_chars};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub const JSON_CONTENT_TYPE: &str = "application/json";

pub struct Transport {
    endpoint: String,
    identity: Arc<SessionIdentity>,
    page: Arc<dyn PageContext>,
    beacon: Option<Arc<dyn BeaconSink>>,
    http: Arc<dyn HttpPoster>,
}

impl Transport {
    pub fn new(
        endpoint: impl Into<String>,
        identity: Arc<SessionIdentity>,
        page: Arc<dyn PageContext>,
        beacon: Option<Arc<dyn BeaconSink>>,
        http: Arc<dyn HttpPoster>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            identity,
            page,
            beacon,
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fire-and-forget send. Failures are logged and dropped.
    pub fn send<M: Serialize>(&self, draft: EventDraft<M>) {
        let event_type = draft.event_type;
        if let Err(e) = self.try_send(draft) {
            tracing::debug!(%event_type, error = %e, "analytics event dropped");
        }
    }

    fn try_send<M: Serialize>(&self, draft: EventDraft<M>) -> TransportResult<()> {
        let record = self.prepare(draft)?;
        let body = serde_json::to_vec(&record)?;
        tracing::trace!(event_type = %record.event_type, label = %record.label, "sending analytics event");
        self.deliver(body)
    }

    /// Build the wire record for a draft
    pub fn prepare<M: Serialize>(&self, draft: EventDraft<M>) -> TransportResult<EventRecord> {
        let metadata = match draft.metadata {
            Some(metadata) => match serde_json::to_value(metadata)? {
                Value::Object(map) => map,
                Value::Null => Metadata::new(),
                other => return Err(TransportError::InvalidMetadata(json_kind(&other))),
            },
            None => Metadata::new(),
        };

        let path = draft
            .path
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.page.pathname());
        let referrer = draft
            .referrer
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| self.page.referrer());

        Ok(EventRecord {
            event_type: draft.event_type,
            label: truncate_chars(&draft.label, LABEL_MAX_CHARS),
            session_id: self.identity.session_id(),
            path: normalize_path(&path),
            referrer: truncate_chars(&referrer, REFERRER_MAX_CHARS),
            duration_ms: draft.duration_ms,
            scroll_percent: draft.scroll_percent,
            metadata,
        })
    }

    fn deliver(&self, body: Vec<u8>) -> TransportResult<()> {
        if let Some(beacon) = &self.beacon {
            return if beacon.send_beacon(&self.endpoint, body, JSON_CONTENT_TYPE) {
                Ok(())
            } else {
                Err(TransportError::Rejected)
            };
        }

        let handle = tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        let http = Arc::clone(&self.http);
        let endpoint = self.endpoint.clone();
        handle.spawn(async move {
            if let Err(e) = http.post_json(&endpoint, body).await {
                tracing::debug!(error = %e, "analytics post failed");
            }
        });
        Ok(())
    }
}

/// Path without query string, at most 500 characters
pub fn normalize_path(path: &str) -> String {
    truncate_chars(strip_query(path), PATH_MAX_CHARS)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
