//! Session identity
//!
//! One identifier per browsing context, cached in the host's session store.
//! Storage failures never reach the caller: the provider falls back to a
//! freshly generated id, which only degrades cross-event correlation.

use crate::capture::traits::{Clock, RandomSource, SessionStore, StorageError};
use std::sync::Arc;

pub struct SessionIdentity {
    key: String,
    store: Arc<dyn SessionStore>,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl SessionIdentity {
    pub fn new(
        key: impl Into<String>,
        store: Arc<dyn SessionStore>,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            key: key.into(),
            store,
            random,
            clock,
        }
    }

    /// The current session id, created and stored on first use
    pub fn session_id(&self) -> String {
        match self.load_or_create() {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(error = %e, "session store unavailable, using ephemeral session id");
                self.generate()
            }
        }
    }

    fn load_or_create(&self) -> Result<String, StorageError> {
        if let Some(existing) = self.store.get(&self.key)?.filter(|id| !id.is_empty()) {
            return Ok(existing);
        }

        let id = self.generate();
        self.store.set(&self.key, &id)?;
        tracing::debug!(session_id = %id, "created session id");
        Ok(id)
    }

    /// New random identifier; UUID when a secure source exists, otherwise
    /// `s-<random hex><timestamp hex>`
    pub fn generate(&self) -> String {
        match self.random.secure_uuid() {
            Some(uuid) => uuid.to_string(),
            None => format!("s-{:x}{:x}", self.random.next_u64(), self.clock.now_ms()),
        }
    }
}
