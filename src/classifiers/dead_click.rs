//! Dead-click checks
//!
//! A click is re-examined after a fixed delay. The timer is never cancelled;
//! instead the guards are evaluated when it fires, so a navigation, a hidden
//! page or a path change in between suppresses the report.

use crate::capture::traits::{PageContext, Visibility};
use crate::collector::lifecycle::LifecycleFlags;
use serde::Serialize;

/// A click awaiting its dead-click check
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeadClick {
    pub label: String,
    pub target: String,
    pub href: String,
    /// Page path at click time
    pub start_path: String,
}

#[derive(Debug, Serialize)]
pub struct DeadClickMetadata<'a> {
    pub target: &'a str,
    pub href: &'a str,
    pub path: &'a str,
}

impl PendingDeadClick {
    /// Whether the click still looks dead when the check fires
    pub fn is_dead(&self, flags: &LifecycleFlags, page: &dyn PageContext) -> bool {
        if flags.navigation_started() {
            return false;
        }
        if page.visibility() == Some(Visibility::Hidden) {
            return false;
        }
        page.pathname() == self.start_path
    }

    pub fn metadata(&self) -> DeadClickMetadata<'_> {
        DeadClickMetadata {
            target: &self.target,
            href: &self.href,
            path: &self.start_path,
        }
    }
}
