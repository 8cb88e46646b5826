//! Human-readable labels and target keys for elements

use crate::capture::dom::ElementInfo;
use crate::config::LABEL_MAX_CHARS;
use crate::utils::{collapse_whitespace, truncate_chars};

/// Resolve a label: analytics label, then aria-label, then title, then text.
///
/// Empty attributes fall through to the next source. The result is
/// whitespace-collapsed and at most 80 characters.
pub fn safe_label(el: &ElementInfo) -> String {
    let source = [
        el.non_empty_attr("data-analytics-label"),
        el.non_empty_attr("aria-label"),
        Some(el.title.as_str()).filter(|t| !t.is_empty()),
    ]
    .into_iter()
    .flatten()
    .next()
    .unwrap_or(el.text_content.as_str());

    truncate_chars(&collapse_whitespace(source), LABEL_MAX_CHARS)
}

/// `tag#id.class1.class2` identity used to group clicks on the same target
pub fn element_key(el: &ElementInfo) -> String {
    let mut key = el.tag_name.to_lowercase();
    if !el.id.is_empty() {
        key.push('#');
        key.push_str(&el.id);
    }
    let classes: Vec<&str> = el.classes().take(2).collect();
    if !classes.is_empty() {
        key.push('.');
        key.push_str(&classes.join("."));
    }
    key
}

/// Label for a click, falling back to the target key
pub fn click_label(el: &ElementInfo) -> String {
    let label = safe_label(el);
    if label.is_empty() {
        element_key(el)
    } else {
        label
    }
}

/// Label for a hover: explicit hover-intent marker value first
pub fn hover_label(el: &ElementInfo) -> String {
    if let Some(marker) = el.non_empty_attr("data-hover-intent") {
        return marker.to_string();
    }
    click_label(el)
}
