//! Minimal CSS selector matching
//!
//! Supports the simple selector forms the collector is configured with:
//! `tag`, `.class`, `tag.class`, `[attr]` and `[attr="value"]`.

use super::types::ElementInfo;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unsupported selector: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    Tag(String),
    Class(String),
    TagClass(String, String),
    HasAttr(String),
    AttrEquals(String, String),
}

impl Selector {
    pub fn matches(&self, el: &ElementInfo) -> bool {
        match self {
            Selector::Tag(tag) => el.tag_name.eq_ignore_ascii_case(tag),
            Selector::Class(class) => el.has_class(class),
            Selector::TagClass(tag, class) => {
                el.tag_name.eq_ignore_ascii_case(tag) && el.has_class(class)
            }
            Selector::HasAttr(name) => el.attr(name).is_some(),
            Selector::AttrEquals(name, value) => el.attr(name) == Some(value.as_str()),
        }
    }

    /// Parse a comma-separated selector list
    pub fn parse_list(list: &str) -> Result<Vec<Selector>, SelectorError> {
        list.split(',').map(str::parse).collect()
    }
}

/// First element of `path` (target, then ancestors) matching any selector
pub fn closest<'a>(path: &'a [ElementInfo], selectors: &[Selector]) -> Option<&'a ElementInfo> {
    path.iter().find(|el| selectors.iter().any(|s| s.matches(el)))
}

fn is_ident(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SelectorError::Empty);
        }
        let unsupported = || SelectorError::Unsupported(s.to_string());

        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            return match inner.split_once('=') {
                Some((name, value)) => {
                    let name = name.trim();
                    let value = value.trim();
                    let value = value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                        .unwrap_or(value);
                    if !is_ident(name) {
                        return Err(unsupported());
                    }
                    Ok(Selector::AttrEquals(name.to_string(), value.to_string()))
                }
                None if is_ident(inner.trim()) => Ok(Selector::HasAttr(inner.trim().to_string())),
                None => Err(unsupported()),
            };
        }

        if let Some(class) = s.strip_prefix('.') {
            return if is_ident(class) {
                Ok(Selector::Class(class.to_string()))
            } else {
                Err(unsupported())
            };
        }

        match s.split_once('.') {
            Some((tag, class)) if is_ident(tag) && is_ident(class) => {
                Ok(Selector::TagClass(tag.to_ascii_lowercase(), class.to_string()))
            }
            Some(_) => Err(unsupported()),
            None if is_ident(s) => Ok(Selector::Tag(s.to_ascii_lowercase())),
            None => Err(unsupported()),
        }
    }
}

impl TryFrom<String> for Selector {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Tag(tag) => write!(f, "{}", tag),
            Selector::Class(class) => write!(f, ".{}", class),
            Selector::TagClass(tag, class) => write!(f, "{}.{}", tag, class),
            Selector::HasAttr(name) => write!(f, "[{}]", name),
            Selector::AttrEquals(name, value) => write!(f, "[{}=\"{}\"]", name, value),
        }
    }
}
