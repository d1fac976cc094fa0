//! Path tracking through the specifier tree.
//!
//! A [`TraversalInfo`] is threaded through every recursive call. It is used
//! for error messages and is handed to namespace mappers as their context.

use serde::Serialize;
use std::fmt;

/// Name of the synthetic first path segment.
pub const ROOT_SEGMENT: &str = "__root__";

/// Position of the current node: the path from the root, plus the entry
/// key when the node is a record entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalInfo {
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl TraversalInfo {
    /// Cursor positioned at the root namespace.
    pub fn root() -> Self {
        Self {
            path: vec![ROOT_SEGMENT.to_string()],
            key: None,
        }
    }

    /// Child cursor one segment deeper. Never carries a key.
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(segment.into());
        Self { path, key: None }
    }

    /// The same position, tagged as a record entry keyed by its last segment.
    pub fn as_entry(&self) -> Self {
        Self {
            path: self.path.clone(),
            key: self.last().map(str::to_string),
        }
    }

    /// The last path segment.
    pub fn last(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Whether this cursor sits on the root namespace.
    pub fn is_root(&self) -> bool {
        self.path.len() <= 1
    }

    /// Dotted path with the root segment excluded.
    pub fn render(&self) -> String {
        self.path.iter().skip(1).map(String::as_str).collect::<Vec<_>>().join(".")
    }
}

impl Default for TraversalInfo {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for TraversalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
