//! Document paths and reference-path splitting

use std::fmt;

/// Location of a node inside a document, used for diagnostics.
///
/// Built up segment by segment as the resolver walks the tree;
/// rendered with `→` separators in reports and error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuePath {
    segments: Vec<String>,
}

impl ValuePath {
    /// Creates an empty path pointing at the document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended with the given segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path points at the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(" → "))
    }
}

/// Splits a dot-separated reference path into segments.
///
/// Any `${...}` span is treated as atomic, so a dot inside a nested
/// placeholder does not split the segment. An empty path yields no
/// segments.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }

    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut depth = 0_usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 2;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                i += 1;
            }
            b'.' if depth == 0 => {
                segments.push(&path[start..i]);
                start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }

    segments.push(&path[start..]);
    segments
}
