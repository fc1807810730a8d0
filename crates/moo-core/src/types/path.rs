//! Dotted key paths into an input tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dot-joined sequence of record keys, such as `milk.morning`.
///
/// Keys containing a literal `.` cannot be addressed.
///
/// # Examples
///
/// ```
/// use moo_core::FieldPath;
///
/// let path = FieldPath::from_segments(["milk", "morning"]);
/// assert_eq!(path.as_str(), "milk.morning");
/// assert_eq!(path.depth(), 2);
/// assert_eq!(path.segments().last(), Some("morning"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Creates a path from its dotted string form.
    #[inline]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Joins key segments with `.`.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut path = String::new();
        for segment in segments {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);
        }
        Self(path)
    }

    /// Iterates the key segments from the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Returns the dotted string form.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment() {
        let path = FieldPath::from_segments(["weight"]);
        assert_eq!(path.as_str(), "weight");
        assert_eq!(path.depth(), 1);
    }

    #[test]
    fn test_serializes_as_string() {
        let path = FieldPath::new("health.temperature");
        assert_eq!(
            serde_json::to_string(&path).unwrap(),
            r#""health.temperature""#
        );
    }
}
