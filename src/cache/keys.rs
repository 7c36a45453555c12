//! Transient cache keys.

use std::fmt;

/// Opaque key addressing one widget instance's transient entry.
///
/// The key reuses the widget's persisted instance id verbatim, so two
/// instances handed the same id share one entry. Callers get no dedup or
/// namespacing beyond the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransientKey(String);

impl TransientKey {
    /// Wrap a raw instance id as a transient key.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransientKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_equality() {
        let key1 = TransientKey::new("recent-posts-1");
        let key2 = TransientKey::from("recent-posts-1");
        assert_eq!(key1, key2);

        let key3 = TransientKey::new("recent-posts-2");
        assert_ne!(key1, key3);
    }

    #[test]
    fn key_is_opaque_passthrough() {
        let key = TransientKey::new("Recent Posts #1 ");
        assert_eq!(key.as_str(), "Recent Posts #1 ");
        assert_eq!(key.to_string(), "Recent Posts #1 ");
    }
}
