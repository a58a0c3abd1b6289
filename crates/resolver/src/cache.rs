//! Per-run resolution cache and cycle detector

use std::collections::HashMap;

use refract_domain::Value;

/// Resolution state of one reference path within a single pass.
///
/// A path transitions to `Resolving` at most once per pass before
/// reaching a terminal state; observing `Resolving` for a path already
/// in the cache is the cycle signal.
#[derive(Debug, Clone, PartialEq)]
pub enum RefState {
    /// The path is being resolved somewhere up the call chain.
    Resolving,
    /// The path resolved to a value, memoized for the rest of the pass.
    Resolved(Value),
    /// The path could not be located; not retried within the pass.
    Unresolved,
}

/// Per-pass mapping from normalized reference path to resolution state.
///
/// Owned by a single run and cleared between passes; never shared.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, RefState>,
}

impl ResolutionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state recorded for a reference path, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RefState> {
        self.entries.get(key)
    }

    /// Marks a reference path as in progress.
    pub fn mark_resolving(&mut self, key: &str) {
        self.entries.insert(key.to_string(), RefState::Resolving);
    }

    /// Stores the resolved value for a reference path.
    pub fn store_resolved(&mut self, key: &str, value: Value) {
        self.entries
            .insert(key.to_string(), RefState::Resolved(value));
    }

    /// Marks a reference path as unresolvable for this pass.
    pub fn mark_unresolved(&mut self, key: &str) {
        self.entries.insert(key.to_string(), RefState::Unresolved);
    }

    /// Removes the entry for a reference path entirely.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drops all entries, ready for the next pass.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of tracked reference paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no reference path is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absent_key() {
        let cache = ResolutionCache::new();
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_state_transitions() {
        let mut cache = ResolutionCache::new();

        cache.mark_resolving("a");
        assert_eq!(cache.get("a"), Some(&RefState::Resolving));

        cache.store_resolved("a", Value::Int(1));
        assert_eq!(cache.get("a"), Some(&RefState::Resolved(Value::Int(1))));

        cache.mark_unresolved("b");
        assert_eq!(cache.get("b"), Some(&RefState::Unresolved));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_remove_forgets_entry() {
        let mut cache = ResolutionCache::new();
        cache.mark_resolving("a");
        cache.remove("a");
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_clear_between_passes() {
        let mut cache = ResolutionCache::new();
        cache.store_resolved("a", Value::Int(1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
