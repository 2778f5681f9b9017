//! Memoization of ignore decisions across scans (spec §3, §4.5).

use std::collections::HashMap;

/// Mapping from `(path, is_directory)` to the decision Scan already made for
/// that node, so a re-scan doesn't re-run every pattern against every path.
#[derive(Debug, Clone, Default)]
pub struct IgnoreCache {
    decisions: HashMap<(String, bool), bool>,
}

impl IgnoreCache {
    pub fn new() -> IgnoreCache {
        IgnoreCache::default()
    }

    pub fn get(&self, path: &str, is_directory: bool) -> Option<bool> {
        self.decisions.get(&(path.to_string(), is_directory)).copied()
    }

    pub fn insert(&mut self, path: &str, is_directory: bool, ignored: bool) {
        self.decisions.insert((path.to_string(), is_directory), ignored);
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Host-driven invalidation between scans, e.g. after the ignore pattern
    /// list itself changes.
    pub fn clear(&mut self) {
        self.decisions.clear();
    }
}
