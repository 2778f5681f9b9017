//! `Cache` — per-path stat+digest memo for an entire snapshot (spec §3, §4.6).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use synctree_core::error::{SyncError, SyncResult};

use crate::entry::CacheEntry;

/// A mapping from root-relative path to what Scan last observed there.
/// The Transition engine's sole source of truth about "what the caller last
/// saw" (spec §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cache {
    entries: HashMap<String, CacheEntry>,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    pub fn with_capacity(capacity: usize) -> Cache {
        Cache {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, path: &str) -> Option<&CacheEntry> {
        self.entries.get(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(path.into(), entry);
    }

    pub fn remove(&mut self, path: &str) -> Option<CacheEntry> {
        self.entries.remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(p, e)| (p.as_str(), e))
    }

    /// Every entry's modification time must be internally consistent
    /// (spec §4.6: cache non-null, every entry non-null, every entry's
    /// modification time non-null — the analogues Rust's type system
    /// already guarantees collapse to this one residual check).
    pub fn ensure_valid(&self) -> SyncResult<()> {
        for (path, entry) in &self.entries {
            if !entry.is_valid() {
                return Err(SyncError::InvalidCache {
                    path: path.clone(),
                    reason: "modification time has nanoseconds >= 1_000_000_000".to_string(),
                });
            }
        }
        Ok(())
    }
}
