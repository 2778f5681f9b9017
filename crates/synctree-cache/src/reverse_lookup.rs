//! `ReverseLookupMap` — digest-to-path reverse index (spec §3, §4.6, §9).

use std::collections::HashMap;

use synctree_core::error::{SyncError, SyncResult};
use synctree_core::hasher::SHA1_DIGEST_SIZE;

use crate::cache::Cache;

/// Reverse index from content digest to the last path Scan saw carrying it.
///
/// Digests must all be [`SHA1_DIGEST_SIZE`] bytes wide; the type refuses to
/// mix widths rather than guess which one is authoritative (spec §9, open
/// question on digest agility — resolved in favor of SHA-1-only for now, see
/// the design ledger).
#[derive(Debug, Clone, Default)]
pub struct ReverseLookupMap {
    by_digest: HashMap<Vec<u8>, String>,
    /// Count of inserts that overwrote an existing path for the same
    /// digest. Not used by lookup itself; exposed for hosts that want to
    /// notice an unexpectedly high collision rate (e.g. a weak hasher).
    collisions: u64,
}

impl ReverseLookupMap {
    pub fn new() -> ReverseLookupMap {
        ReverseLookupMap::default()
    }

    /// Insert `path` under `digest`. Last writer wins on collision, matching
    /// the order Scan walks the tree in (spec §4.6).
    pub fn insert(&mut self, digest: &[u8], path: impl Into<String>) -> SyncResult<()> {
        if digest.len() != SHA1_DIGEST_SIZE {
            return Err(SyncError::UnsupportedDigestWidth { width: digest.len() });
        }
        if let Some(existing_width) = self.by_digest.keys().next().map(|d| d.len()) {
            if existing_width != digest.len() {
                return Err(SyncError::InconsistentDigestWidths {
                    expected: existing_width,
                    found: digest.len(),
                });
            }
        }
        if self.by_digest.insert(digest.to_vec(), path.into()).is_some() {
            self.collisions += 1;
        }
        Ok(())
    }

    pub fn lookup(&self, digest: &[u8]) -> Option<&str> {
        self.by_digest.get(digest).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }

    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    pub fn clear(&mut self) {
        self.by_digest.clear();
        self.collisions = 0;
    }
}

/// Build a full reverse index from a `Cache` in one pass (spec §4.6,
/// `generate-reverse-lookup`): every entry's digest must be
/// [`SHA1_DIGEST_SIZE`] bytes wide, asserted against that constant directly
/// rather than against whichever entry happens to be inserted first.
pub fn generate_reverse_lookup(cache: &Cache) -> SyncResult<ReverseLookupMap> {
    let mut map = ReverseLookupMap::new();
    for (path, entry) in cache.iter() {
        if entry.digest.len() != SHA1_DIGEST_SIZE {
            return Err(SyncError::UnsupportedDigestWidth {
                width: entry.digest.len(),
            });
        }
        map.insert(&entry.digest, path)?;
    }
    Ok(map)
}
