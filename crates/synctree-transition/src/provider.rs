//! The `Provider` interface Transition uses to fetch staged content
//! (spec §6).

use std::path::PathBuf;

use synctree_core::error::SyncResult;

/// Produces a concrete filesystem path to a file whose content hashes to
/// `digest`, for the given root-relative `path`. Transition does no
/// ownership or permission setting on the returned file itself — it
/// `chmod`s/`chown`s before renaming into place. A provider must tolerate
/// being asked for the same digest more than once.
pub trait Provider {
    fn provide(&self, path: &str, digest: &[u8]) -> SyncResult<PathBuf>;
}
