//! `synctree`: a bidirectional file-synchronization core.
//!
//! This crate is a thin facade over the workspace's component crates —
//! snapshot model (`synctree-model`), cache (`synctree-cache`), ignore
//! engine (`synctree-ignore`), diff/apply/propagate (`synctree-diff`),
//! scan (`synctree-scan`), three-way reconcile (`synctree-reconcile`) and
//! transition (`synctree-transition`) — re-exported here as a single public
//! surface for a host that wants the whole pipeline without depending on
//! every member crate directly.

pub use synctree_cache::{generate_reverse_lookup, Cache, CacheEntry, ModTime, ReverseLookupMap};
pub use synctree_core::cancel::CancellationToken;
pub use synctree_core::config::{
    IgnoreVcsMode, ProbeMode, SymlinkMode, SynchronizationMode, TransitionDefaults,
};
pub use synctree_core::error::{Problem, SyncError, SyncResult};
pub use synctree_core::hasher::{Hasher, Sha1Hasher};
pub use synctree_diff::{apply, diff, propagate};
pub use synctree_ignore::{is_ignored, parse_all, IgnoreCache, Pattern};
pub use synctree_model::change::{Change, Conflict};
pub use synctree_model::entry::{self, Entry};
pub use synctree_model::symlink::{normalize_target, resolve_for_mode, Platform};
pub use synctree_reconcile::{reconcile, ReconcileOutput};
pub use synctree_scan::{scan, ScanOutput};
pub use synctree_transition::{staging_dependencies, transition, Provider, TransitionOutput};
