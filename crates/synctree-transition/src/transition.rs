//! The transition engine: replays a change list onto the real filesystem
//! (spec §4.12).

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::{symlink, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use synctree_cache::{Cache, CacheEntry, ModTime};
use synctree_core::cancel::CancellationToken;
use synctree_core::config::TransitionDefaults;
use synctree_core::error::{Problem, SyncError, SyncResult};
use synctree_core::mode::{mark_executable_for_readers, strip_executable_bits};
use synctree_core::path::join;
use synctree_model::change::Change;
use synctree_model::entry::Entry;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::provider::Provider;

/// `results[i]` is the actually-observed post-transition entry for
/// `changes[i]`; `problems` is the flat list of per-path failures
/// encountered along the way. Transition never fails wholesale — a failed
/// change still produces a best-effort `results[i]`.
#[derive(Debug, Clone, Default)]
pub struct TransitionOutput {
    pub results: Vec<Option<Entry>>,
    pub problems: Vec<Problem>,
}

/// Replay `changes` against `root` on disk. `cancel` is checked between
/// changes; a cancellation request stops the batch and leaves the
/// remaining entries in `changes` untouched (spec §5).
pub fn transition(
    root: &Path,
    changes: &[Change],
    cache: &Cache,
    defaults: TransitionDefaults,
    recompose_unicode: bool,
    provider: &dyn Provider,
    cancel: &CancellationToken,
) -> TransitionOutput {
    debug!(root = %root.display(), changes = changes.len(), "starting transition batch");
    let mut results = Vec::with_capacity(changes.len());
    let mut problems = Vec::new();

    for change in changes {
        if cancel.is_cancelled() {
            problems.push(Problem::new(&change.path, SyncError::Cancelled));
            results.push(change.old.clone());
            continue;
        }
        let result = transition_one(root, change, cache, defaults, recompose_unicode, provider, &mut problems);
        results.push(result);
    }

    if !problems.is_empty() {
        warn!(count = problems.len(), "transition batch completed with problems");
    }
    TransitionOutput { results, problems }
}

fn transition_one(
    root: &Path,
    change: &Change,
    cache: &Cache,
    defaults: TransitionDefaults,
    recompose_unicode: bool,
    provider: &dyn Provider,
    problems: &mut Vec<Problem>,
) -> Option<Entry> {
    if let (
        Some(Entry::File { digest: old_digest, executable: old_exec }),
        Some(Entry::File { digest: new_digest, executable: new_exec }),
    ) = (&change.old, &change.new)
    {
        return swap_file(
            root,
            &change.path,
            old_digest,
            *old_exec,
            new_digest,
            *new_exec,
            cache,
            defaults,
            provider,
            problems,
        );
    }

    let target = target_path(root, &change.path);

    if let Some(old) = &change.old {
        match resolve_leaf_with_proper_case(root, &change.path, recompose_unicode) {
            Ok(resolved) => {
                if let Some(remaining) = remove_tree(&resolved, old, &change.path, cache, problems) {
                    return Some(remaining);
                }
            }
            Err(e) => {
                problems.push(Problem::new(&change.path, e));
                return change.old.clone();
            }
        }
    }

    match &change.new {
        None => None,
        Some(new_entry) => {
            if change.path.is_empty() {
                if let Some(parent) = target.parent() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        problems.push(Problem::new(&change.path, e));
                        return None;
                    }
                }
            }
            create_tree(&target, new_entry, &change.path, defaults, provider, problems)
        }
    }
}

fn target_path(root: &Path, path: &str) -> PathBuf {
    if path.is_empty() {
        root.to_path_buf()
    } else {
        root.join(path)
    }
}

fn swap_file(
    root: &Path,
    path: &str,
    old_digest: &[u8],
    old_executable: bool,
    new_digest: &[u8],
    new_executable: bool,
    cache: &Cache,
    defaults: TransitionDefaults,
    provider: &dyn Provider,
    problems: &mut Vec<Problem>,
) -> Option<Entry> {
    let target = target_path(root, path);
    match swap_file_inner(
        &target,
        path,
        old_digest,
        new_digest,
        new_executable,
        cache,
        defaults,
        provider,
    ) {
        Ok(entry) => Some(entry),
        Err(e) => {
            problems.push(Problem::new(path, e));
            Some(Entry::file(old_digest.to_vec(), old_executable))
        }
    }
}

fn swap_file_inner(
    target: &Path,
    path: &str,
    old_digest: &[u8],
    new_digest: &[u8],
    new_executable: bool,
    cache: &Cache,
    defaults: TransitionDefaults,
    provider: &dyn Provider,
) -> SyncResult<Entry> {
    let metadata = fs::symlink_metadata(target)?;
    if let Some(cached) = cache.get(path) {
        let observed = observed_cache_entry(&metadata, old_digest.to_vec());
        if !cached.matches_observed(&observed) {
            return Err(SyncError::ModificationDetected { path: path.to_string() });
        }
    }

    if old_digest == new_digest {
        fs::set_permissions(target, fs::Permissions::from_mode(file_mode(defaults, new_executable)))?;
        return Ok(Entry::file(new_digest.to_vec(), new_executable));
    }

    let staged = provider.provide(path, new_digest)?;
    fs::set_permissions(&staged, fs::Permissions::from_mode(file_mode(defaults, new_executable)))?;
    chown_best_effort(&staged, defaults);
    fs::rename(&staged, target)?;
    Ok(Entry::file(new_digest.to_vec(), new_executable))
}

fn observed_cache_entry(metadata: &fs::Metadata, digest: Vec<u8>) -> CacheEntry {
    let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
    CacheEntry::new(metadata.mode(), ModTime::from(modified), metadata.size(), metadata.ino(), digest)
}

fn file_mode(defaults: TransitionDefaults, executable: bool) -> u32 {
    if executable {
        mark_executable_for_readers(defaults.file_mode)
    } else {
        strip_executable_bits(defaults.file_mode)
    }
}

fn chown_best_effort(path: &Path, defaults: TransitionDefaults) {
    if defaults.owner.is_none() && defaults.group.is_none() {
        return;
    }
    let _ = std::os::unix::fs::chown(path, defaults.owner, defaults.group);
}

/// Resolve every ancestor component of `path` case-sensitively (reading each
/// directory and requiring a byte-exact, optionally NFC-recomposed match)
/// and return the resolved leaf's own path.
fn resolve_leaf_with_proper_case(root: &Path, path: &str, recompose_unicode: bool) -> SyncResult<PathBuf> {
    if path.is_empty() {
        return Ok(root.to_path_buf());
    }
    let mut current = root.to_path_buf();
    for component in path.split('/') {
        current = verify_and_join(&current, component, recompose_unicode)?;
    }
    Ok(current)
}

fn verify_and_join(dir: &Path, expected_name: &str, recompose_unicode: bool) -> SyncResult<PathBuf> {
    let entries = fs::read_dir(dir)?;
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        let candidate: std::borrow::Cow<str> = if recompose_unicode {
            std::borrow::Cow::Owned(name.nfc().collect::<String>())
        } else {
            name
        };
        if candidate == expected_name {
            return Ok(entry.path());
        }
    }
    Err(SyncError::CaseConflict {
        path: expected_name.to_string(),
        expected: expected_name.to_string(),
        found: "no byte-exact match in parent directory".to_string(),
    })
}

/// Best-effort removal of `expected` at `target`. Returns `None` once every
/// expected node is gone; returns the leftover subtree otherwise (spec
/// §4.12 step 4: "the partial remaining tree").
///
/// A file is only removed after the same cache check `swap_file_inner` uses
/// confirms nothing has touched it since the last scan — removing content
/// that has silently diverged from what the caller expects would discard
/// data the host never agreed to give up.
fn remove_tree(target: &Path, expected: &Entry, path: &str, cache: &Cache, problems: &mut Vec<Problem>) -> Option<Entry> {
    match expected {
        Entry::Directory { contents } => {
            let mut remaining = BTreeMap::new();
            for (name, child) in contents {
                let child_path = join(path, name).unwrap_or_else(|_| name.clone());
                let child_target = target.join(name);
                if let Some(left) = remove_tree(&child_target, child, &child_path, cache, problems) {
                    remaining.insert(name.clone(), left);
                }
            }
            if !remaining.is_empty() {
                return Some(Entry::directory(remaining));
            }
            match fs::remove_dir(target) {
                Ok(()) => None,
                Err(e) => {
                    problems.push(Problem::new(path, e));
                    Some(Entry::directory(BTreeMap::new()))
                }
            }
        }
        Entry::File { digest, .. } => {
            if let Err(e) = verify_unmodified(target, path, digest, cache) {
                problems.push(Problem::new(path, e));
                return Some(expected.clone());
            }
            match fs::remove_file(target) {
                Ok(()) => None,
                Err(e) => {
                    problems.push(Problem::new(path, e));
                    Some(expected.clone())
                }
            }
        }
        Entry::Symlink { .. } => match fs::remove_file(target) {
            Ok(()) => None,
            Err(e) => {
                problems.push(Problem::new(path, e));
                Some(expected.clone())
            }
        },
    }
}

/// If `cache` has a recorded entry for `path`, require the on-disk state to
/// still match it before a removal proceeds.
fn verify_unmodified(target: &Path, path: &str, digest: &[u8], cache: &Cache) -> SyncResult<()> {
    let Some(cached) = cache.get(path) else {
        return Ok(());
    };
    let metadata = fs::symlink_metadata(target)?;
    let observed = observed_cache_entry(&metadata, digest.to_vec());
    if cached.matches_observed(&observed) {
        Ok(())
    } else {
        Err(SyncError::ModificationDetected { path: path.to_string() })
    }
}

/// Best-effort creation of `new` at `target`. Returns `None` if nothing was
/// created (so the parent's map omits this child); returns the actually
/// created shallow-or-deep copy otherwise.
fn create_tree(
    target: &Path,
    new: &Entry,
    path: &str,
    defaults: TransitionDefaults,
    provider: &dyn Provider,
    problems: &mut Vec<Problem>,
) -> Option<Entry> {
    if target.exists() {
        problems.push(Problem::new(path, "target already exists"));
        return None;
    }

    match new {
        Entry::Directory { contents } => {
            if let Err(e) = fs::create_dir(target) {
                problems.push(Problem::new(path, e));
                return None;
            }
            if let Err(e) = fs::set_permissions(target, fs::Permissions::from_mode(defaults.directory_mode)) {
                problems.push(Problem::new(path, e));
            }
            chown_best_effort(target, defaults);

            let mut created = BTreeMap::new();
            for (name, child) in contents {
                let child_path = join(path, name).unwrap_or_else(|_| name.clone());
                let child_target = target.join(name);
                if let Some(c) = create_tree(&child_target, child, &child_path, defaults, provider, problems) {
                    created.insert(name.clone(), c);
                }
            }
            Some(Entry::directory(created))
        }
        Entry::File { digest, executable } => match create_file(target, path, digest, *executable, defaults, provider) {
            Ok(()) => Some(new.clone()),
            Err(e) => {
                problems.push(Problem::new(path, e));
                None
            }
        },
        Entry::Symlink { target: link_target } => match symlink(link_target, target) {
            Ok(()) => Some(new.clone()),
            Err(e) => {
                problems.push(Problem::new(path, e));
                None
            }
        },
    }
}

fn create_file(
    target: &Path,
    path: &str,
    digest: &[u8],
    executable: bool,
    defaults: TransitionDefaults,
    provider: &dyn Provider,
) -> SyncResult<()> {
    let staged = provider.provide(path, digest)?;
    fs::set_permissions(&staged, fs::Permissions::from_mode(file_mode(defaults, executable)))?;
    chown_best_effort(&staged, defaults);
    fs::rename(&staged, target)?;
    Ok(())
}
