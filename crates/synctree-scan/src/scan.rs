//! On-disk scan: walks `root` and produces a snapshot tree plus the caches
//! the next scan and Transition will need (spec §4.9).

use std::collections::BTreeMap;
use std::fs::{self, DirEntry};
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::path::Path;

use synctree_cache::{Cache, CacheEntry, ModTime};
use synctree_core::cancel::CancellationToken;
use synctree_core::config::{ProbeMode, SymlinkMode};
use synctree_core::error::{SyncError, SyncResult};
use synctree_core::hasher::Hasher;
use synctree_core::path::join;
use synctree_ignore::{is_ignored, IgnoreCache, Pattern};
use synctree_model::entry::Entry;
use synctree_model::symlink::{resolve_for_mode, Platform};
use tracing::{debug, trace};
use unicode_normalization::UnicodeNormalization;

use crate::probe::probe_root;

pub use crate::probe::ProbeResult;

/// Default capacity hint for a fresh cache/ignore-cache when no previous
/// one is available to size against (spec §4.9 step 4).
const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Implementation-defined temporary-file name patterns skipped during scan
/// (spec §4.9 step 5): editor swap files and the like, never meaningful
/// synchronization content.
const TEMPORARY_NAME_PREFIXES: &[&str] = &[".nfs", ".goutputstream-"];
const TEMPORARY_NAME_SUFFIXES: &[&str] = &["~", ".swp", ".swx", ".tmp"];

fn is_temporary_name(name: &str) -> bool {
    TEMPORARY_NAME_PREFIXES.iter().any(|p| name.starts_with(p))
        || TEMPORARY_NAME_SUFFIXES.iter().any(|s| name.ends_with(s))
}

#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub snapshot: Option<Entry>,
    pub preserves_executability: bool,
    pub recomposes_unicode: bool,
    pub cache: Cache,
    pub ignore_cache: IgnoreCache,
}

/// Scan `root` and produce a fresh snapshot (spec §4.9).
///
/// `previous_cache` and `previous_ignore_cache` seed the fast-rescan path
/// and the ignore-decision memo respectively; both may be empty on a first
/// scan. `cancel` is checked at each directory and before each file hash.
#[allow(clippy::too_many_arguments)]
pub fn scan(
    root: &Path,
    hasher: &mut dyn Hasher,
    previous_cache: &Cache,
    ignore_patterns: &[Pattern],
    previous_ignore_cache: &IgnoreCache,
    probe_mode: ProbeMode,
    symlink_mode: SymlinkMode,
    cancel: &CancellationToken,
) -> SyncResult<ScanOutput> {
    let root_metadata = match fs::symlink_metadata(root) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(root = %root.display(), "scan root does not exist, returning empty snapshot");
            return Ok(ScanOutput {
                snapshot: None,
                preserves_executability: false,
                recomposes_unicode: false,
                cache: Cache::with_capacity(DEFAULT_CACHE_CAPACITY),
                ignore_cache: IgnoreCache::new(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if root_metadata.file_type().is_symlink() {
        return Err(SyncError::ScanRootIsSymlink {
            path: root.to_path_buf(),
        });
    }

    let ProbeResult {
        preserves_executability,
        recomposes_unicode,
    } = probe_root(root, probe_mode)?;

    let device = root_metadata.dev();
    let cache_capacity = if previous_cache.is_empty() {
        DEFAULT_CACHE_CAPACITY
    } else {
        previous_cache.len()
    };
    let mut new_cache = Cache::with_capacity(cache_capacity);
    // Carry forward decisions the previous scan already made; re-scanned
    // paths overwrite them, unaffected ones are reused as-is.
    let mut new_ignore_cache = previous_ignore_cache.clone();

    let mut ctx = ScanContext {
        hasher,
        previous_cache,
        ignore_patterns,
        symlink_mode,
        recomposes_unicode,
        device,
        cancel,
        new_cache: &mut new_cache,
        new_ignore_cache: &mut new_ignore_cache,
    };

    let contents = ctx.scan_directory(root, "")?;
    let snapshot = Some(Entry::directory(contents));

    Ok(ScanOutput {
        snapshot,
        preserves_executability,
        recomposes_unicode,
        cache: new_cache,
        ignore_cache: new_ignore_cache,
    })
}

struct ScanContext<'a> {
    hasher: &'a mut dyn Hasher,
    previous_cache: &'a Cache,
    ignore_patterns: &'a [Pattern],
    symlink_mode: SymlinkMode,
    recomposes_unicode: bool,
    device: u64,
    cancel: &'a CancellationToken,
    new_cache: &'a mut Cache,
    new_ignore_cache: &'a mut IgnoreCache,
}

impl<'a> ScanContext<'a> {
    fn scan_directory(&mut self, dir: &Path, rel_path: &str) -> SyncResult<BTreeMap<String, Entry>> {
        self.cancel.check()?;
        let mut contents = BTreeMap::new();
        let entries = fs::read_dir(dir)?;

        for dir_entry in entries {
            let dir_entry = dir_entry?;
            if let Some((name, entry)) = self.scan_child(&dir_entry, rel_path)? {
                contents.insert(name, entry);
            }
        }
        Ok(contents)
    }

    fn scan_child(&mut self, dir_entry: &DirEntry, parent_rel_path: &str) -> SyncResult<Option<(String, Entry)>> {
        let raw_name = dir_entry.file_name();
        let raw_name = match raw_name.into_string() {
            Ok(n) => n,
            Err(_) => return Ok(None), // non-UTF-8 name: unrepresentable, skip.
        };
        if is_temporary_name(&raw_name) {
            return Ok(None);
        }

        let name = if self.recomposes_unicode {
            raw_name.nfc().collect::<String>()
        } else {
            raw_name
        };

        let child_rel_path = join(parent_rel_path, &name)?;
        let metadata = dir_entry.metadata()?;
        let file_type = metadata.file_type();

        let is_directory = file_type.is_dir();
        if is_ignored(self.ignore_patterns, &child_rel_path, is_directory, self.new_ignore_cache) {
            trace!(path = %child_rel_path, "skipping ignored path");
            return Ok(None);
        }

        if file_type.is_symlink() {
            let target = fs::read_link(dir_entry.path())?;
            let target = target.to_string_lossy().into_owned();
            return match resolve_for_mode(self.symlink_mode, &child_rel_path, &target, Platform::current())? {
                Some(normalized) => Ok(Some((name, Entry::symlink(normalized)))),
                None => Ok(None),
            };
        }

        if is_directory {
            if metadata.dev() != self.device {
                return Err(SyncError::ScanCrossedDeviceBoundary {
                    path: dir_entry.path(),
                });
            }
            let contents = self.scan_directory(&dir_entry.path(), &child_rel_path)?;
            return Ok(Some((name, Entry::directory(contents))));
        }

        if file_type.is_file() {
            let entry = self.scan_file(&dir_entry.path(), &child_rel_path, &metadata)?;
            return Ok(Some((name, entry)));
        }

        if file_type.is_block_device()
            || file_type.is_char_device()
            || file_type.is_fifo()
            || file_type.is_socket()
        {
            trace!(path = %child_rel_path, "skipping unsupported entry kind");
            return Ok(None);
        }

        Ok(None)
    }

    fn scan_file(&mut self, path: &Path, rel_path: &str, metadata: &fs::Metadata) -> SyncResult<Entry> {
        let mode = metadata.permissions().mode();
        let executable = synctree_core::mode::any_executable_bit_set(mode);
        let observed = CacheEntry::new(
            mode,
            ModTime::from(metadata.modified().unwrap_or(std::time::UNIX_EPOCH)),
            metadata.size(),
            metadata.ino(),
            Vec::new(),
        );

        if let Some(cached) = self.previous_cache.get(rel_path) {
            if cached.matches_observed(&observed) {
                self.new_cache.insert(rel_path, cached.clone());
                return Ok(Entry::file(cached.digest.clone(), executable));
            }
        }

        self.cancel.check()?;
        let digest = self.hash_file(path, metadata.size())?;
        let entry = CacheEntry::new(mode, observed.modification_time, observed.size, observed.file_id, digest.clone());
        self.new_cache.insert(rel_path, entry);
        Ok(Entry::file(digest, executable))
    }

    fn hash_file(&mut self, path: &Path, expected_size: u64) -> SyncResult<Vec<u8>> {
        use std::io::Read;

        self.hasher.reset();
        let mut file = fs::File::open(path)?;
        let mut buf = [0u8; 64 * 1024];
        let mut copied: u64 = 0;
        loop {
            let n = file.read(&mut buf).map_err(|e| SyncError::HashIoError {
                path: path.to_path_buf(),
                source: e,
            })?;
            if n == 0 {
                break;
            }
            self.hasher.write(&buf[..n]);
            copied += n as u64;
        }
        if copied != expected_size {
            return Err(SyncError::HashSizeMismatch {
                path: path.to_path_buf(),
                expected: expected_size,
                copied,
            });
        }
        Ok(self.hasher.sum())
    }
}
