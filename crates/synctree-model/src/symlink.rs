//! Symlink target normalization and the three Scan-time symlink modes
//! (spec §4.4).

use synctree_core::config::SymlinkMode;
use synctree_core::error::{SyncError, SyncResult};

/// Which platform family's syntax rules apply. Distinct from `cfg(windows)`
/// so the policy itself stays testable on every host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    pub fn current() -> Platform {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// Windows' long-path boundary; targets longer than this are rejected even
/// on POSIX hosts so a portable link stays portable.
const MAX_PORTABLE_TARGET_LEN: usize = 247;

fn reject(link_path: &str, reason: &str) -> SyncError {
    SyncError::InvalidSymlinkTarget {
        path: link_path.to_string(),
        reason: reason.to_string(),
    }
}

/// Normalize `raw_target` (the literal target a symlink at `link_path`
/// points to) into a portable, root-relative target, or return a structured
/// rejection (spec §4.4 rules 1-6).
pub fn normalize_target(
    link_path: &str,
    raw_target: &str,
    platform: Platform,
) -> SyncResult<String> {
    if raw_target.is_empty() {
        return Err(reject(link_path, "target is empty"));
    }
    if raw_target.len() > MAX_PORTABLE_TARGET_LEN {
        return Err(reject(
            link_path,
            "target exceeds the 247-byte portable length limit",
        ));
    }
    if raw_target.contains(':') {
        return Err(reject(link_path, "target contains ':'"));
    }

    let converted;
    let target: &str = match platform {
        Platform::Windows => {
            converted = raw_target.replace('\\', "/");
            &converted
        }
        Platform::Posix => {
            if raw_target.contains('\\') {
                return Err(reject(
                    link_path,
                    "target contains '\\' on a POSIX-class platform",
                ));
            }
            raw_target
        }
    };

    if target.starts_with('/') {
        return Err(reject(link_path, "target is absolute"));
    }

    let mut depth: i64 = link_path.matches('/').count() as i64;
    for component in target.split('/') {
        match component {
            "." => {}
            ".." => depth -= 1,
            _ => depth += 1,
        }
        if depth < 0 {
            return Err(reject(link_path, "target escapes the synchronization root"));
        }
    }

    Ok(target.to_string())
}

/// Resolve a symlink's raw target under the active `SymlinkMode`.
/// `Ok(None)` means the link should be silently omitted from the snapshot
/// (Ignore mode); `Ok(Some(target))` is the target to store on the Entry.
pub fn resolve_for_mode(
    mode: SymlinkMode,
    link_path: &str,
    raw_target: &str,
    platform: Platform,
) -> SyncResult<Option<String>> {
    match mode.resolved_symlink_mode() {
        SymlinkMode::Ignore => Ok(None),
        SymlinkMode::Portable => normalize_target(link_path, raw_target, platform).map(Some),
        SymlinkMode::PosixRaw => {
            if platform == Platform::Windows {
                return Err(SyncError::UnsupportedSymlinkModeOnPlatform {
                    mode: "POSIX-raw".to_string(),
                });
            }
            if raw_target.is_empty() {
                return Err(reject(link_path, "target is empty"));
            }
            Ok(Some(raw_target.to_string()))
        }
        SymlinkMode::Default => unreachable!("resolved_symlink_mode never returns Default"),
    }
}

trait ResolvedSymlinkMode {
    fn resolved_symlink_mode(self) -> SymlinkMode;
}

impl ResolvedSymlinkMode for SymlinkMode {
    fn resolved_symlink_mode(self) -> SymlinkMode {
        match self {
            SymlinkMode::Default => SymlinkMode::Portable,
            other => other,
        }
    }
}
