//! Root-filesystem probing: Unicode decomposition and executability
//! preservation (spec §4.9 step 2).

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use synctree_core::config::ProbeMode;
use synctree_core::error::SyncResult;

/// Name of the throwaway file the `Probe` mode writes and immediately
/// removes. Chosen to sort outside any plausible ignore pattern and to be
/// unlikely to collide with real content.
const PROBE_FILE_NAME: &str = ".synctree-probe-\u{00e9}\u{0301}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub preserves_executability: bool,
    pub recomposes_unicode: bool,
}

/// Resolve `mode` against `root`, physically probing when asked to.
pub fn probe_root(root: &Path, mode: ProbeMode) -> SyncResult<ProbeResult> {
    match mode {
        ProbeMode::AssumeSupported => Ok(ProbeResult {
            preserves_executability: true,
            recomposes_unicode: false,
        }),
        ProbeMode::AssumeUnsupported => Ok(ProbeResult {
            preserves_executability: false,
            recomposes_unicode: false,
        }),
        ProbeMode::Probe => physically_probe(root),
    }
}

fn physically_probe(root: &Path) -> SyncResult<ProbeResult> {
    let probe_path = root.join(PROBE_FILE_NAME);
    fs::write(&probe_path, b"probe")?;

    let preserves_executability = (|| -> SyncResult<bool> {
        fs::set_permissions(&probe_path, fs::Permissions::from_mode(0o711))?;
        let observed = fs::symlink_metadata(&probe_path)?.permissions().mode() & 0o777;
        Ok(observed == 0o711)
    })()
    .unwrap_or(false);

    let recomposes_unicode = probe_observed_recomposed(root)?;

    let _ = fs::remove_file(&probe_path);
    Ok(ProbeResult {
        preserves_executability,
        recomposes_unicode,
    })
}

/// The probe name is written in NFD (decomposed `é`). If the filesystem
/// recomposes names on write, `read_dir` will list it back out in NFC —
/// a different byte sequence than the one we asked for.
fn probe_observed_recomposed(root: &Path) -> SyncResult<bool> {
    use unicode_normalization::UnicodeNormalization;

    let nfc_name: String = PROBE_FILE_NAME.nfc().collect();
    if nfc_name == PROBE_FILE_NAME {
        return Ok(false);
    }
    let found_nfc = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .any(|name| name == nfc_name);
    Ok(found_nfc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn assume_supported_skips_filesystem_access() {
        let result = probe_root(Path::new("/nonexistent"), ProbeMode::AssumeSupported).unwrap();
        assert!(result.preserves_executability);
        assert!(!result.recomposes_unicode);
    }

    #[test]
    fn assume_unsupported_reports_no_preservation() {
        let result = probe_root(Path::new("/nonexistent"), ProbeMode::AssumeUnsupported).unwrap();
        assert!(!result.preserves_executability);
    }

    #[test]
    fn physical_probe_detects_executability_preservation_on_typical_unix_fs() {
        let dir = tempdir().unwrap();
        let result = probe_root(dir.path(), ProbeMode::Probe).unwrap();
        assert!(result.preserves_executability);
    }

    #[test]
    fn physical_probe_cleans_up_after_itself() {
        let dir = tempdir().unwrap();
        probe_root(dir.path(), ProbeMode::Probe).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
