//! `CacheEntry` — per-path stat+digest memo (spec §3).

use serde::{Deserialize, Serialize};

/// Modification time with whole-second and nanosecond components, kept as
/// plain integers rather than a calendar type so the precision spec §3
/// demands ("whole-second + nanosecond precision") is exact and never
/// rounded by a wall-clock conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModTime {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl ModTime {
    pub fn new(seconds: i64, nanoseconds: u32) -> ModTime {
        ModTime { seconds, nanoseconds }
    }

    pub fn is_valid(&self) -> bool {
        self.nanoseconds < 1_000_000_000
    }
}

impl From<std::time::SystemTime> for ModTime {
    fn from(time: std::time::SystemTime) -> Self {
        match time.duration_since(std::time::UNIX_EPOCH) {
            Ok(d) => ModTime::new(d.as_secs() as i64, d.subsec_nanos()),
            Err(before_epoch) => {
                let d = before_epoch.duration();
                ModTime::new(-(d.as_secs() as i64), d.subsec_nanos())
            }
        }
    }
}

/// What Scan last observed on disk at a given path: enough to decide,
/// without reopening the file, whether a re-scan can reuse the digest
/// (spec §4.9 step 5, the fast-rescan path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub mode: u32,
    pub modification_time: ModTime,
    pub size: u64,
    /// Implementation-defined inode-like stable identifier.
    pub file_id: u64,
    pub digest: Vec<u8>,
}

impl CacheEntry {
    pub fn new(mode: u32, modification_time: ModTime, size: u64, file_id: u64, digest: Vec<u8>) -> CacheEntry {
        CacheEntry {
            mode,
            modification_time,
            size,
            file_id,
            digest,
        }
    }

    /// Whether `self` still describes `observed` closely enough that the
    /// digest can be reused without rehashing (spec §4.9 step 5: mode type,
    /// modification time, size and file-id all match).
    pub fn matches_observed(&self, observed: &CacheEntry) -> bool {
        self.mode == observed.mode
            && self.modification_time == observed.modification_time
            && self.size == observed.size
            && self.file_id == observed.file_id
    }

    pub fn is_valid(&self) -> bool {
        self.modification_time.is_valid()
    }
}
