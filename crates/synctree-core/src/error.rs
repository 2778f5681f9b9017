use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Hard errors returned by Scan, Diff, Reconcile and Apply (spec §7.1).
///
/// Transition never returns these for per-change failures; it records a
/// [`crate::error::Problem`] instead and keeps going.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("invalid entry at {path}: {reason}")]
    InvalidEntry { path: String, reason: String },

    #[error("invalid cache entry at {path}: {reason}")]
    InvalidCache { path: String, reason: String },

    #[error("invalid change at {path}: {reason}")]
    InvalidChange { path: String, reason: String },

    #[error("invalid conflict: {reason}")]
    InvalidConflict { reason: String },

    #[error("invalid ignore pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid symlink target at {path}: {reason}")]
    InvalidSymlinkTarget { path: String, reason: String },

    #[error("unsupported digest width: {width} bytes")]
    UnsupportedDigestWidth { width: usize },

    #[error("inconsistent digest widths in cache: expected {expected}, found {found}")]
    InconsistentDigestWidths { expected: usize, found: usize },

    #[error("scan crossed filesystem boundary at {path}")]
    ScanCrossedDeviceBoundary { path: PathBuf },

    #[error("scan root is a symlink: {path}")]
    ScanRootIsSymlink { path: PathBuf },

    #[error("symlink mode {mode} is unsupported on this platform")]
    UnsupportedSymlinkModeOnPlatform { mode: String },

    #[error("I/O error hashing {path}: {source}")]
    HashIoError { path: PathBuf, source: io::Error },

    #[error("hash size mismatch at {path}: expected {expected} bytes, copied {copied}")]
    HashSizeMismatch {
        path: PathBuf,
        expected: u64,
        copied: u64,
    },

    #[error("modification detected at {path}: on-disk state no longer matches cache")]
    ModificationDetected { path: String },

    #[error("case conflict at {path}: expected {expected:?}, found {found:?}")]
    CaseConflict {
        path: String,
        expected: String,
        found: String,
    },

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// A single non-fatal failure recorded by Transition (spec §7.2). Transition
/// always returns a full `results` list; Problems are the parallel list of
/// per-path diagnostics that let a batch continue past a single failure.
#[derive(Debug, Clone)]
pub struct Problem {
    pub path: String,
    pub error: String,
}

impl Problem {
    pub fn new(path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Problem {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}
