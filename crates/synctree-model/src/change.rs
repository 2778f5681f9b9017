//! `Change` and `Conflict` (spec §3).

use synctree_core::error::{SyncError, SyncResult};

use crate::entry::{self, Entry};

/// A single-node transformation: `old` becomes `new` at `path`. A change at
/// `""` replaces the root. Either endpoint may be absent, but reconciliation
/// is allowed to emit synthetic changes where `old == new` for unidirectional
/// modes (spec §9 open question 1), so `ensure_valid` does not reject that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: String,
    pub old: Option<Entry>,
    pub new: Option<Entry>,
}

impl Change {
    pub fn new(path: impl Into<String>, old: Option<Entry>, new: Option<Entry>) -> Change {
        Change {
            path: path.into(),
            old,
            new,
        }
    }

    /// True if this change deletes the node at `path` (new is absent while
    /// old is present).
    pub fn is_deletion(&self) -> bool {
        self.old.is_some() && self.new.is_none()
    }

    pub fn ensure_valid(&self) -> SyncResult<()> {
        entry::validate(self.old.as_ref(), &self.path).map_err(|e| SyncError::InvalidChange {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        entry::validate(self.new.as_ref(), &self.path).map_err(|e| SyncError::InvalidChange {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// A pair of non-empty, non-deletion change lists that could not be
/// reconciled automatically under the active policy (spec §3, §4.11).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conflict {
    pub alpha_changes: Vec<Change>,
    pub beta_changes: Vec<Change>,
}

impl Conflict {
    pub fn new(alpha_changes: Vec<Change>, beta_changes: Vec<Change>) -> Conflict {
        Conflict {
            alpha_changes,
            beta_changes,
        }
    }

    /// The path at the root of this conflict: the shorter of the two sides'
    /// single-change path when both provide exactly one, else whichever side
    /// has exactly one change.
    pub fn root(&self) -> Option<&str> {
        match (self.alpha_changes.len(), self.beta_changes.len()) {
            (1, 1) => {
                let a = &self.alpha_changes[0].path;
                let b = &self.beta_changes[0].path;
                Some(if a.len() <= b.len() { a } else { b })
            }
            (1, _) => Some(&self.alpha_changes[0].path),
            (_, 1) => Some(&self.beta_changes[0].path),
            _ => None,
        }
    }

    pub fn ensure_valid(&self) -> SyncResult<()> {
        if self.alpha_changes.is_empty() || self.beta_changes.is_empty() {
            return Err(SyncError::InvalidConflict {
                reason: "both sides of a conflict must be non-empty".to_string(),
            });
        }
        if self.alpha_changes.len() != 1 && self.beta_changes.len() != 1 {
            return Err(SyncError::InvalidConflict {
                reason: "at least one side must contain exactly one change".to_string(),
            });
        }
        for change in self.alpha_changes.iter().chain(self.beta_changes.iter()) {
            change.ensure_valid().map_err(|e| SyncError::InvalidConflict {
                reason: e.to_string(),
            })?;
            if change.is_deletion() {
                return Err(SyncError::InvalidConflict {
                    reason: format!("conflict change at {:?} must not be a deletion", change.path),
                });
            }
        }
        Ok(())
    }
}
