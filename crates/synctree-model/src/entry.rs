//! The snapshot tree node (spec §3, §4.3).
//!
//! `Entry` is a tagged union of File, Directory and Symlink. The distinct
//! "no entry at this path" value is *not* a variant of `Entry` itself —
//! per spec §9's sum-type design note, call sites (Diff, Apply, Reconcile,
//! Scan) represent absence with `Option<Entry>` so a directory's children,
//! which can never be absent by the §3 invariant, don't need a second layer
//! of optionality to express that guarantee.

use std::borrow::Cow;
use std::collections::BTreeMap;

use synctree_core::error::{SyncError, SyncResult};

/// A node in a snapshot tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File { digest: Vec<u8>, executable: bool },
    Directory { contents: BTreeMap<String, Entry> },
    Symlink { target: String },
}

impl Entry {
    pub fn file(digest: Vec<u8>, executable: bool) -> Entry {
        Entry::File { digest, executable }
    }

    pub fn directory(contents: BTreeMap<String, Entry>) -> Entry {
        Entry::Directory { contents }
    }

    pub fn symlink(target: impl Into<String>) -> Entry {
        Entry::Symlink {
            target: target.into(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File { .. })
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory { .. })
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self, Entry::Symlink { .. })
    }

    pub fn digest(&self) -> Option<&[u8]> {
        match self {
            Entry::File { digest, .. } => Some(digest),
            _ => None,
        }
    }

    pub fn executable(&self) -> bool {
        matches!(self, Entry::File { executable: true, .. })
    }

    /// Duplicate this node without descending into children — the directory
    /// variant comes back with an empty map. Used to build created subtrees
    /// incrementally (Apply, Reconcile, Transition).
    pub fn shallow_copy(&self) -> Entry {
        match self {
            Entry::File { digest, executable } => Entry::File {
                digest: digest.clone(),
                executable: *executable,
            },
            Entry::Directory { .. } => Entry::Directory {
                contents: BTreeMap::new(),
            },
            Entry::Symlink { target } => Entry::Symlink {
                target: target.clone(),
            },
        }
    }

    /// Deep copy; an independent tree sharing no structure with `self`.
    pub fn copy(&self) -> Entry {
        self.clone()
    }

    /// Kind/executable/digest/target equality, ignoring directory contents.
    /// Two directories are always shallow-equal to each other regardless of
    /// their children.
    pub fn equal_shallow(&self, other: &Entry) -> bool {
        match (self, other) {
            (
                Entry::File {
                    digest: d1,
                    executable: e1,
                },
                Entry::File {
                    digest: d2,
                    executable: e2,
                },
            ) => d1 == d2 && e1 == e2,
            (Entry::Directory { .. }, Entry::Directory { .. }) => true,
            (Entry::Symlink { target: t1 }, Entry::Symlink { target: t2 }) => t1 == t2,
            _ => false,
        }
    }

    /// Full structural equality, recursing into directory children.
    pub fn equal(&self, other: &Entry) -> bool {
        match (self, other) {
            (Entry::Directory { contents: c1 }, Entry::Directory { contents: c2 }) => {
                c1.len() == c2.len()
                    && c1
                        .iter()
                        .all(|(name, child)| c2.get(name).map_or(false, |o| child.equal(o)))
            }
            _ => self.equal_shallow(other),
        }
    }

    /// Validate File/Directory/Symlink invariants (spec §3), recursively.
    pub fn validate(&self, path: &str) -> SyncResult<()> {
        match self {
            Entry::File { digest, .. } => {
                if digest.is_empty() {
                    return Err(SyncError::InvalidEntry {
                        path: path.to_string(),
                        reason: "file digest must not be empty".to_string(),
                    });
                }
                Ok(())
            }
            Entry::Symlink { target } => {
                if target.is_empty() {
                    return Err(SyncError::InvalidEntry {
                        path: path.to_string(),
                        reason: "symlink target must not be empty".to_string(),
                    });
                }
                Ok(())
            }
            Entry::Directory { contents } => {
                for (name, child) in contents {
                    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
                        return Err(SyncError::InvalidEntry {
                            path: path.to_string(),
                            reason: format!("invalid child name {name:?}"),
                        });
                    }
                    let child_path = synctree_core::path::join(path, name)
                        .unwrap_or_else(|_| name.clone());
                    child.validate(&child_path)?;
                }
                Ok(())
            }
        }
    }
}

/// Validate a possibly-absent entry at `path`. Absence is always valid.
pub fn validate(entry: Option<&Entry>, path: &str) -> SyncResult<()> {
    match entry {
        Some(e) => e.validate(path),
        None => Ok(()),
    }
}

/// 1 + sum of children for directories, 0 for absent, 1 for file/symlink.
pub fn count(entry: Option<&Entry>) -> usize {
    match entry {
        None => 0,
        Some(Entry::Directory { contents }) => {
            1 + contents.values().map(|c| count(Some(c))).sum::<usize>()
        }
        Some(_) => 1,
    }
}

/// `equal_shallow` tolerant of absence: absent is shallow-equal only to
/// absent.
pub fn equal_shallow(a: Option<&Entry>, b: Option<&Entry>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.equal_shallow(b),
        _ => false,
    }
}

/// `equal` tolerant of absence.
pub fn equal(a: Option<&Entry>, b: Option<&Entry>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.equal(b),
        _ => false,
    }
}

/// A directory's children, or an empty mapping for absent/non-directory
/// callers.
pub fn get_contents(entry: Option<&Entry>) -> Cow<'_, BTreeMap<String, Entry>> {
    match entry {
        Some(Entry::Directory { contents }) => Cow::Borrowed(contents),
        _ => Cow::Owned(BTreeMap::new()),
    }
}

/// DFS pre-order walk, visiting the node at `path` (which may be absent)
/// before its children.
pub fn walk<F>(entry: Option<&Entry>, path: &str, visitor: &mut F)
where
    F: FnMut(&str, Option<&Entry>),
{
    visitor(path, entry);
    if let Some(Entry::Directory { contents }) = entry {
        for (name, child) in contents {
            let child_path = synctree_core::path::join(path, name).unwrap_or_else(|_| name.clone());
            walk(Some(child), &child_path, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(d: u8) -> Entry {
        Entry::file(vec![d], false)
    }

    #[test]
    fn validate_rejects_empty_file_digest() {
        let e = Entry::File {
            digest: vec![],
            executable: false,
        };
        assert!(e.validate("x").is_err());
    }

    #[test]
    fn validate_rejects_empty_symlink_target() {
        let e = Entry::Symlink {
            target: String::new(),
        };
        assert!(e.validate("x").is_err());
    }

    #[test]
    fn validate_rejects_bad_child_names() {
        let mut contents = BTreeMap::new();
        contents.insert(".".to_string(), file(1));
        let dir = Entry::directory(contents);
        assert!(dir.validate("").is_err());

        let mut contents = BTreeMap::new();
        contents.insert("a/b".to_string(), file(1));
        let dir = Entry::directory(contents);
        assert!(dir.validate("").is_err());
    }

    #[test]
    fn validate_idempotent_on_valid_tree() {
        let mut contents = BTreeMap::new();
        contents.insert("a".to_string(), file(1));
        contents.insert("b".to_string(), Entry::symlink("a"));
        let dir = Entry::directory(contents);
        assert!(dir.validate("").is_ok());
        assert!(dir.validate("").is_ok());
    }

    #[test]
    fn equal_shallow_ignores_directory_contents() {
        let mut c1 = BTreeMap::new();
        c1.insert("a".to_string(), file(1));
        let mut c2 = BTreeMap::new();
        c2.insert("b".to_string(), file(2));
        assert!(Entry::directory(c1).equal_shallow(&Entry::directory(c2)));
    }

    #[test]
    fn equal_shallow_absent_only_equal_to_absent() {
        assert!(equal_shallow(None, None));
        assert!(!equal_shallow(None, Some(&file(1))));
        assert!(!equal_shallow(Some(&file(1)), None));
    }

    #[test]
    fn equal_recurses_into_children() {
        let mut c1 = BTreeMap::new();
        c1.insert("a".to_string(), file(1));
        let mut c2 = BTreeMap::new();
        c2.insert("a".to_string(), file(1));
        assert!(Entry::directory(c1.clone()).equal(&Entry::directory(c2)));

        let mut c3 = BTreeMap::new();
        c3.insert("a".to_string(), file(2));
        assert!(!Entry::directory(c1).equal(&Entry::directory(c3)));
    }

    #[test]
    fn count_matches_walk_visits() {
        let mut contents = BTreeMap::new();
        contents.insert("a".to_string(), file(1));
        contents.insert("b".to_string(), file(2));
        let mut sub = BTreeMap::new();
        sub.insert("c".to_string(), file(3));
        contents.insert("sub".to_string(), Entry::directory(sub));
        let root = Entry::directory(contents);

        let mut visited = 0;
        walk(Some(&root), "", &mut |_, _| visited += 1);
        assert_eq!(visited, count(Some(&root)));
        assert_eq!(count(Some(&root)), 5); // root + a + b + sub + c
    }

    #[test]
    fn count_absent_is_zero() {
        assert_eq!(count(None), 0);
    }

    #[test]
    fn shallow_copy_drops_children() {
        let mut contents = BTreeMap::new();
        contents.insert("a".to_string(), file(1));
        let dir = Entry::directory(contents);
        let shallow = dir.shallow_copy();
        assert_eq!(get_contents(Some(&shallow)).len(), 0);
    }

    #[test]
    fn get_contents_tolerates_non_directory() {
        assert_eq!(get_contents(Some(&file(1))).len(), 0);
        assert_eq!(get_contents(None).len(), 0);
    }
}
