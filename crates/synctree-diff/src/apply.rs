//! Replay a change list onto a snapshot (spec §4.8).

use std::collections::BTreeMap;

use synctree_core::error::{SyncError, SyncResult};
use synctree_model::change::Change;
use synctree_model::entry::Entry;

/// Apply `changes` in order to a deep copy of `base`, returning the result.
///
/// Apply does not validate that `changes` actually came from [`crate::diff`]
/// or a reconciler against this exact `base` — it assumes that and fails
/// only when a change's path doesn't resolve to an existing parent
/// directory.
pub fn apply(base: Option<&Entry>, changes: &[Change]) -> SyncResult<Option<Entry>> {
    let mut root = base.cloned();
    for change in changes {
        apply_one(&mut root, change)?;
    }
    Ok(root)
}

fn apply_one(root: &mut Option<Entry>, change: &Change) -> SyncResult<()> {
    if change.path.is_empty() {
        *root = change.new.clone();
        return Ok(());
    }

    let components: Vec<&str> = change.path.split('/').collect();
    let (leaf, ancestors) = components.split_last().expect("path is non-empty");

    let mut cursor: &mut BTreeMap<String, Entry> = match root {
        Some(Entry::Directory { contents }) => contents,
        _ => {
            return Err(parent_not_found(&change.path));
        }
    };

    for name in ancestors {
        cursor = match cursor.get_mut(*name) {
            Some(Entry::Directory { contents }) => contents,
            _ => return Err(parent_not_found(&change.path)),
        };
    }

    match &change.new {
        None => {
            cursor.remove(*leaf);
        }
        Some(new_entry) => {
            cursor.insert((*leaf).to_string(), new_entry.clone());
        }
    }
    Ok(())
}

fn parent_not_found(path: &str) -> SyncError {
    SyncError::InvalidChange {
        path: path.to_string(),
        reason: "parent directory not found or not a directory".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(d: u8) -> Entry {
        Entry::file(vec![d], false)
    }

    #[test]
    fn root_replacement() {
        let result = apply(None, &[Change::new("", None, Some(file(1)))]).unwrap();
        assert_eq!(result, Some(file(1)));
    }

    #[test]
    fn root_deletion() {
        let result = apply(Some(&file(1)), &[Change::new("", Some(file(1)), None)]).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn installs_nested_child() {
        let root = Entry::directory(BTreeMap::new());
        let result = apply(Some(&root), &[Change::new("a", None, Some(file(1)))]).unwrap();
        match result {
            Some(Entry::Directory { contents }) => assert_eq!(contents.get("a"), Some(&file(1))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn deletes_leaf_from_parent() {
        let mut contents = BTreeMap::new();
        contents.insert("a".to_string(), file(1));
        let root = Entry::directory(contents);
        let result = apply(Some(&root), &[Change::new("a", Some(file(1)), None)]).unwrap();
        match result {
            Some(Entry::Directory { contents }) => assert!(contents.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn fails_when_parent_missing() {
        let root = Entry::directory(BTreeMap::new());
        let err = apply(Some(&root), &[Change::new("missing/child", None, Some(file(1)))]);
        assert!(err.is_err());
    }

    #[test]
    fn fails_when_ancestor_is_not_a_directory() {
        let mut contents = BTreeMap::new();
        contents.insert("f".to_string(), file(1));
        let root = Entry::directory(contents);
        let err = apply(Some(&root), &[Change::new("f/child", None, Some(file(2)))]);
        assert!(err.is_err());
    }

    #[test]
    fn applies_multiple_changes_in_order() {
        let root = Entry::directory(BTreeMap::new());
        let changes = vec![
            Change::new("a", None, Some(file(1))),
            Change::new("a", Some(file(1)), Some(file(2))),
        ];
        let result = apply(Some(&root), &changes).unwrap();
        match result {
            Some(Entry::Directory { contents }) => assert_eq!(contents.get("a"), Some(&file(2))),
            other => panic!("unexpected {other:?}"),
        }
    }
}
