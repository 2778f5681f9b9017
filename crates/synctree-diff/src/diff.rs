//! Structural diff between two possibly-absent snapshots (spec §4.7).

use std::collections::BTreeSet;

use synctree_core::path::join;
use synctree_model::change::Change;
use synctree_model::entry::{self, Entry};

/// Compute the minimum change list that turns `base` into `target`.
///
/// If the two roots disagree even shallowly, a single replacement change is
/// emitted and recursion stops there — `Diff` never descends into a subtree
/// where both sides already agree at the root.
pub fn diff(path: &str, base: Option<&Entry>, target: Option<&Entry>) -> Vec<Change> {
    if !entry::equal_shallow(base, target) {
        return vec![Change::new(path, base.cloned(), target.cloned())];
    }

    let (Some(Entry::Directory { contents: base_contents }), Some(Entry::Directory { contents: target_contents })) =
        (base, target)
    else {
        return Vec::new();
    };

    let names: BTreeSet<&String> = base_contents.keys().chain(target_contents.keys()).collect();

    let mut changes = Vec::new();
    for name in names {
        let child_path = join(path, name).unwrap_or_else(|_| name.clone());
        changes.extend(diff(&child_path, base_contents.get(name), target_contents.get(name)));
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn file(d: u8) -> Entry {
        Entry::file(vec![d], false)
    }

    #[test]
    fn identical_trees_produce_no_changes() {
        let mut c = BTreeMap::new();
        c.insert("a".to_string(), file(1));
        let t = Entry::directory(c);
        assert!(diff("", Some(&t), Some(&t)).is_empty());
    }

    #[test]
    fn root_replacement_when_kinds_differ() {
        let base = file(1);
        let target = Entry::symlink("x");
        let changes = diff("", Some(&base), Some(&target));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "");
    }

    #[test]
    fn creation_from_absent_base() {
        let changes = diff("", None, Some(&file(1)));
        assert_eq!(changes, vec![Change::new("", None, Some(file(1)))]);
    }

    #[test]
    fn does_not_descend_into_agreeing_subtree() {
        let mut sub = BTreeMap::new();
        sub.insert("same".to_string(), file(9));
        let shared_dir = Entry::directory(sub);

        let mut base_root = BTreeMap::new();
        base_root.insert("unchanged".to_string(), shared_dir.clone());
        base_root.insert("removed".to_string(), file(2));

        let mut target_root = BTreeMap::new();
        target_root.insert("unchanged".to_string(), shared_dir);
        target_root.insert("added".to_string(), file(3));

        let changes = diff("", Some(&Entry::directory(base_root)), Some(&Entry::directory(target_root)));
        let paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["added", "removed"]);
    }

    #[test]
    fn nested_single_file_change_reports_leaf_path() {
        let mut base_sub = BTreeMap::new();
        base_sub.insert("f".to_string(), file(1));
        let mut target_sub = BTreeMap::new();
        target_sub.insert("f".to_string(), file(2));

        let mut base_root = BTreeMap::new();
        base_root.insert("dir".to_string(), Entry::directory(base_sub));
        let mut target_root = BTreeMap::new();
        target_root.insert("dir".to_string(), Entry::directory(target_sub));

        let changes = diff("", Some(&Entry::directory(base_root)), Some(&Entry::directory(target_root)));
        assert_eq!(changes, vec![Change::new("dir/f", Some(file(1)), Some(file(2)))]);
    }
}
