//! Staging-dependency listing (spec §4.13).

use synctree_model::change::Change;
use synctree_model::entry::{self, Entry};

/// For a change list, list the `(path, digest)` pairs whose content a
/// [`crate::Provider`] must be able to produce before `transition` runs.
///
/// A pure file-to-file change whose digest is unchanged needs no staging
/// (only the executable bit moves); everything else requires staging for
/// every File node reachable under `new`, in DFS pre-order.
pub fn staging_dependencies(changes: &[Change]) -> Vec<(String, Vec<u8>)> {
    let mut deps = Vec::new();
    for change in changes {
        if let (Some(Entry::File { digest: old_digest, .. }), Some(Entry::File { digest: new_digest, .. })) =
            (&change.old, &change.new)
        {
            if old_digest == new_digest {
                continue;
            }
        }

        if let Some(new_entry) = &change.new {
            entry::walk(Some(new_entry), &change.path, &mut |path, node| {
                if let Some(Entry::File { digest, .. }) = node {
                    deps.push((path.to_string(), digest.clone()));
                }
            });
        }
    }
    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn file(d: u8) -> Entry {
        Entry::file(vec![d], false)
    }

    #[test]
    fn pure_executable_bit_change_needs_no_staging() {
        let change = Change::new(
            "a",
            Some(Entry::file(vec![1], false)),
            Some(Entry::file(vec![1], true)),
        );
        assert!(staging_dependencies(&[change]).is_empty());
    }

    #[test]
    fn content_change_requires_staging() {
        let change = Change::new("a", Some(file(1)), Some(file(2)));
        assert_eq!(staging_dependencies(&[change]), vec![("a".to_string(), vec![2u8])]);
    }

    #[test]
    fn directory_creation_stages_every_file_in_dfs_order() {
        let mut contents = BTreeMap::new();
        contents.insert("a".to_string(), file(1));
        contents.insert("b".to_string(), file(2));
        let change = Change::new("dir", None, Some(Entry::directory(contents)));
        assert_eq!(
            staging_dependencies(&[change]),
            vec![("dir/a".to_string(), vec![1u8]), ("dir/b".to_string(), vec![2u8])]
        );
    }

    #[test]
    fn deletions_and_symlinks_need_no_staging() {
        let deletion = Change::new("a", Some(file(1)), None);
        let symlink = Change::new("b", None, Some(Entry::symlink("x")));
        assert!(staging_dependencies(&[deletion, symlink]).is_empty());
    }
}
