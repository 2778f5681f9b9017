//! Executability propagation (spec §4.10).
//!
//! Fills in the executable flag on a freshly-scanned tree from an
//! authoritative ancestor/source pair, for filesystems that don't preserve
//! permission bits on write (spec §4.9 step 6, §4.4).

use std::collections::BTreeMap;

use synctree_model::entry::Entry;

/// Deep-copy `target`, propagating the executable flag in from `ancestor`
/// and `source` wherever `target`'s own bit can't be trusted.
pub fn propagate(ancestor: Option<&Entry>, source: Option<&Entry>, target: Option<&Entry>) -> Option<Entry> {
    let target = target?;
    Some(propagate_entry(ancestor, source, target))
}

fn propagate_entry(ancestor: Option<&Entry>, source: Option<&Entry>, target: &Entry) -> Entry {
    match target {
        Entry::Directory { contents } => {
            if entry_contents(ancestor).is_empty() && entry_contents(source).is_empty() {
                return target.clone();
            }
            let mut out = BTreeMap::new();
            for (name, child) in contents {
                let ancestor_child = entry_contents(ancestor).get(name).cloned();
                let source_child = entry_contents(source).get(name).cloned();
                out.insert(
                    name.clone(),
                    propagate_entry(ancestor_child.as_ref(), source_child.as_ref(), child),
                );
            }
            Entry::directory(out)
        }
        Entry::File { digest, executable } => {
            let new_executable = resolve_executable(ancestor, source, digest, *executable);
            Entry::file(digest.clone(), new_executable)
        }
        Entry::Symlink { .. } => target.clone(),
    }
}

fn resolve_executable(ancestor: Option<&Entry>, source: Option<&Entry>, target_digest: &[u8], current: bool) -> bool {
    if let Some(Entry::File { digest, executable }) = source {
        if digest.as_slice() == target_digest {
            return *executable;
        }
    }
    if let Some(Entry::File { digest, executable }) = ancestor {
        if digest.as_slice() == target_digest {
            return *executable;
        }
    }
    if let (Some(Entry::File { digest: sd, executable: se }), Some(Entry::File { digest: ad, .. })) = (source, ancestor) {
        if sd == ad && sd.as_slice() != target_digest {
            return *se;
        }
    }
    current
}

fn entry_contents(entry: Option<&Entry>) -> BTreeMap<String, Entry> {
    match entry {
        Some(Entry::Directory { contents }) => contents.clone(),
        _ => BTreeMap::new(),
    }
}
