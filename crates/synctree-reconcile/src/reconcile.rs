//! Three-way reconciliation (spec §4.11).

use std::collections::BTreeSet;

use synctree_core::config::SynchronizationMode;
use synctree_core::path::join;
use synctree_diff::diff::diff;
use synctree_model::change::{Change, Conflict};
use synctree_model::entry::{self, Entry};

/// The four change streams a reconciliation produces.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutput {
    pub ancestor_changes: Vec<Change>,
    pub alpha_changes: Vec<Change>,
    pub beta_changes: Vec<Change>,
    pub conflicts: Vec<Conflict>,
}

/// Reconcile `alpha` and `beta` against their common `ancestor` under `mode`.
pub fn reconcile(
    ancestor: Option<&Entry>,
    alpha: Option<&Entry>,
    beta: Option<&Entry>,
    mode: SynchronizationMode,
) -> ReconcileOutput {
    let mode = mode.resolved();
    let mut out = ReconcileOutput::default();
    recurse("", ancestor, alpha, beta, mode, &mut out);
    out
}

fn recurse(
    path: &str,
    ancestor: Option<&Entry>,
    alpha: Option<&Entry>,
    beta: Option<&Entry>,
    mode: SynchronizationMode,
    out: &mut ReconcileOutput,
) {
    if entry::equal_shallow(alpha, beta) {
        if !entry::equal_shallow(ancestor, alpha) {
            out.ancestor_changes
                .push(Change::new(path, ancestor.cloned(), alpha.cloned()));
        }
        recurse_children(path, ancestor, alpha, beta, mode, out);
        return;
    }

    let delta_alpha = diff(path, ancestor, alpha);
    let delta_beta = diff(path, ancestor, beta);

    if delta_alpha.is_empty() {
        resolve_one_side_changed(path, alpha, beta, &delta_beta, mode, out);
        return;
    }

    if delta_beta.is_empty() {
        // Only alpha changed: propagate alpha -> beta unconditionally,
        // regardless of mode.
        out.beta_changes
            .push(Change::new(path, beta.cloned(), alpha.cloned()));
        return;
    }

    // Both sides changed.
    let delta_alpha_star: Vec<Change> = delta_alpha.into_iter().filter(|c| !c.is_deletion()).collect();
    let delta_beta_star: Vec<Change> = delta_beta.into_iter().filter(|c| !c.is_deletion()).collect();

    if delta_alpha_star.is_empty() {
        // Alpha's side of the subtree contains only deletions; beta wins.
        out.alpha_changes
            .push(Change::new(path, alpha.cloned(), beta.cloned()));
    } else if delta_beta_star.is_empty() {
        out.beta_changes
            .push(Change::new(path, beta.cloned(), alpha.cloned()));
    } else if mode == SynchronizationMode::TwoWayResolved {
        out.beta_changes
            .push(Change::new(path, beta.cloned(), alpha.cloned()));
    } else {
        out.conflicts.push(Conflict::new(delta_alpha_star, delta_beta_star));
    }
}

/// `delta_alpha` was empty at this node: alpha has not changed since
/// `ancestor`, so the whole divergence is on beta's side.
fn resolve_one_side_changed(
    path: &str,
    alpha: Option<&Entry>,
    beta: Option<&Entry>,
    delta_beta: &[Change],
    mode: SynchronizationMode,
    out: &mut ReconcileOutput,
) {
    match mode {
        SynchronizationMode::TwoWaySafe | SynchronizationMode::TwoWayResolved => {
            out.alpha_changes
                .push(Change::new(path, alpha.cloned(), beta.cloned()));
        }
        SynchronizationMode::OneWayReplica => {
            // Alpha is the source of truth; beta's modification is reverted.
            out.beta_changes
                .push(Change::new(path, beta.cloned(), alpha.cloned()));
        }
        SynchronizationMode::OneWaySafe => {
            let is_pure_deletion = beta.is_none() && alpha.is_some();
            if is_pure_deletion {
                out.beta_changes
                    .push(Change::new(path, beta.cloned(), alpha.cloned()));
            } else {
                let alpha_side = vec![Change::new(path, alpha.cloned(), alpha.cloned())];
                out.conflicts.push(Conflict::new(alpha_side, delta_beta.to_vec()));
            }
        }
        SynchronizationMode::Default => unreachable!("mode is resolved before recursion begins"),
    }
}

fn recurse_children(
    path: &str,
    ancestor: Option<&Entry>,
    alpha: Option<&Entry>,
    beta: Option<&Entry>,
    mode: SynchronizationMode,
    out: &mut ReconcileOutput,
) {
    let ancestor_contents = entry::get_contents(ancestor);
    let alpha_contents = entry::get_contents(alpha);
    let beta_contents = entry::get_contents(beta);

    if ancestor_contents.is_empty() && alpha_contents.is_empty() && beta_contents.is_empty() {
        return;
    }

    let names: BTreeSet<&String> = ancestor_contents
        .keys()
        .chain(alpha_contents.keys())
        .chain(beta_contents.keys())
        .collect();

    for name in names {
        let child_path = join(path, name).unwrap_or_else(|_| name.clone());
        recurse(
            &child_path,
            ancestor_contents.get(name),
            alpha_contents.get(name),
            beta_contents.get(name),
            mode,
            out,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(d: u8) -> Entry {
        Entry::file(vec![d], false)
    }

    #[test]
    fn both_sides_deleted_converges_ancestor_to_absence() {
        let ancestor = f(1);
        let result = reconcile(Some(&ancestor), None, None, SynchronizationMode::TwoWaySafe);
        assert_eq!(result.ancestor_changes, vec![Change::new("", Some(f(1)), None)]);
        assert!(result.alpha_changes.is_empty());
        assert!(result.beta_changes.is_empty());
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn beta_modified_one_way_safe_conflicts() {
        let ancestor = f(1);
        let alpha = f(1);
        let beta = f(2);
        let result = reconcile(Some(&ancestor), Some(&alpha), Some(&beta), SynchronizationMode::OneWaySafe);
        assert!(result.alpha_changes.is_empty());
        assert!(result.beta_changes.is_empty());
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].alpha_changes, vec![Change::new("", Some(f(1)), Some(f(1)))]);
        assert_eq!(result.conflicts[0].beta_changes, vec![Change::new("", Some(f(1)), Some(f(2)))]);
    }

    #[test]
    fn beta_modified_one_way_replica_reverts_beta() {
        let ancestor = f(1);
        let alpha = f(1);
        let beta = f(2);
        let result = reconcile(Some(&ancestor), Some(&alpha), Some(&beta), SynchronizationMode::OneWayReplica);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.beta_changes, vec![Change::new("", Some(f(2)), Some(f(1)))]);
        assert!(result.alpha_changes.is_empty());
    }

    #[test]
    fn alpha_modified_propagates_to_beta_in_every_mode() {
        let ancestor = f(1);
        let alpha = f(2);
        for mode in [
            SynchronizationMode::TwoWaySafe,
            SynchronizationMode::TwoWayResolved,
            SynchronizationMode::OneWaySafe,
            SynchronizationMode::OneWayReplica,
        ] {
            let result = reconcile(Some(&ancestor), Some(&alpha), Some(&ancestor), mode);
            assert_eq!(result.beta_changes, vec![Change::new("", Some(f(1)), Some(f(2)))]);
        }
    }

    #[test]
    fn agreement_on_unchanged_subtree_emits_nothing() {
        let a = f(1);
        let result = reconcile(Some(&a), Some(&a), Some(&a), SynchronizationMode::TwoWaySafe);
        assert!(result.ancestor_changes.is_empty());
        assert!(result.alpha_changes.is_empty());
        assert!(result.beta_changes.is_empty());
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn both_sides_changed_differently_is_a_conflict_under_two_way_safe() {
        let ancestor = f(1);
        let alpha = f(2);
        let beta = f(3);
        let result = reconcile(Some(&ancestor), Some(&alpha), Some(&beta), SynchronizationMode::TwoWaySafe);
        assert_eq!(result.conflicts.len(), 1);
    }

    #[test]
    fn two_way_resolved_lets_alpha_win_conflicts() {
        let ancestor = f(1);
        let alpha = f(2);
        let beta = f(3);
        let result = reconcile(Some(&ancestor), Some(&alpha), Some(&beta), SynchronizationMode::TwoWayResolved);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.beta_changes, vec![Change::new("", Some(f(3)), Some(f(2)))]);
    }

    #[test]
    fn one_side_deletion_only_auto_resolves_without_conflict() {
        // Alpha deleted the file, beta edited it: alpha's side of the diff
        // is purely a deletion, so beta wins without a conflict.
        let ancestor = f(1);
        let beta = f(2);
        let result = reconcile(Some(&ancestor), None, Some(&beta), SynchronizationMode::TwoWaySafe);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.alpha_changes, vec![Change::new("", None, Some(f(2)))]);
    }
}
