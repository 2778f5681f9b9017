//! Three-way reconciliation between two snapshots and their common ancestor
//! (spec §4.11).

pub mod reconcile;

pub use reconcile::{reconcile, ReconcileOutput};
