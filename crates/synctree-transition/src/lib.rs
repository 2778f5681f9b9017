//! Replaying a reconciled change list onto the real filesystem, and the
//! staging-dependency listing that precedes it (spec §4.12, §4.13).

pub mod provider;
pub mod staging;
pub mod transition;

pub use provider::Provider;
pub use staging::staging_dependencies;
pub use transition::{transition, TransitionOutput};
