pub mod change;
pub mod entry;
pub mod symlink;

pub use change::{Change, Conflict};
pub use entry::Entry;
pub use symlink::{normalize_target, resolve_for_mode, Platform};
