//! Per-path stat+digest memo and reverse digest lookup (spec §3, §4.6).

pub mod cache;
pub mod entry;
pub mod reverse_lookup;

pub use cache::Cache;
pub use entry::{CacheEntry, ModTime};
pub use reverse_lookup::{generate_reverse_lookup, ReverseLookupMap};
