//! On-disk traversal into a snapshot tree and the filesystem probe it
//! depends on (spec §4.9). Runs single-threaded per call: scan is one of
//! the operations spec §5 requires not to spawn internal parallelism.

pub mod probe;
pub mod scan;

pub use probe::{probe_root, ProbeResult};
pub use scan::{scan, ScanOutput};
