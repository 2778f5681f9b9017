pub mod cancel;
pub mod config;
pub mod error;
pub mod hasher;
pub mod mode;
pub mod path;

pub use cancel::CancellationToken;
pub use config::{
    IgnoreVcsMode, ProbeMode, SymlinkMode, SynchronizationMode, TransitionDefaults,
};
pub use error::{SyncError, SyncResult};
pub use hasher::{Hasher, Sha1Hasher};
