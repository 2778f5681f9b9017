//! Configuration surface consumed by the core (spec §6). No CLI or TOML
//! parsing lives here — that is an explicit Non-goal — these are the plain
//! enums/structs the host is expected to construct however it likes and
//! hand to Scan, Reconcile and Transition.

/// Symlink handling mode (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymlinkMode {
    /// Resolves to `Portable` at the call site; kept distinct so hosts can
    /// tell "the user didn't choose" from "the user chose Portable".
    #[default]
    Default,
    Ignore,
    Portable,
    PosixRaw,
}

/// Synchronization policy for Reconcile (spec §4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynchronizationMode {
    /// Resolves to `TwoWaySafe`.
    #[default]
    Default,
    TwoWaySafe,
    TwoWayResolved,
    OneWaySafe,
    OneWayReplica,
}

impl SynchronizationMode {
    /// Resolve `Default` to the concrete mode it stands for.
    pub fn resolved(self) -> SynchronizationMode {
        match self {
            SynchronizationMode::Default => SynchronizationMode::TwoWaySafe,
            other => other,
        }
    }
}

/// Whether Scan consults the built-in VCS ignore set (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnoreVcsMode {
    /// Resolves to `IgnoreVcs`.
    #[default]
    Default,
    IgnoreVcs,
    PropagateVcs,
}

/// How Scan determines Unicode-decomposition and executability-preservation
/// behavior of the root filesystem (spec §4.9 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeMode {
    #[default]
    Probe,
    AssumeSupported,
    AssumeUnsupported,
}

/// Defaults Transition applies when creating new filesystem entries
/// (spec §4.12, §6). Zero means "use version default" for modes; `None`
/// means "don't change ownership" for owner/group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionDefaults {
    pub file_mode: u32,
    pub directory_mode: u32,
    pub owner: Option<u32>,
    pub group: Option<u32>,
}

impl Default for TransitionDefaults {
    fn default() -> Self {
        TransitionDefaults {
            file_mode: crate::mode::DEFAULT_FILE_MODE,
            directory_mode: crate::mode::DEFAULT_DIRECTORY_MODE,
            owner: None,
            group: None,
        }
    }
}
