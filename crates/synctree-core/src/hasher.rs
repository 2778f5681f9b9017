//! Streaming content hasher (spec §6).
//!
//! Scan feeds file bytes through a `Hasher` exactly once per cold path and
//! never for a cache hit (the fast-rescan path in spec §4.9 step 5). The
//! reverse-lookup map (spec §3, §4.6) only accepts 20-byte digests, so
//! [`Sha1Hasher`] is the one concrete adapter this workspace ships; any other
//! `Hasher` whose digest size is stable is accepted by Scan but will make
//! the reverse-lookup map report "not found" for every entry.

use sha1::{Digest, Sha1};

/// A streaming hash with a fixed digest size per session.
pub trait Hasher {
    /// Reset internal state so the hasher can be reused for a new file.
    fn reset(&mut self);
    /// Feed bytes into the running hash.
    fn write(&mut self, data: &[u8]);
    /// Finalize and return the digest. Does not reset.
    fn sum(&self) -> Vec<u8>;
    /// Digest width in bytes, stable across the hasher's lifetime.
    fn size(&self) -> usize;
}

/// Width of a SHA-1 digest, the only width the reverse-lookup map supports.
pub const SHA1_DIGEST_SIZE: usize = 20;

#[derive(Default)]
pub struct Sha1Hasher {
    inner: Sha1,
}

impl Sha1Hasher {
    pub fn new() -> Self {
        Sha1Hasher::default()
    }
}

impl Hasher for Sha1Hasher {
    fn reset(&mut self) {
        self.inner = Sha1::new();
    }

    fn write(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn sum(&self) -> Vec<u8> {
        self.inner.clone().finalize().to_vec()
    }

    fn size(&self) -> usize {
        SHA1_DIGEST_SIZE
    }
}
