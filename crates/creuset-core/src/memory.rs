//! Secure memory for the engine's working set and outputs.
//!
//! This module provides:
//! - [`MemoryArena`] — the `m`-block working array: allocated once,
//!   mutated only during the fill, zeroised and unlocked on drop
//! - [`SecretBuffer`] — container for the derived tag: zeroise on drop,
//!   masked `Debug`/`Display`
//! - `LockedRegion` — RAII `mlock` guard keeping sensitive pages out of
//!   swap (best-effort, soft fallback)

use crate::block::{Block, BLOCK_SIZE};
use crate::error::KdfError;
use crate::params::Geometry;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::Zeroize;

// ---------------------------------------------------------------------------
// Platform-specific memory locking
// ---------------------------------------------------------------------------

/// RAII guard that unlocks memory on drop.
///
/// When created, locks a memory region via `mlock` to prevent it from
/// being swapped to disk. On drop, calls `munlock` to release the lock.
///
/// If `mlock` fails (insufficient privileges or `RLIMIT_MEMLOCK` quota —
/// common for multi-megabyte working sets), the region is **not** locked
/// but no error is returned: locking is defence in depth, zeroisation is
/// the guarantee.
pub(crate) struct LockedRegion {
    ptr: *const u8,
    len: usize,
    locked: bool,
}

// SAFETY: The pointer is only used for mlock/munlock system calls, which
// are thread-safe. The pointed-to data is owned by MemoryArena/SecretBuffer
// and is not accessed through LockedRegion.
unsafe impl Send for LockedRegion {}
unsafe impl Sync for LockedRegion {}

impl LockedRegion {
    /// Attempt to lock a memory region. Returns a guard that unlocks on
    /// drop. Callers must guarantee the pointer outlives the guard.
    #[must_use]
    pub(crate) fn try_lock(ptr: *const u8, len: usize) -> Self {
        let locked = platform::try_mlock(ptr, len);
        Self { ptr, len, locked }
    }

    /// Returns `true` if the memory region is currently locked.
    pub(crate) const fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for LockedRegion {
    fn drop(&mut self) {
        if self.locked {
            platform::try_munlock(self.ptr, self.len);
        }
    }
}

// ---------------------------------------------------------------------------
// Working memory arena
// ---------------------------------------------------------------------------

/// The working array of `m'` blocks, laid out lane-major.
///
/// Allocated once per computation (validation precedes allocation, so a
/// rejected parameter set never reaches this point), wiped and unlocked
/// when dropped — including on the error and cancellation paths, which
/// simply let the arena fall out of scope.
pub(crate) struct MemoryArena {
    // Declared before `blocks` so munlock runs before the buffer is freed.
    _lock: LockedRegion,
    blocks: Vec<Block>,
}

impl MemoryArena {
    /// Allocate a zero-filled arena for `geo`. Fails without partial
    /// state if the allocation cannot be satisfied.
    pub(crate) fn allocate(geo: &Geometry) -> Result<Self, KdfError> {
        let count = geo.block_count as usize;
        let mut blocks: Vec<Block> = Vec::new();
        blocks
            .try_reserve_exact(count)
            .map_err(|_| KdfError::AllocationFailed)?;
        blocks.resize(count, Block::ZERO);

        let lock = LockedRegion::try_lock(blocks.as_ptr().cast(), count * BLOCK_SIZE);
        Ok(Self {
            _lock: lock,
            blocks,
        })
    }

    /// The whole arena as a mutable block slice.
    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Overwrite every block with zeros. Also runs on drop; exposed so
    /// tests can observe the wipe.
    pub(crate) fn wipe(&mut self) {
        for block in &mut self.blocks {
            block.zeroize();
        }
    }
}

impl Drop for MemoryArena {
    fn drop(&mut self) {
        self.wipe();
    }
}

// ---------------------------------------------------------------------------
// SecretBuffer — derived-tag container
// ---------------------------------------------------------------------------

/// Variable-length buffer for a derived tag or key.
///
/// Wraps [`SecretSlice<u8>`] from the `secrecy` crate and adds:
/// - `mlock` on allocation (soft fallback if unavailable)
/// - Masked `Debug`/`Display` output (`SecretBuffer(***)`)
/// - Zeroisation on drop (via `secrecy`'s built-in `Zeroize`)
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
    lock: LockedRegion,
}

impl SecretBuffer {
    /// Create a new `SecretBuffer` from the given data.
    ///
    /// The data is copied into a new allocation, then `mlock`'d. The
    /// caller should zeroise the source after calling this.
    ///
    /// # Errors
    ///
    /// Returns [`KdfError::AllocationFailed`] if the allocation cannot be
    /// satisfied.
    pub fn new(data: &[u8]) -> Result<Self, KdfError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(data.len())
            .map_err(|_| KdfError::AllocationFailed)?;
        bytes.extend_from_slice(data);
        let inner: SecretSlice<u8> = bytes.into();
        let exposed = inner.expose_secret();
        let lock = LockedRegion::try_lock(exposed.as_ptr(), exposed.len());
        Ok(Self { inner, lock })
    }

    /// Expose the underlying bytes. Use sparingly — only when the raw
    /// bytes are needed for a cryptographic operation, and prefer using
    /// the slice within a single expression.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Returns the number of bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Returns `true` if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the underlying memory is `mlock`'d.
    #[must_use]
    pub const fn is_mlocked(&self) -> bool {
        self.lock.is_locked()
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

// ---------------------------------------------------------------------------
// Platform-specific implementations
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod platform {
    pub(super) fn try_mlock(ptr: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: mlock is safe to call with any valid pointer/length
        // pair. If the region cannot be locked the kernel reports ENOMEM,
        // which we treat as the soft-fallback case.
        unsafe { libc::mlock(ptr.cast(), len) == 0 }
    }

    pub(super) fn try_munlock(ptr: *const u8, len: usize) {
        if len == 0 {
            return;
        }
        // SAFETY: munlock is safe to call. Failure is non-critical.
        unsafe {
            libc::munlock(ptr.cast(), len);
        }
    }
}

#[cfg(not(unix))]
mod platform {
    pub(super) fn try_mlock(_ptr: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) fn try_munlock(_ptr: *const u8, _len: usize) {}
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
