//! The segment filler and the pass scheduler.
//!
//! One (lane, slice) segment fill is the unit of parallel work. Within a
//! slice, up to `p` segment fills run concurrently; workers draw lanes
//! from a shared queue and a barrier separates slices. The reference
//! window rules guarantee that concurrent fills write disjoint regions
//! and read only blocks from completed slices, so the barrier is the only
//! synchronisation.

use crate::address::AddressGenerator;
use crate::block::{fill_block, Block};
use crate::error::KdfError;
use crate::index::{reference_index, reference_lane};
use crate::params::{Geometry, Params, Version, SYNC_POINTS};
use crate::sbox::SBox;
use crossbeam_utils::thread;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cloneable cancellation flag, checked at every slice boundary.
///
/// Cancelling does not interrupt a slice in progress; the computation
/// stops at the next barrier, the working memory is zeroised, and
/// [`KdfError::Cancelled`] is returned.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread, any number of
    /// times.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Shared working memory
// ---------------------------------------------------------------------------

/// Shared handle to the working array for the duration of one slice.
///
/// Access discipline is enforced by the scheduler, not by locks: each
/// worker writes only blocks of its own (lane, slice) segment, and reads
/// only blocks the reference rules permit — blocks from completed slices
/// or earlier positions of its own lane. The slice barrier establishes
/// happens-before between slices.
struct SharedBlocks {
    ptr: *mut Block,
    len: usize,
}

// SAFETY: Concurrent access through this handle follows the segment
// ownership discipline above; writes from distinct workers never alias
// and reads never overlap a concurrent write.
unsafe impl Send for SharedBlocks {}
unsafe impl Sync for SharedBlocks {}

impl SharedBlocks {
    fn new(blocks: &mut [Block]) -> Self {
        Self {
            ptr: blocks.as_mut_ptr(),
            len: blocks.len(),
        }
    }

    /// # Safety
    ///
    /// `offset` must be in bounds and the block must not be concurrently
    /// written.
    #[inline]
    unsafe fn get(&self, offset: u32) -> &Block {
        debug_assert!((offset as usize) < self.len);
        &*self.ptr.add(offset as usize)
    }

    /// # Safety
    ///
    /// `offset` must be in bounds, owned by the calling worker's segment,
    /// and not concurrently accessed.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    unsafe fn get_mut(&self, offset: u32) -> &mut Block {
        debug_assert!((offset as usize) < self.len);
        &mut *self.ptr.add(offset as usize)
    }
}

// ---------------------------------------------------------------------------
// Segment filler
// ---------------------------------------------------------------------------

/// Immutable per-pass state shared by every segment fill.
struct FillContext<'a> {
    geo: &'a Geometry,
    params: &'a Params,
    sbox: Option<&'a SBox>,
}

/// Fill the `(lane, slice)` segment of `pass`.
///
/// Walks the segment positions in order, acquiring the pseudo-random J
/// for each (from the previous block or the address generator), deriving
/// the reference block, and driving the compression function with the
/// version's write rule.
fn fill_segment(ctx: &FillContext<'_>, mem: &SharedBlocks, pass: u32, lane: u32, slice: u32) {
    let geo = ctx.geo;
    let starting_index = if pass == 0 && slice == 0 { 2 } else { 0 };
    if starting_index >= geo.segment_length {
        return;
    }

    let mut addresses = if ctx.params.variant.data_independent(pass, slice) {
        Some(AddressGenerator::new(
            geo,
            ctx.params.t_cost,
            ctx.params.variant,
            pass,
            lane,
            slice,
            starting_index,
        ))
    } else {
        None
    };

    let mut curr_offset = geo.index(lane, slice * geo.segment_length + starting_index);
    let mut prev_offset = if curr_offset % geo.lane_length == 0 {
        curr_offset + geo.lane_length - 1
    } else {
        curr_offset - 1
    };

    for index in starting_index..geo.segment_length {
        // The lane wraps only for the first position of a pass; from the
        // second block of the lane onward the predecessor is linear.
        if curr_offset % geo.lane_length == 1 {
            prev_offset = curr_offset - 1;
        }

        let j = match addresses.as_mut() {
            Some(generator) => generator.next_j(),
            // SAFETY: prev_offset was written earlier in this segment or
            // in a previous slice; no worker mutates it during this slice.
            None => unsafe { mem.get(prev_offset).0[0] },
        };
        let j1 = j as u32;
        let j2 = (j >> 32) as u32;

        let ref_lane = reference_lane(geo, pass, slice, lane, j2);
        let ref_index = reference_index(geo, pass, slice, index, ref_lane == lane, j1);
        let ref_offset = geo.index(ref_lane, ref_index);

        let with_xor = pass > 0 && ctx.params.version == Version::V0x13;

        // SAFETY: curr_offset belongs to this worker's segment; prev and
        // ref are distinct already-written blocks that no worker mutates
        // during this slice (reference-window rules + slice barrier).
        unsafe {
            let prev = mem.get(prev_offset);
            let refb = mem.get(ref_offset);
            let curr = mem.get_mut(curr_offset);
            fill_block(prev, refb, curr, ctx.sbox, with_xor);
        }

        curr_offset += 1;
        prev_offset += 1;
    }
}

// ---------------------------------------------------------------------------
// Pass scheduler
// ---------------------------------------------------------------------------

/// Fill the whole working array `t_cost` times.
///
/// For each pass and slice, one segment fill per lane runs — inline when
/// a single worker suffices, otherwise on scoped worker threads drawing
/// lanes from a shared queue. Joining the scope is the slice barrier.
/// The worker count never changes the output (only the wall-clock time).
pub(crate) fn fill_memory(
    blocks: &mut [Block],
    params: &Params,
    geo: &Geometry,
    cancel: Option<&CancelToken>,
) -> Result<(), KdfError> {
    let workers = params.worker_count().min(geo.lanes);
    let mut sbox = None;

    for pass in 0..params.t_cost {
        if params.variant.uses_sbox() {
            // Rebuilt every pass from the then-current first block.
            sbox = Some(SBox::generate(&blocks[0]));
        }
        let ctx = FillContext {
            geo,
            params,
            sbox: sbox.as_ref(),
        };

        for slice in 0..SYNC_POINTS {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    return Err(KdfError::Cancelled);
                }
            }

            let shared = SharedBlocks::new(blocks);
            if workers <= 1 {
                for lane in 0..geo.lanes {
                    fill_segment(&ctx, &shared, pass, lane, slice);
                }
            } else {
                let queue = AtomicU32::new(0);
                thread::scope(|s| {
                    for _ in 0..workers {
                        s.spawn(|_| loop {
                            let lane = queue.fetch_add(1, Ordering::Relaxed);
                            if lane >= geo.lanes {
                                break;
                            }
                            fill_segment(&ctx, &shared, pass, lane, slice);
                        });
                    }
                })
                .expect("segment worker panicked");
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
