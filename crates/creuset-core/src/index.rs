//! Reference-block index derivation.
//!
//! Every block write mixes in one previously written block. The 64-bit
//! pseudo-random value J (data-dependent or from the address generator)
//! picks that reference: its upper half selects the lane, its lower half
//! is mapped over the window of eligible positions with a quadratic skew
//! that concentrates references toward the recent end of the history —
//! the distribution the memory-hardness argument relies on.

use crate::params::{Geometry, SYNC_POINTS};

/// Select the reference lane for a write at `(pass, slice)` in `lane`.
///
/// During the very first slice of the very first pass no other lane has
/// produced anything, so the reference stays in the current lane.
#[inline]
pub(crate) fn reference_lane(geo: &Geometry, pass: u32, slice: u32, lane: u32, j2: u32) -> u32 {
    if pass == 0 && slice == 0 {
        lane
    } else {
        j2 % geo.lanes
    }
}

/// Map `j1` to a position in the reference lane for a write at
/// `(pass, slice, index)`.
///
/// The window of eligible positions ("reference area") covers every block
/// already produced under the slice ordering, minus the block immediately
/// preceding the write; cross-lane references are limited to completed
/// slices. For passes after the first, the window starts right after the
/// current slice and wraps around the lane.
pub(crate) fn reference_index(
    geo: &Geometry,
    pass: u32,
    slice: u32,
    index: u32,
    same_lane: bool,
    j1: u32,
) -> u32 {
    debug_assert!(pass > 0 || slice > 0 || index >= 2, "seed blocks are not derived");

    let reference_area_size = if pass == 0 {
        if slice == 0 {
            // First slice: everything before the previous block.
            index - 1
        } else if same_lane {
            slice * geo.segment_length + index - 1
        } else if index == 0 {
            slice * geo.segment_length - 1
        } else {
            slice * geo.segment_length
        }
    } else if same_lane {
        geo.lane_length - geo.segment_length + index - 1
    } else if index == 0 {
        geo.lane_length - geo.segment_length - 1
    } else {
        geo.lane_length - geo.segment_length
    };

    // Quadratic skew: x = J1² / 2³², position = |W| − 1 − (|W| · x / 2³²).
    let x = (u64::from(j1) * u64::from(j1)) >> 32;
    let y = (u64::from(reference_area_size) * x) >> 32;
    let relative_position = reference_area_size - 1 - (y as u32);

    let start_position = if pass != 0 && slice != SYNC_POINTS - 1 {
        (slice + 1) * geo.segment_length
    } else {
        0
    };

    (start_position + relative_position) % geo.lane_length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use proptest::prelude::*;

    fn geometry(m: u32, p: u32) -> Geometry {
        Params::new(m, 1, p, 32).geometry()
    }

    #[test]
    fn first_slice_references_stay_in_lane() {
        let geo = geometry(64, 2);
        for j2 in [0u32, 1, 7, u32::MAX] {
            assert_eq!(reference_lane(&geo, 0, 0, 1, j2), 1);
        }
        // After the first slice the upper half of J picks the lane.
        assert_eq!(reference_lane(&geo, 0, 1, 1, 4), 0);
        assert_eq!(reference_lane(&geo, 1, 0, 0, 3), 1);
    }

    #[test]
    fn maximal_j1_lands_on_oldest_eligible_block() {
        // x saturates toward W, so the position degenerates to the window
        // start (the oldest block for pass 0).
        let geo = geometry(64, 1);
        let r = reference_index(&geo, 0, 0, 10, true, u32::MAX);
        assert_eq!(r, 0);
    }

    #[test]
    fn zero_j1_lands_on_newest_eligible_block() {
        let geo = geometry(64, 1);
        // Window is 0..=index-2; J1 = 0 selects its newest element.
        let r = reference_index(&geo, 0, 0, 10, true, 0);
        assert_eq!(r, 8);
    }

    #[test]
    fn second_pass_window_starts_after_current_slice() {
        let geo = geometry(64, 1); // lane_length 64, segment_length 16
        // J1 = u32::MAX degenerates to the window start.
        let r = reference_index(&geo, 1, 0, 5, true, u32::MAX);
        assert_eq!(r, 16);
        // Last slice wraps to the lane head.
        let r = reference_index(&geo, 1, 3, 5, true, u32::MAX);
        assert_eq!(r, 0);
    }

    /// In-lane position of the block being written.
    fn absolute(geo: &Geometry, slice: u32, index: u32) -> u32 {
        slice * geo.segment_length + index
    }

    /// Positions a same-lane reference must avoid: the write position, its
    /// immediate predecessor, and the unwritten tail of the segment.
    fn legal_same_lane(geo: &Geometry, pass: u32, slice: u32, index: u32, r: u32) -> bool {
        let pos = absolute(geo, slice, index);
        let prev = if pos == 0 { geo.lane_length - 1 } else { pos - 1 };
        let segment_end = (slice + 1) * geo.segment_length;
        if r == pos || r == prev {
            return false;
        }
        if (pos..segment_end).contains(&r) {
            return false;
        }
        if pass == 0 {
            // Nothing beyond the current segment exists yet.
            r < pos
        } else {
            r < geo.lane_length
        }
    }

    /// A cross-lane reference must come from a completed slice of that
    /// lane (previous passes make the rest of the lane legal later on),
    /// and never from the current slice.
    fn legal_other_lane(geo: &Geometry, pass: u32, slice: u32, index: u32, r: u32) -> bool {
        let slice_start = slice * geo.segment_length;
        let slice_end = slice_start + geo.segment_length;
        if (slice_start..slice_end).contains(&r) {
            return false;
        }
        if index == 0 {
            // The newest block of the previous slice is also excluded.
            let newest = if slice_start == 0 {
                geo.lane_length - 1
            } else {
                slice_start - 1
            };
            if r == newest {
                return false;
            }
        }
        if pass == 0 {
            r < slice_start
        } else {
            r < geo.lane_length
        }
    }

    proptest! {
        #[test]
        fn derived_references_are_legal(
            m in 8u32..512,
            p in 1u32..5,
            pass in 0u32..3,
            slice in 0u32..SYNC_POINTS,
            index_seed in 0u32..u32::MAX,
            j1 in any::<u32>(),
            j2 in any::<u32>(),
        ) {
            prop_assume!(m >= 8 * p);
            let geo = geometry(m, p);
            let index = if pass == 0 && slice == 0 {
                prop_assume!(geo.segment_length > 2);
                2 + index_seed % (geo.segment_length - 2)
            } else {
                index_seed % geo.segment_length
            };

            let lane = j2 % geo.lanes; // arbitrary current lane
            let ref_lane = reference_lane(&geo, pass, slice, lane, j2.rotate_left(7));
            let same_lane = ref_lane == lane;
            let r = reference_index(&geo, pass, slice, index, same_lane, j1);

            prop_assert!(r < geo.lane_length);
            if same_lane {
                prop_assert!(legal_same_lane(&geo, pass, slice, index, r));
            } else {
                prop_assert!(legal_other_lane(&geo, pass, slice, index, r));
            }
        }
    }
}
