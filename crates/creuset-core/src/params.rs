//! Cost parameters, variants, versions, and input validation.
//!
//! This module provides:
//! - [`Params`] — serializable cost-parameter set (memory, passes, lanes, tag)
//! - [`Variant`] — addressing-strategy selector (d / i / id / ds)
//! - [`Version`] — algorithm version tag (0x10 historical, 0x13 current)
//! - Bounds validation for every parameter, returning a typed [`KdfError`]
//!
//! Validation runs before any allocation: a rejected parameter set never
//! touches the working memory or the caller's buffers.

use crate::error::KdfError;
use serde::{Deserialize, Serialize};

/// Number of synchronisation points (slices) per lane.
pub(crate) const SYNC_POINTS: u32 = 4;

/// Maximum lane count (2^24 − 1), shared with the worker-thread bound.
pub(crate) const MAX_LANES: u32 = 0x00FF_FFFF;

/// Minimum output tag length in bytes.
pub(crate) const MIN_TAG_LEN: u32 = 4;

/// Minimum salt length in bytes.
pub(crate) const MIN_SALT_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Variant and version
// ---------------------------------------------------------------------------

/// Addressing strategy of the memory-filling engine.
///
/// The numeric tags feed the pre-hash and therefore change the output;
/// they follow the reference encoding (the hybrid is fixed at 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Data-dependent addressing: reference indices come from block
    /// contents. Strongest against time-memory trade-offs, weakest
    /// against side channels.
    Argon2d,
    /// Data-independent addressing: reference indices come from a counter
    /// stream. Suitable when the attacker can observe memory access
    /// patterns.
    Argon2i,
    /// Hybrid schedule: data-independent for the first two slices of the
    /// first pass, data-dependent afterwards.
    Argon2id,
    /// Data-dependent addressing with an additional 64-bit S-box
    /// substitution inside the compression function.
    Argon2ds,
}

impl Variant {
    /// Numeric tag used in the pre-hash and the address-generator input.
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::Argon2d => 0,
            Self::Argon2i => 1,
            Self::Argon2id => 2,
            Self::Argon2ds => 4,
        }
    }

    /// Resolve a numeric tag, e.g. one read back from a stored header.
    ///
    /// # Errors
    ///
    /// Returns [`KdfError::UnknownVariant`] for any unassigned tag.
    pub const fn from_tag(tag: u32) -> Result<Self, KdfError> {
        match tag {
            0 => Ok(Self::Argon2d),
            1 => Ok(Self::Argon2i),
            2 => Ok(Self::Argon2id),
            4 => Ok(Self::Argon2ds),
            _ => Err(KdfError::UnknownVariant),
        }
    }

    /// Whether this variant drives the compression function through the
    /// per-pass S-box.
    pub(crate) const fn uses_sbox(self) -> bool {
        matches!(self, Self::Argon2ds)
    }

    /// Whether the segment at `(pass, slice)` uses data-independent
    /// addressing.
    pub(crate) const fn data_independent(self, pass: u32, slice: u32) -> bool {
        match self {
            Self::Argon2d | Self::Argon2ds => false,
            Self::Argon2i => true,
            Self::Argon2id => pass == 0 && slice < SYNC_POINTS / 2,
        }
    }
}

/// Algorithm version tag.
///
/// The version changes the write rule for passes after the first:
/// 0x13 XORs the fresh block into the existing one, 0x10 overwrites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Version {
    /// Historical version (overwrite on passes ≥ 1).
    V0x10,
    /// Current version (XOR-in on passes ≥ 1).
    V0x13,
}

impl Version {
    /// Numeric tag used in the pre-hash.
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::V0x10 => 0x10,
            Self::V0x13 => 0x13,
        }
    }

    /// Resolve a numeric tag.
    ///
    /// # Errors
    ///
    /// Returns [`KdfError::UnknownVersion`] for any unassigned tag.
    pub const fn from_tag(tag: u32) -> Result<Self, KdfError> {
        match tag {
            0x10 => Ok(Self::V0x10),
            0x13 => Ok(Self::V0x13),
            _ => Err(KdfError::UnknownVersion),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Cost-parameter set — immutable for the duration of one computation.
///
/// `m_cost` counts 1024-byte blocks (equivalently KiB of working memory)
/// and is rounded down to a multiple of `4 · p_cost` after validation.
/// `threads` caps the worker count of the parallel scheduler and has no
/// influence on the output tag; 0 means one worker per lane.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Addressing strategy.
    pub variant: Variant,
    /// Algorithm version.
    pub version: Version,
    /// Memory cost in blocks (KiB). Minimum `8 × p_cost`.
    pub m_cost: u32,
    /// Number of passes over the whole working memory. Minimum 1.
    pub t_cost: u32,
    /// Degree of parallelism (lane count). `1..=16777215`.
    pub p_cost: u32,
    /// Output tag length in bytes. Minimum 4.
    pub tag_len: u32,
    /// Worker-thread cap; 0 selects one worker per lane.
    #[serde(default)]
    pub threads: u32,
}

impl Params {
    /// Construct an Argon2id / version 0x13 parameter set with the given
    /// costs.
    #[must_use]
    pub const fn new(m_cost: u32, t_cost: u32, p_cost: u32, tag_len: u32) -> Self {
        Self {
            variant: Variant::Argon2id,
            version: Version::V0x13,
            m_cost,
            t_cost,
            p_cost,
            tag_len,
            threads: 0,
        }
    }

    /// Validate every parameter against the engine's bounds.
    ///
    /// # Errors
    ///
    /// One [`KdfError`] variant per out-of-range parameter; when several
    /// parameters are out of range, lane count is reported first, then
    /// passes, memory, and tag length.
    pub fn validate(&self) -> Result<(), KdfError> {
        if self.p_cost < 1 || self.p_cost > MAX_LANES {
            return Err(KdfError::Parallelism);
        }
        if self.threads > MAX_LANES {
            return Err(KdfError::Parallelism);
        }
        if self.t_cost < 1 {
            return Err(KdfError::Passes);
        }
        // 8 * p_cost cannot overflow u64; compare in the wider type.
        if u64::from(self.m_cost) < 8 * u64::from(self.p_cost) {
            return Err(KdfError::MemoryCost);
        }
        if self.tag_len < MIN_TAG_LEN {
            return Err(KdfError::TagLength);
        }
        Ok(())
    }

    /// Derive the working-memory geometry from validated parameters.
    pub(crate) fn geometry(&self) -> Geometry {
        let group = SYNC_POINTS * self.p_cost;
        let block_count = (self.m_cost / group) * group;
        let lane_length = block_count / self.p_cost;
        Geometry {
            lanes: self.p_cost,
            lane_length,
            segment_length: lane_length / SYNC_POINTS,
            block_count,
        }
    }

    /// Effective worker count for the slice scheduler.
    pub(crate) fn worker_count(&self) -> u32 {
        if self.threads == 0 {
            self.p_cost
        } else {
            self.threads.min(self.p_cost)
        }
    }
}

impl Default for Params {
    /// OWASP-recommended interactive defaults: Argon2id, version 0x13,
    /// 19 MiB, 2 passes, 1 lane, 32-byte tag.
    fn default() -> Self {
        Self::new(19 * 1024, 2, 1, 32)
    }
}

/// Working-memory geometry: the lanes × slices × blocks layout derived
/// from a validated parameter set.
///
/// `block_count` is the adjusted memory cost `m'` (a multiple of
/// `4 · lanes`); the block at (lane, position) lives at linear index
/// `lane · lane_length + position`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Geometry {
    pub lanes: u32,
    pub lane_length: u32,
    pub segment_length: u32,
    pub block_count: u32,
}

impl Geometry {
    /// Linear index of the block at `(lane, position)`.
    #[inline]
    pub(crate) fn index(&self, lane: u32, position: u32) -> u32 {
        lane * self.lane_length + position
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_tags_match_reference_encoding() {
        assert_eq!(Variant::Argon2d.tag(), 0);
        assert_eq!(Variant::Argon2i.tag(), 1);
        assert_eq!(Variant::Argon2id.tag(), 2);
        assert_eq!(Variant::Argon2ds.tag(), 4);
    }

    #[test]
    fn variant_from_tag_roundtrip() {
        for v in [
            Variant::Argon2d,
            Variant::Argon2i,
            Variant::Argon2id,
            Variant::Argon2ds,
        ] {
            assert_eq!(Variant::from_tag(v.tag()), Ok(v));
        }
        assert_eq!(Variant::from_tag(3), Err(KdfError::UnknownVariant));
        assert_eq!(Variant::from_tag(5), Err(KdfError::UnknownVariant));
    }

    #[test]
    fn version_from_tag_roundtrip() {
        assert_eq!(Version::from_tag(0x10), Ok(Version::V0x10));
        assert_eq!(Version::from_tag(0x13), Ok(Version::V0x13));
        assert_eq!(Version::from_tag(0x12), Err(KdfError::UnknownVersion));
    }

    #[test]
    fn hybrid_addressing_schedule() {
        // Data-independent exactly for the first two slices of pass 0.
        assert!(Variant::Argon2id.data_independent(0, 0));
        assert!(Variant::Argon2id.data_independent(0, 1));
        assert!(!Variant::Argon2id.data_independent(0, 2));
        assert!(!Variant::Argon2id.data_independent(0, 3));
        assert!(!Variant::Argon2id.data_independent(1, 0));

        assert!(Variant::Argon2i.data_independent(7, 3));
        assert!(!Variant::Argon2d.data_independent(0, 0));
        assert!(!Variant::Argon2ds.data_independent(0, 1));
    }

    #[test]
    fn validate_accepts_minimum_parameters() {
        let params = Params::new(8, 1, 1, 4);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_lanes() {
        let mut params = Params::new(32, 1, 1, 32);
        params.p_cost = 0;
        assert_eq!(params.validate(), Err(KdfError::Parallelism));
    }

    #[test]
    fn validate_rejects_excessive_lanes() {
        let mut params = Params::new(u32::MAX, 1, 1, 32);
        params.p_cost = MAX_LANES + 1;
        assert_eq!(params.validate(), Err(KdfError::Parallelism));
    }

    #[test]
    fn validate_rejects_zero_passes() {
        let params = Params::new(32, 0, 1, 32);
        assert_eq!(params.validate(), Err(KdfError::Passes));
    }

    #[test]
    fn validate_rejects_memory_below_floor() {
        let params = Params::new(7, 1, 1, 32);
        assert_eq!(params.validate(), Err(KdfError::MemoryCost));

        let params = Params::new(31, 1, 4, 32);
        assert_eq!(params.validate(), Err(KdfError::MemoryCost));
    }

    #[test]
    fn validate_rejects_short_tag() {
        let params = Params::new(32, 1, 1, 3);
        assert_eq!(params.validate(), Err(KdfError::TagLength));
    }

    #[test]
    fn geometry_rounds_memory_down_to_lane_group() {
        // 100 blocks over 4 lanes rounds down to 96 = 6 blocks per segment.
        let params = Params::new(100, 1, 4, 32);
        let geo = params.geometry();
        assert_eq!(geo.block_count, 96);
        assert_eq!(geo.lane_length, 24);
        assert_eq!(geo.segment_length, 6);
    }

    #[test]
    fn geometry_minimum_segment_length_is_two() {
        let params = Params::new(8, 1, 1, 32);
        let geo = params.geometry();
        assert_eq!(geo.segment_length, 2);
        assert_eq!(geo.lane_length, 8);
    }

    #[test]
    fn worker_count_zero_means_one_per_lane() {
        let mut params = Params::new(64, 1, 4, 32);
        assert_eq!(params.worker_count(), 4);
        params.threads = 2;
        assert_eq!(params.worker_count(), 2);
        params.threads = 9;
        assert_eq!(params.worker_count(), 4);
    }

    #[test]
    fn params_serde_roundtrip() {
        let params = Params {
            variant: Variant::Argon2ds,
            version: Version::V0x10,
            m_cost: 65536,
            t_cost: 3,
            p_cost: 4,
            tag_len: 64,
            threads: 2,
        };
        let json = serde_json::to_string(&params).expect("serialize should succeed");
        let back: Params = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(params, back);
    }

    #[test]
    fn params_serde_threads_defaults_to_zero() {
        let json = r#"{
            "variant": "Argon2id",
            "version": "V0x13",
            "m_cost": 19456,
            "t_cost": 2,
            "p_cost": 1,
            "tag_len": 32
        }"#;
        let params: Params = serde_json::from_str(json).expect("deserialize should succeed");
        assert_eq!(params.threads, 0);
        assert_eq!(params, Params::default());
    }
}
