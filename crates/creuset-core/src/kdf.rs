//! Memory-hard key derivation — the public entry points.
//!
//! This module provides:
//! - [`derive`] — password + salt to a [`SecretBuffer`] tag
//! - [`compute`] / [`compute_into`] — the full operation with secret
//!   value and associated data
//! - [`compute_cancellable`] — same, with a cancellation hook checked at
//!   slice boundaries
//! - [`Inputs`] — borrowed input bundle with masked `Debug`
//!
//! A computation validates every parameter, allocates the working arena,
//! expands the pre-hash into the first two blocks of each lane, runs the
//! pass scheduler, and extracts the tag. On every exit path the arena and
//! all intermediate digests are zeroised.

use crate::block::{Block, BLOCK_SIZE};
use crate::error::KdfError;
use crate::fill::{fill_memory, CancelToken};
use crate::hash::{blake2b, blake2b_long, DIGEST_LEN};
use crate::memory::{MemoryArena, SecretBuffer};
use crate::params::{Geometry, Params, MIN_SALT_LEN};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Longest input accepted for any byte-string parameter.
const MAX_INPUT_LEN: usize = u32::MAX as usize;

/// Seed of one lane block: pre-hash digest plus two position words.
const SEED_LEN: usize = DIGEST_LEN + 8;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Borrowed inputs of one computation.
///
/// `secret` turns the function into a keyed one (pepper); it and
/// `associated_data` may be empty, which encodes their absence. `Debug`
/// prints lengths only — the contents never reach log output.
#[derive(Clone, Copy)]
pub struct Inputs<'a> {
    /// The password or low-entropy secret being stretched.
    pub password: &'a [u8],
    /// Random per-derivation salt, at least 8 bytes.
    pub salt: &'a [u8],
    /// Optional secret value (keyed mode). Empty means unkeyed.
    pub secret: &'a [u8],
    /// Optional associated data bound into the pre-hash.
    pub associated_data: &'a [u8],
}

impl Default for Inputs<'_> {
    fn default() -> Self {
        Self {
            password: &[],
            salt: &[],
            secret: &[],
            associated_data: &[],
        }
    }
}

impl fmt::Debug for Inputs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inputs")
            .field("password_len", &self.password.len())
            .field("salt_len", &self.salt.len())
            .field("secret_len", &self.secret.len())
            .field("associated_data_len", &self.associated_data.len())
            .finish()
    }
}

fn validate_inputs(inputs: &Inputs<'_>) -> Result<(), KdfError> {
    if inputs.password.len() > MAX_INPUT_LEN {
        return Err(KdfError::PasswordLength);
    }
    if inputs.salt.len() < MIN_SALT_LEN || inputs.salt.len() > MAX_INPUT_LEN {
        return Err(KdfError::SaltLength);
    }
    if inputs.secret.len() > MAX_INPUT_LEN {
        return Err(KdfError::SecretLength);
    }
    if inputs.associated_data.len() > MAX_INPUT_LEN {
        return Err(KdfError::AssociatedDataLength);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive a tag from a password and salt (unkeyed, no associated data).
///
/// Returns a [`SecretBuffer`] of `params.tag_len` bytes.
///
/// # Errors
///
/// Any validation failure from [`compute`].
pub fn derive(password: &[u8], salt: &[u8], params: &Params) -> Result<SecretBuffer, KdfError> {
    compute(
        &Inputs {
            password,
            salt,
            ..Inputs::default()
        },
        params,
    )
}

/// The core operation: derive a tag from the full input bundle.
///
/// # Errors
///
/// Returns a typed [`KdfError`] for every out-of-range parameter or
/// input length, before any working memory is allocated, and
/// [`KdfError::AllocationFailed`] if the arena cannot be allocated.
pub fn compute(inputs: &Inputs<'_>, params: &Params) -> Result<SecretBuffer, KdfError> {
    params.validate()?;
    let mut tag = Vec::new();
    tag.try_reserve_exact(params.tag_len as usize)
        .map_err(|_| KdfError::AllocationFailed)?;
    tag.resize(params.tag_len as usize, 0u8);

    compute_inner(inputs, params, None, &mut tag)?;

    let buffer = SecretBuffer::new(&tag);
    tag.zeroize();
    buffer
}

/// Derive a tag into a caller-provided buffer.
///
/// `out.len()` must equal `params.tag_len`. On any error the buffer is
/// left untouched.
///
/// # Errors
///
/// As [`compute`], plus [`KdfError::TagLength`] when the buffer length
/// does not match the configured tag length.
pub fn compute_into(
    inputs: &Inputs<'_>,
    params: &Params,
    out: &mut [u8],
) -> Result<(), KdfError> {
    compute_inner(inputs, params, None, out)
}

/// Like [`compute_into`], with a cancellation hook.
///
/// The token is checked at every slice boundary; cancellation zeroises
/// the working memory and returns [`KdfError::Cancelled`] with the output
/// buffer untouched.
///
/// # Errors
///
/// As [`compute_into`], plus [`KdfError::Cancelled`].
pub fn compute_cancellable(
    inputs: &Inputs<'_>,
    params: &Params,
    cancel: &CancelToken,
    out: &mut [u8],
) -> Result<(), KdfError> {
    compute_inner(inputs, params, Some(cancel), out)
}

// ---------------------------------------------------------------------------
// Engine driving
// ---------------------------------------------------------------------------

fn compute_inner(
    inputs: &Inputs<'_>,
    params: &Params,
    cancel: Option<&CancelToken>,
    out: &mut [u8],
) -> Result<(), KdfError> {
    params.validate()?;
    validate_inputs(inputs)?;
    if out.len() != params.tag_len as usize {
        return Err(KdfError::TagLength);
    }

    let geo = params.geometry();
    let mut arena = MemoryArena::allocate(&geo)?;

    let h0 = initial_hash(inputs, params);
    fill_first_blocks(&h0, arena.blocks_mut(), &geo)?;
    drop(h0);

    fill_memory(arena.blocks_mut(), params, &geo, cancel)?;
    finalize(arena.blocks_mut(), &geo, out)
    // The arena drop zeroises and unlocks the working memory.
}

/// The 64-byte pre-hash H0 binding every parameter and input.
///
/// Layout: `le32(p) ‖ le32(tag_len) ‖ le32(m) ‖ le32(t) ‖ le32(version) ‖
/// le32(variant) ‖ len-prefixed password, salt, secret, associated data`.
/// Note that `m` is the requested memory cost, not the adjusted `m'`.
fn initial_hash(inputs: &Inputs<'_>, params: &Params) -> Zeroizing<[u8; DIGEST_LEN]> {
    let lanes = params.p_cost.to_le_bytes();
    let tag_len = params.tag_len.to_le_bytes();
    let m_cost = params.m_cost.to_le_bytes();
    let t_cost = params.t_cost.to_le_bytes();
    let version = params.version.tag().to_le_bytes();
    let variant = params.variant.tag().to_le_bytes();
    let password_len = (inputs.password.len() as u32).to_le_bytes();
    let salt_len = (inputs.salt.len() as u32).to_le_bytes();
    let secret_len = (inputs.secret.len() as u32).to_le_bytes();
    let ad_len = (inputs.associated_data.len() as u32).to_le_bytes();

    Zeroizing::new(blake2b(&[
        &lanes,
        &tag_len,
        &m_cost,
        &t_cost,
        &version,
        &variant,
        &password_len,
        inputs.password,
        &salt_len,
        inputs.salt,
        &secret_len,
        inputs.secret,
        &ad_len,
        inputs.associated_data,
    ]))
}

/// Expand H0 into the two seed blocks of every lane:
/// `B[lane][k] = H'(1024, H0 ‖ le32(k) ‖ le32(lane))`, k ∈ {0, 1}.
fn fill_first_blocks(
    h0: &[u8; DIGEST_LEN],
    blocks: &mut [Block],
    geo: &Geometry,
) -> Result<(), KdfError> {
    let mut seed = Zeroizing::new([0u8; SEED_LEN]);
    seed[..DIGEST_LEN].copy_from_slice(h0);
    let mut expanded = Zeroizing::new([0u8; BLOCK_SIZE]);

    for lane in 0..geo.lanes {
        seed[DIGEST_LEN + 4..].copy_from_slice(&lane.to_le_bytes());
        for k in 0..2u32 {
            seed[DIGEST_LEN..DIGEST_LEN + 4].copy_from_slice(&k.to_le_bytes());
            blake2b_long(&mut expanded[..], &[&seed[..]])?;
            blocks[geo.index(lane, k) as usize] = Block::from_bytes(&expanded);
        }
    }
    Ok(())
}

/// XOR-fold the last block of each lane and hash the fold to the tag.
fn finalize(blocks: &[Block], geo: &Geometry, out: &mut [u8]) -> Result<(), KdfError> {
    let last = geo.lane_length - 1;
    let mut fold = blocks[geo.index(0, last) as usize].clone();
    for lane in 1..geo.lanes {
        fold.xor_assign(&blocks[geo.index(lane, last) as usize]);
    }

    let serialised = Zeroizing::new(fold.to_bytes());
    fold.zeroize();
    blake2b_long(out, &[&serialised[..]])
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
