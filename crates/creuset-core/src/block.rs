//! The 1024-byte memory block and the compression function G.
//!
//! A block is 128 little-endian 64-bit words. The compression function
//! computes `G(X, Y) = P(X ⊕ Y) ⊕ X ⊕ Y`, where P applies the
//! message-less BLAKE2b round to the block viewed as an 8×8 matrix of
//! 16-byte cells — once along rows, once along columns. All arithmetic is
//! wrapping; byte order only matters at the serialisation boundary.

use crate::sbox::SBox;
use zeroize::Zeroize;

/// Block size in bytes.
pub(crate) const BLOCK_SIZE: usize = 1024;

/// 64-bit words per block.
pub(crate) const WORDS_PER_BLOCK: usize = BLOCK_SIZE / 8;

/// A 1024-byte working-memory block (128 × u64).
#[derive(Clone, Zeroize)]
pub(crate) struct Block(pub(crate) [u64; WORDS_PER_BLOCK]);

impl Block {
    pub(crate) const ZERO: Self = Self([0u64; WORDS_PER_BLOCK]);

    /// XOR-assignment: `self ^= other`, word by word.
    pub(crate) fn xor_assign(&mut self, other: &Self) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a ^= b;
        }
    }

    /// Deserialise from 1024 little-endian bytes.
    pub(crate) fn from_bytes(bytes: &[u8; BLOCK_SIZE]) -> Self {
        let words = core::array::from_fn(|i| {
            u64::from_le_bytes(bytes[i * 8..i * 8 + 8].try_into().expect("8-byte chunk"))
        });
        Self(words)
    }

    /// Serialise to 1024 little-endian bytes.
    pub(crate) fn to_bytes(&self) -> [u8; BLOCK_SIZE] {
        let mut out = [0u8; BLOCK_SIZE];
        for (i, word) in self.0.iter().enumerate() {
            out[i * 8..i * 8 + 8].copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

/// The BLAKE2b mixing function with Argon2's multiplicative diffusion:
/// each addition also folds in `2 · lo32(a) · lo32(b)`.
#[inline(always)]
fn gb(a: u64, b: u64, c: u64, d: u64) -> (u64, u64, u64, u64) {
    let lo = |x: u64| x & 0xFFFF_FFFF;

    let a = a.wrapping_add(b).wrapping_add(2u64.wrapping_mul(lo(a)).wrapping_mul(lo(b)));
    let d = (d ^ a).rotate_right(32);
    let c = c.wrapping_add(d).wrapping_add(2u64.wrapping_mul(lo(c)).wrapping_mul(lo(d)));
    let b = (b ^ c).rotate_right(24);

    let a = a.wrapping_add(b).wrapping_add(2u64.wrapping_mul(lo(a)).wrapping_mul(lo(b)));
    let d = (d ^ a).rotate_right(16);
    let c = c.wrapping_add(d).wrapping_add(2u64.wrapping_mul(lo(c)).wrapping_mul(lo(d)));
    let b = (b ^ c).rotate_right(63);

    (a, b, c, d)
}

/// One message-less BLAKE2b round over sixteen words: four column mixes,
/// then four diagonal mixes.
#[inline(always)]
pub(crate) fn permute(v: &mut [u64; 16]) {
    (v[0], v[4], v[8], v[12]) = gb(v[0], v[4], v[8], v[12]);
    (v[1], v[5], v[9], v[13]) = gb(v[1], v[5], v[9], v[13]);
    (v[2], v[6], v[10], v[14]) = gb(v[2], v[6], v[10], v[14]);
    (v[3], v[7], v[11], v[15]) = gb(v[3], v[7], v[11], v[15]);

    (v[0], v[5], v[10], v[15]) = gb(v[0], v[5], v[10], v[15]);
    (v[1], v[6], v[11], v[12]) = gb(v[1], v[6], v[11], v[12]);
    (v[2], v[7], v[8], v[13]) = gb(v[2], v[7], v[8], v[13]);
    (v[3], v[4], v[9], v[14]) = gb(v[3], v[4], v[9], v[14]);
}

/// Word indices of column-pass group `i`: the interleaved 2-word gather
/// over the 8×8 cell matrix.
#[inline(always)]
fn column_indices(i: usize) -> [usize; 16] {
    core::array::from_fn(|k| 16 * (k / 2) + 2 * i + (k % 2))
}

/// Apply P to each row, then to each column, in place.
fn permute_block(block: &mut Block) {
    for row in 0..8 {
        let base = 16 * row;
        let mut v = [0u64; 16];
        v.copy_from_slice(&block.0[base..base + 16]);
        permute(&mut v);
        block.0[base..base + 16].copy_from_slice(&v);
    }

    for col in 0..8 {
        let idx = column_indices(col);
        let mut v = [0u64; 16];
        for (k, &j) in idx.iter().enumerate() {
            v[k] = block.0[j];
        }
        permute(&mut v);
        for (k, &j) in idx.iter().enumerate() {
            block.0[j] = v[k];
        }
    }
}

/// Fill `next` from `prev` and `refb` through the compression function.
///
/// `with_xor` selects the version-0x13 second-pass rule: the existing
/// contents of `next` are folded into the feedback term, so the write
/// becomes `next ^= G(prev, refb)`. With `with_xor == false` the write is
/// a plain `next = G(prev, refb)`.
///
/// When `sbox` is present (the "ds" variant), the 64-bit substitution
/// chain seeded from the pre-permutation state is added into words 0 and
/// 127 of the output.
pub(crate) fn fill_block(
    prev: &Block,
    refb: &Block,
    next: &mut Block,
    sbox: Option<&SBox>,
    with_xor: bool,
) {
    let mut r = prev.clone();
    r.xor_assign(refb);

    let mut feedback = r.clone();
    if with_xor {
        feedback.xor_assign(next);
    }

    let fold = match sbox {
        Some(s) => s.mix(&r),
        None => 0,
    };

    permute_block(&mut r);

    for (out, (q, f)) in next.0.iter_mut().zip(r.0.iter().zip(feedback.0.iter())) {
        *out = q ^ f;
    }

    if sbox.is_some() {
        next.0[0] = next.0[0].wrapping_add(fold);
        next.0[WORDS_PER_BLOCK - 1] = next.0[WORDS_PER_BLOCK - 1].wrapping_add(fold);
    }
}
