//! The 64-bit S-box of the "ds" variant.
//!
//! A 1024-entry table of 64-bit words, rebuilt at the start of every pass
//! from the then-current first block of the first lane. During each block
//! compression the table drives a 96-round multiply-and-substitute chain
//! whose result is folded into the output block, making the compression
//! function itself data-dependent.

use crate::block::{fill_block, Block, WORDS_PER_BLOCK};
use zeroize::Zeroize;

/// Table size in 64-bit entries.
pub(crate) const SBOX_SIZE: usize = 1 << 10;

/// Index mask for one half of the table.
pub(crate) const SBOX_MASK: u64 = (SBOX_SIZE as u64) / 2 - 1;

/// Rounds of the substitution chain per compressed block.
const MIX_ROUNDS: usize = 96;

/// The per-pass substitution table.
pub(crate) struct SBox(Box<[u64; SBOX_SIZE]>);

impl SBox {
    /// Build the table from `seed` (the current first block of lane 0) by
    /// chaining the compression function over a zero key: each 128-word
    /// chunk of the table is the seed after two further applications of G.
    pub(crate) fn generate(seed: &Block) -> Self {
        let mut table = Box::new([0u64; SBOX_SIZE]);
        let mut chain = seed.clone();
        let mut scratch = Block::ZERO;

        for chunk in table.chunks_exact_mut(WORDS_PER_BLOCK) {
            fill_block(&Block::ZERO, &chain, &mut scratch, None, false);
            fill_block(&Block::ZERO, &scratch, &mut chain, None, false);
            chunk.copy_from_slice(&chain.0);
        }

        chain.zeroize();
        scratch.zeroize();
        Self(table)
    }

    /// Run the substitution chain seeded from the pre-permutation state
    /// `r`. The low halves of the running value index the two table
    /// halves; the result is folded into the output block by the caller.
    pub(crate) fn mix(&self, r: &Block) -> u64 {
        let mut x = r.0[0] ^ r.0[WORDS_PER_BLOCK - 1];
        for _ in 0..MIX_ROUNDS {
            let hi = x >> 32;
            let lo = x & 0xFFFF_FFFF;
            let y = self.0[(hi & SBOX_MASK) as usize];
            let z = self.0[SBOX_SIZE / 2 + (lo & SBOX_MASK) as usize];
            x = hi.wrapping_mul(lo).wrapping_add(y) ^ z;
        }
        x
    }
}

impl Drop for SBox {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
