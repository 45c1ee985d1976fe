//! Pseudo-random address stream for data-independent segments.
//!
//! The generator feeds a counter block through two applications of the
//! compression function (`G(0, G(0, Z))`) and hands out its 128 words as
//! J-values; the counter advances when a block is exhausted. The input
//! block binds the stream to the position and the cost parameters, so no
//! secret data influences addressing.

use crate::block::{fill_block, Block, WORDS_PER_BLOCK};
use crate::params::{Geometry, Variant};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Streaming source of 64-bit J-values for one segment fill.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct AddressGenerator {
    input: Block,
    addresses: Block,
    next: usize,
}

impl AddressGenerator {
    /// Build the generator for the segment at `(pass, lane, slice)` and
    /// position the stream at `starting_index` (2 for the seed-block
    /// segment, 0 otherwise).
    pub(crate) fn new(
        geo: &Geometry,
        t_cost: u32,
        variant: Variant,
        pass: u32,
        lane: u32,
        slice: u32,
        starting_index: u32,
    ) -> Self {
        let mut input = Block::ZERO;
        input.0[0] = u64::from(pass);
        input.0[1] = u64::from(lane);
        input.0[2] = u64::from(slice);
        input.0[3] = u64::from(geo.block_count);
        input.0[4] = u64::from(t_cost);
        input.0[5] = u64::from(variant.tag());
        // Word 6 is the counter; advance() increments it before each
        // block, so the first address block uses counter 1.

        let mut generator = Self {
            input,
            addresses: Block::ZERO,
            next: starting_index as usize,
        };
        generator.advance();
        generator
    }

    /// Produce the next J-value, regenerating the address block when the
    /// current one is exhausted.
    pub(crate) fn next_j(&mut self) -> u64 {
        if self.next == WORDS_PER_BLOCK {
            self.advance();
            self.next = 0;
        }
        let j = self.addresses.0[self.next];
        self.next += 1;
        j
    }

    fn advance(&mut self) {
        self.input.0[6] = self.input.0[6].wrapping_add(1);
        let mut once = Block::ZERO;
        fill_block(&Block::ZERO, &self.input, &mut once, None, false);
        fill_block(&Block::ZERO, &once, &mut self.addresses, None, false);
        once.zeroize();
    }
}
