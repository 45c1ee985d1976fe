//! The external variable-length hash H.
//!
//! The engine consumes BLAKE2b as a black box: a 64-byte digest for the
//! pre-hash, and the standard long-output construction for seed expansion
//! and tag extraction. Everything here is an I/O boundary, so all encoding
//! is little-endian.

use crate::error::KdfError;
use blake2::digest::{Update, VariableOutput};
use blake2::{Blake2b512, Blake2bVar, Digest};

/// Digest length of one underlying hash call.
pub(crate) const DIGEST_LEN: usize = 64;

/// Hash `chunks` into exactly 64 bytes.
pub(crate) fn blake2b(chunks: &[&[u8]]) -> [u8; DIGEST_LEN] {
    let mut state = Blake2b512::new();
    for chunk in chunks {
        Digest::update(&mut state, chunk);
    }
    state.finalize().into()
}

/// Variable-length hash H'(out_len, input): `out` is filled with
/// `H(le32(|out|) ‖ input)` when it fits a single digest, otherwise with
/// the chained long-output construction that carries 32 bytes of each
/// 64-byte link forward.
///
/// # Errors
///
/// Returns [`KdfError::TagLength`] if `out` is empty (the construction is
/// undefined for zero-length output). Callers enforce the 4-byte tag
/// minimum before reaching this point.
pub(crate) fn blake2b_long(out: &mut [u8], input: &[&[u8]]) -> Result<(), KdfError> {
    let out_len_le = (out.len() as u32).to_le_bytes();

    if out.len() <= DIGEST_LEN {
        let mut state = Blake2bVar::new(out.len()).map_err(|_| KdfError::TagLength)?;
        Update::update(&mut state, &out_len_le);
        for chunk in input {
            Update::update(&mut state, chunk);
        }
        state
            .finalize_variable(out)
            .map_err(|_| KdfError::TagLength)?;
        return Ok(());
    }

    let mut state = Blake2b512::new();
    Digest::update(&mut state, out_len_le);
    for chunk in input {
        Digest::update(&mut state, chunk);
    }
    let mut link: [u8; DIGEST_LEN] = state.finalize().into();
    out[..32].copy_from_slice(&link[..32]);

    let mut written = 32;
    while out.len() - written > DIGEST_LEN {
        link = blake2b(&[&link]);
        out[written..written + 32].copy_from_slice(&link[..32]);
        written += 32;
    }

    // Final link: 33..=64 bytes, emitted whole.
    let tail = out.len() - written;
    let mut state = Blake2bVar::new(tail).map_err(|_| KdfError::TagLength)?;
    Update::update(&mut state, &link);
    state
        .finalize_variable(&mut out[written..])
        .map_err(|_| KdfError::TagLength)?;
    Ok(())
}
