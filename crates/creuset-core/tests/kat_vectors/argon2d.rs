//! RFC 9106 §5.1 — Argon2d version 0x13 reference vector.

use super::{rfc_inputs, rfc_params};
use creuset_core::{compute, compute_into, Variant};
use hex_literal::hex;

const EXPECTED: [u8; 32] = hex!(
    "51 2b 39 1b 6f 11 62 97
     53 71 d3 09 19 73 42 94
     f8 68 e3 be 39 84 f3 c1
     a1 3a 4d b9 fa be 4a cb"
);

#[test]
fn rfc9106_section_5_1_argon2d() {
    let mut params = rfc_params();
    params.variant = Variant::Argon2d;

    let tag = compute(&rfc_inputs(), &params).expect("compute should succeed");
    assert_eq!(tag.expose(), EXPECTED, "RFC 9106 §5.1 Argon2d KAT mismatch");
}

#[test]
fn argon2d_vector_is_worker_count_invariant() {
    let mut params = rfc_params();
    params.variant = Variant::Argon2d;

    for threads in [1u32, 2, 4, 5] {
        params.threads = threads;
        let mut out = [0u8; 32];
        compute_into(&rfc_inputs(), &params, &mut out).expect("compute should succeed");
        assert_eq!(out, EXPECTED, "tag must not depend on worker count");
    }
}
