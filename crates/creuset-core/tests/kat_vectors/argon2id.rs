//! RFC 9106 §5.3 — Argon2id version 0x13 reference vector.

use super::{rfc_inputs, rfc_params};
use creuset_core::{compute, compute_into, Variant};
use hex_literal::hex;

const EXPECTED: [u8; 32] = hex!(
    "0d 64 0d f5 8d 78 76 6c
     08 c0 37 a3 4a 8b 53 c9
     d0 1e f0 45 2d 75 b6 5e
     b5 25 20 e9 6b 01 e6 59"
);

#[test]
fn rfc9106_section_5_3_argon2id() {
    let mut params = rfc_params();
    params.variant = Variant::Argon2id;

    let tag = compute(&rfc_inputs(), &params).expect("compute should succeed");
    assert_eq!(tag.expose(), EXPECTED, "RFC 9106 §5.3 Argon2id KAT mismatch");
}

#[test]
fn argon2id_vector_is_worker_count_invariant() {
    let mut params = rfc_params();
    params.variant = Variant::Argon2id;

    for threads in [1u32, 4] {
        params.threads = threads;
        let mut out = [0u8; 32];
        compute_into(&rfc_inputs(), &params, &mut out).expect("compute should succeed");
        assert_eq!(out, EXPECTED, "tag must not depend on worker count");
    }
}

#[test]
fn variants_disagree_on_identical_inputs() {
    let inputs = rfc_inputs();
    let mut tags = Vec::new();
    for variant in [
        Variant::Argon2d,
        Variant::Argon2i,
        Variant::Argon2id,
        Variant::Argon2ds,
    ] {
        let mut params = rfc_params();
        params.variant = variant;
        tags.push(compute(&inputs, &params).expect("compute should succeed"));
    }
    for i in 0..tags.len() {
        for j in i + 1..tags.len() {
            assert_ne!(tags[i].expose(), tags[j].expose());
        }
    }
}
