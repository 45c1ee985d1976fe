//! RFC 9106 §5.2 — Argon2i version 0x13 reference vector.

use super::{rfc_inputs, rfc_params};
use creuset_core::{compute, Variant};
use hex_literal::hex;

const EXPECTED: [u8; 32] = hex!(
    "c8 14 d9 d1 dc 7f 37 aa
     13 f0 d7 7f 24 94 bd a1
     c8 de 6b 01 6d d3 88 d2
     99 52 a4 c4 67 2b 6c e8"
);

#[test]
fn rfc9106_section_5_2_argon2i() {
    let mut params = rfc_params();
    params.variant = Variant::Argon2i;

    let tag = compute(&rfc_inputs(), &params).expect("compute should succeed");
    assert_eq!(tag.expose(), EXPECTED, "RFC 9106 §5.2 Argon2i KAT mismatch");
}
