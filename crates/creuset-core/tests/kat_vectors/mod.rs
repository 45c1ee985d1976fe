pub mod argon2d;
pub mod argon2ds;
pub mod argon2i;
pub mod argon2id;

use creuset_core::{Inputs, Params};

/// RFC 9106 §5 common inputs: 32×01 password, 16×02 salt, 8×03 secret,
/// 12×04 associated data.
pub const PASSWORD: [u8; 32] = [0x01; 32];
pub const SALT: [u8; 16] = [0x02; 16];
pub const SECRET: [u8; 8] = [0x03; 8];
pub const ASSOCIATED_DATA: [u8; 12] = [0x04; 12];

/// The vector inputs.
#[must_use]
pub fn rfc_inputs() -> Inputs<'static> {
    Inputs {
        password: &PASSWORD,
        salt: &SALT,
        secret: &SECRET,
        associated_data: &ASSOCIATED_DATA,
    }
}

/// The vector cost parameters: 32 KiB, 3 passes, 4 lanes, 32-byte tag.
#[must_use]
pub fn rfc_params() -> Params {
    Params::new(32, 3, 4, 32)
}
