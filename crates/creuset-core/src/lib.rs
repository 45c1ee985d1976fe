//! `creuset-core` — memory-hard password hashing and key derivation.
//!
//! A native implementation of the Argon2 family: a tunable amount of
//! memory (`m_cost` KiB), time (`t_cost` passes) and parallelism
//! (`p_cost` lanes) stands between a low-entropy secret and its derived
//! tag. Four variants cover the addressing trade-offs (data-dependent,
//! data-independent, hybrid, and the S-box-substituted "ds"), and both
//! the 0x10 and 0x13 algorithm versions are supported.
//!
//! ```
//! use creuset_core::{derive, Params};
//!
//! let params = Params::new(32, 2, 1, 32); // 32 KiB, 2 passes, 1 lane
//! let tag = derive(b"correct horse battery staple", b"16 bytes of salt", &params)?;
//! assert_eq!(tag.len(), 32);
//! # Ok::<(), creuset_core::KdfError>(())
//! ```
//!
//! Sensitive intermediates (pre-hash digest, lane seeds, the working
//! arena, address-generator state) are zeroised before release, and the
//! working memory is `mlock`'d on a best-effort basis. This crate stays
//! free of I/O, RNGs and encoded-hash parsing: salts, policy and storage
//! belong to the caller.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod kdf;
pub mod memory;
pub mod params;

mod address;
mod block;
mod fill;
mod hash;
mod index;
mod sbox;

pub use error::KdfError;
pub use fill::CancelToken;
pub use kdf::{compute, compute_cancellable, compute_into, derive, Inputs};
pub use memory::SecretBuffer;
pub use params::{Params, Variant, Version};
