//! Error types for `creuset-core`.

use thiserror::Error;

/// Errors produced by key derivation.
///
/// Every rejectable input has its own variant so callers can report the
/// offending parameter precisely. Validation errors are returned before any
/// working memory is allocated.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum KdfError {
    /// Number of passes must be at least 1.
    #[error("number of passes out of range (minimum 1)")]
    Passes,

    /// Memory cost must be at least 8 blocks per lane.
    #[error("memory cost out of range (minimum 8 blocks per lane)")]
    MemoryCost,

    /// Lane count must be between 1 and 2^24 − 1. Also reported when the
    /// worker-thread count exceeds the same bound.
    #[error("degree of parallelism out of range (1..=16777215)")]
    Parallelism,

    /// Tag length must be at least 4 bytes; `compute_into` additionally
    /// requires the output buffer to match the configured tag length.
    #[error("tag length out of range (minimum 4 bytes)")]
    TagLength,

    /// Salt must be between 8 and 2^32 − 1 bytes.
    #[error("salt length out of range (8..=4294967295 bytes)")]
    SaltLength,

    /// Password longer than 2^32 − 1 bytes.
    #[error("password length out of range")]
    PasswordLength,

    /// Secret value longer than 2^32 − 1 bytes.
    #[error("secret length out of range")]
    SecretLength,

    /// Associated data longer than 2^32 − 1 bytes.
    #[error("associated data length out of range")]
    AssociatedDataLength,

    /// Numeric variant tag does not name a supported variant.
    #[error("unknown variant tag")]
    UnknownVariant,

    /// Numeric version tag does not name a supported version.
    #[error("unknown version tag")]
    UnknownVersion,

    /// The working memory could not be allocated. No partial state remains.
    #[error("working memory allocation failed")]
    AllocationFailed,

    /// The computation was cancelled at a slice boundary. The working
    /// memory has been zeroised.
    #[error("computation cancelled")]
    Cancelled,
}
