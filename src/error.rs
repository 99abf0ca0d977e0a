//! The error taxonomy every fallible operation in this crate returns.
//!
//! No operation panics or aborts on a recoverable precondition failure;
//! each returns exactly one of these kinds. Allocation failures from the
//! big-integer backend are the only variant that can't be constructed
//! from pure Rust code in this crate (`rug` aborts the process on OOM,
//! same as GMP itself) but the variant is kept so callers can match on a
//! complete, closed set of failure kinds.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// `RandomSource` seed/reseed failed to read entropy.
    #[error("entropy source unavailable")]
    EntropyUnavailable,

    /// Requested modulus size is below the minimum (32 bits).
    #[error("requested key size is below the minimum of {} bits", crate::constants::MIN_MODULUS_BITS)]
    InvalidKeySize,

    /// The big-integer allocator returned nothing.
    #[error("big-integer allocation failed")]
    AllocationFailed,

    /// CRT inputs were not coprime, or a required modular inverse does not exist.
    #[error("inputs are not coprime / modular inverse does not exist")]
    InvalidModulus,

    /// Combining partial decryptions failed (a required inverse was absent).
    #[error("share combination failed")]
    ShareCombineFailed,

    /// A key verification check failed after import/reconstruction.
    #[error("key invariant violated")]
    InvariantViolation,

    /// Fewer than `w` non-zero shares were supplied to `share_combine`.
    #[error("quorum not met")]
    QuorumNotMet,

    /// A zero-knowledge proof failed to verify.
    #[error("zero-knowledge proof rejected")]
    InvalidProof,
}
