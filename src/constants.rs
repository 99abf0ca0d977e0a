//! Named numeric parameters that would otherwise be scattered magic numbers:
//! minimum key sizes, primality-test confidence, entropy draw length, and
//! the zero-knowledge proof domain separation tags and challenge width.

/// Below this many bits a Paillier/DJ modulus is rejected outright.
pub const MIN_MODULUS_BITS: u32 = 32;

/// Miller-Rabin rounds used for every primality test in the crate.
pub const PRIME_TEST_REPS: u32 = 25;

/// Default entropy draw size for seeding a `RandomSource`.
pub const RAND_SEED_BITS: u32 = 256;

/// Domain separation tags for the Fiat-Shamir hash used by the `n`-th-power
/// zero-knowledge proof subsystem.
pub const NTH_POWER_PROOF_TAG: u8 = 0x10;
pub const ONE_OF_TWO_PROOF_TAG_LEFT: u8 = 0x11;
pub const ONE_OF_TWO_PROOF_TAG_RIGHT: u8 = 0x12;

/// Bit length of the Fiat-Shamir challenge for the `n`-th-power proof and
/// its 1-of-2 composition. 256 bits of challenge gives a soundness error of
/// `2^-256` against a cheating prover.
pub const CHALLENGE_BITS: u32 = 256;
