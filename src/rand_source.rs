//! A deterministic PRNG seeded from an entropy source.
//!
//! The contract is uniform output, not cryptographic unpredictability of
//! the PRNG itself, its seed does the lifting. Entropic material is
//! hashed through `SimpleHmac<Sha256>` and the digest fed to
//! `ChaCha20Rng::from_seed`, zeroizing the intermediate buffer immediately
//! afterwards.

use hmac::{Mac, SimpleHmac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rug::{rand::RandState, Integer};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::constants::RAND_SEED_BITS;
use crate::error::{Error, Result};

/// A platform-abstract source of secure random bytes. The default implementation reads from the OS CSPRNG
/// via `rand::rngs::OsRng`; tests substitute a fixed byte source.
pub trait EntropySource {
    fn read_secure_bytes(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// The OS-backed entropy source used outside of tests.
#[derive(Debug, Default)]
pub struct OsEntropySource;

impl EntropySource for OsEntropySource {
    fn read_secure_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        rand::rngs::OsRng
            .try_fill_bytes(buf)
            .map_err(|_| Error::EntropyUnavailable)
    }
}

/// Owns a mutable PRNG state. Exclusively mutated by any operation that
/// draws randomness; a `RandomSource` must not be shared mutably across
/// concurrent operations.
pub struct RandomSource {
    prng: ChaCha20Rng,
}

impl RandomSource {
    /// Seed a fresh `RandomSource` by reading `HCS_RAND_SEED_BITS` bits from
    /// the platform entropy source.
    pub fn new() -> Result<Self> {
        Self::new_with_source(&mut OsEntropySource)
    }

    /// Seed from an explicit [`EntropySource`] (used to unit test
    /// `EntropyUnavailable` behavior with a source that always fails).
    pub fn new_with_source(source: &mut impl EntropySource) -> Result<Self> {
        let mut entropy = vec![0u8; (RAND_SEED_BITS / 8) as usize];
        source.read_secure_bytes(&mut entropy)?;

        let seed = Self::derive_seed(&entropy);
        entropy.zeroize();

        Ok(Self {
            prng: ChaCha20Rng::from_seed(seed),
        })
    }

    /// Seed from a fixed value. Test-only: the whole point of `RandomSource`
    /// is unpredictability, which a fixed seed forfeits.
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            prng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Re-pull entropy and reseed the underlying PRNG in place.
    pub fn reseed(&mut self) -> Result<()> {
        *self = Self::new()?;
        Ok(())
    }

    /// Re-pull entropy from an explicit source and reseed in place.
    pub fn reseed_with_source(&mut self, source: &mut impl EntropySource) -> Result<()> {
        *self = Self::new_with_source(source)?;
        Ok(())
    }

    /// Accessor used by lower-level numeric operations (`number_util`,
    /// `rug::rand::RandState`'s `ThreadRandGen` bridge).
    pub fn raw(&mut self) -> &mut impl (RngCore) {
        &mut self.prng
    }

    /// Run `f` with a `rug::rand::RandState` bridged onto this source's
    /// PRNG, used by every `rug`-level draw (`random_bits`, `random_below`)
    /// in `number_util`. Scoped rather than returned because `RandState`
    /// borrows its generator for a lifetime that a method can't name
    /// without leaking the generator.
    pub fn with_rand_state<T>(&mut self, f: impl FnOnce(&mut RandState<'_>) -> T) -> T {
        let mut gen = RngCoreGen { rng: &mut self.prng };
        let mut rand = RandState::new_custom(&mut gen);
        f(&mut rand)
    }

    fn derive_seed(entropy: &[u8]) -> [u8; 32] {
        let mut prf = SimpleHmac::<Sha256>::new_from_slice(entropy)
            .expect("HMAC accepts keys of any length");
        prf.update(b"hcs-random-source-seed");
        prf.finalize().into_bytes().into()
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSource").finish_non_exhaustive()
    }
}

/// Bridges a `rand::RngCore` into a `rug::rand::RandState` via rug's custom
/// generator trait, so the Shamir polynomial, prime search and Paillier
/// encryption randomness all route through the same owned PRNG rather than
/// re-seeding from the OS on every draw.
struct RngCoreGen<'a> {
    rng: &'a mut ChaCha20Rng,
}

impl<'a> rug::rand::ThreadRandGen for RngCoreGen<'a> {
    fn gen(&mut self) -> u32 {
        self.rng.next_u32()
    }
}

/// Draw a uniform integer in `[0, bound)`.
pub(crate) fn random_below(rand: &mut RandState<'_>, bound: &Integer) -> Integer {
    Integer::from(bound.random_below_ref(rand))
}

/// Draw a uniform integer with exactly `bits` significant bits set at most
/// (setting the top bit, if wanted, is the caller's responsibility).
pub(crate) fn random_bits(rand: &mut RandState<'_>, bits: u32) -> Integer {
    Integer::from(Integer::random_bits(bits, rand))
}
