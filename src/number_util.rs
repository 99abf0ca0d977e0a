//! Pure numeric helpers used by every scheme.
//! No state of its own; everything here borrows a `RandomSource` for the
//! operations that need randomness.

use rug::integer::IsPrime;
use rug::Integer;
use tracing::error;

use crate::constants::PRIME_TEST_REPS;
use crate::error::{Error, Result};
use crate::rand_source::{random_below, random_bits, RandomSource};

/// A prime of *at least* `bits` bits: draw a uniform `bits`-bit value, set
/// the top bit, then advance to the next prime via a Miller-Rabin backed
/// search.
pub fn random_prime(r: &mut RandomSource, bits: u32) -> Integer {
    r.with_rand_state(|rand| {
        let mut candidate = random_bits(rand, bits);
        candidate.set_bit(bits - 1, true);
        candidate.next_prime_mut();
        candidate
    })
}

/// A safe prime pair `(p, p')` with `p = 2p' + 1`, both prime. Loops
/// `random_prime` for `p`, testing `p' = (p - 1) / 2` at the standard
/// confidence; rejects and retries when `p'` is composite.
pub fn random_safe_prime(r: &mut RandomSource, bits: u32) -> (Integer, Integer) {
    loop {
        let p = random_prime(r, bits);
        let p_prime = Integer::from(&p - 1) >> 1;

        if matches!(p_prime.is_probably_prime(PRIME_TEST_REPS), IsPrime::No) {
            continue;
        }

        return (p, p_prime);
    }
}

/// A uniform element of `Z*_m`: sample uniformly in `[0, m)`, accept iff
/// `gcd(·, m) = 1`, reject and resample otherwise. Expected constant-factor
/// iterations for `m = n = pq`.
pub fn random_in_mult_group(r: &mut RandomSource, m: &Integer) -> Integer {
    r.with_rand_state(|rand| loop {
        let candidate = random_below(rand, m);
        if candidate.clone().gcd(m) == 1 {
            return candidate;
        }
    })
}

/// The unique solution in `[0, m1 * m2)` to `x = a1 mod m1, x = a2 mod m2`,
/// via Bezout's identity. Requires `gcd(m1, m2) = 1`.
pub fn crt2(a1: &Integer, m1: &Integer, a2: &Integer, m2: &Integer) -> Result<Integer> {
    let (gcd, u, _v) = m1.clone().extended_gcd(m2.clone(), Integer::new());
    if gcd != 1 {
        error!("crt2: moduli {} and {} are not coprime", m1, m2);
        return Err(Error::InvalidModulus);
    }

    // x = a1 + m1 * u * (a2 - a1) mod (m1 * m2), where u = m1^-1 mod m2
    let modulus = Integer::from(m1 * m2);
    let diff = Integer::from(a2 - a1);
    let x = Integer::from(a1 + Integer::from(m1 * &u) * diff).rem_euc(&modulus);

    Ok(x)
}

/// Overwrite the numeric storage of `x` with zeros and drop it.
///
/// `rug::Integer` is a thin wrapper over a GMP `mpz_t`: its limbs live in a
/// GMP-managed heap allocation the `zeroize` crate can't see through a plain
/// `Zeroize` impl. We reach into that allocation through rug's FFI escape
/// hatch and overwrite every limb with a volatile write, then let GMP's
/// allocator reclaim a now-zeroed buffer. GMP grows `_mp_alloc` on demand but
/// never shrinks it back down when a value gets smaller, so wiping only
/// `_mp_size` limbs (the in-use magnitude) can leave older, larger secret
/// values resident in the tail of the allocation, so this wipes the full
/// `alloc`-sized buffer rather than just the in-use magnitude.
pub fn zeroize(x: &mut Integer) {
    unsafe {
        let raw = x.as_raw_mut();
        let alloc = (*raw).alloc as usize;
        let limbs = (*raw).d.as_ptr();
        for i in 0..alloc {
            std::ptr::write_volatile(limbs.add(i), 0);
        }
        (*raw).size = 0;
    }
    std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
    *x = Integer::new();
}

/// `true` iff `0 <= x < m`.
pub fn member_of_mod(x: &Integer, m: &Integer) -> bool {
    *x >= 0 && x < m
}

/// `true` iff `x` is a member of `Z*_m` (i.e. `0 <= x < m` and `gcd(x, m) = 1`).
pub fn member_of_mul_group(x: &Integer, m: &Integer) -> bool {
    member_of_mod(x, m) && x.clone().gcd(m) == 1
}

/// `L_p(u) = (u - 1) / p`, the Paillier/DJ decryption helper. Integer
/// division is exact by construction whenever `u` is a valid Paillier
/// ciphertext raised to the right power.
pub fn paillier_l(u: &Integer, p: &Integer) -> Integer {
    Integer::from(u - 1) / p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_prime_has_requested_bit_length() {
        let mut r = RandomSource::new_with_seed(1);
        let p = random_prime(&mut r, 64);
        assert!(p.significant_bits() >= 64);
        assert_ne!(p.is_probably_prime(PRIME_TEST_REPS), IsPrime::No);
    }

    #[test]
    fn random_safe_prime_pair_is_consistent() {
        let mut r = RandomSource::new_with_seed(2);
        let (p, p_prime) = random_safe_prime(&mut r, 64);
        assert_eq!(Integer::from(&p_prime * 2) + 1, p);
        assert_ne!(p.is_probably_prime(PRIME_TEST_REPS), IsPrime::No);
        assert_ne!(p_prime.is_probably_prime(PRIME_TEST_REPS), IsPrime::No);
    }

    #[test]
    fn crt2_round_trips_small_values() {
        let x = crt2(
            &Integer::from(2),
            &Integer::from(3),
            &Integer::from(3),
            &Integer::from(5),
        )
        .unwrap();
        assert_eq!(x, Integer::from(23));
        assert_eq!(Integer::from(&x % 3), 2);
        assert_eq!(Integer::from(&x % 5), 3);
    }

    #[test]
    fn crt2_rejects_non_coprime_moduli() {
        let err = crt2(
            &Integer::from(1),
            &Integer::from(4),
            &Integer::from(1),
            &Integer::from(6),
        )
        .unwrap_err();
        assert_eq!(err, Error::InvalidModulus);
    }

    #[test]
    fn random_in_mult_group_is_coprime() {
        let mut r = RandomSource::new_with_seed(3);
        let m = Integer::from(97 * 89);
        for _ in 0..20 {
            let x = random_in_mult_group(&mut r, &m);
            assert_eq!(x.clone().gcd(&m), 1);
        }
    }
}
