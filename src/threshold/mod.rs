//! Threshold Paillier: trusted-dealer key generation over safe primes,
//! polynomial share distribution, per-authority partial decryption,
//! Lagrange-based combination, and the `n`-th-power zero-knowledge proof
//! subsystem.
//!
//! This implements the Damgård–Jurik threshold scheme at base `s = 1`; the
//! public operations (`encrypt`, `ee_add`, `ep_add`, `ep_mul`, `reencrypt`)
//! are therefore identical in shape to plain Paillier's, just against a key
//! whose private half is split among authorities instead of held whole.

mod auth_server;
mod combine;
mod polynomial;
mod session;
mod zk;

pub use auth_server::{AuthServer, AuthorityMarker};
pub use session::{DecryptionSession, SessionState};
pub use zk::{prove, prove_one_of_two, verify, verify_one_of_two, NthPowerProof, OneOfTwoProof, Witness};

use rug::Integer;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::collections::{TypedUsize, VecMap};
use crate::constants::MIN_MODULUS_BITS;
use crate::error::{Error, Result};
use crate::number_util::{self, crt2, random_in_mult_group};
use crate::rand_source::RandomSource;

use polynomial::Polynomial;

/// The Feldman verification vector, indexed the same 0-based way the
/// external API presents authorities.
pub type VerificationVector = VecMap<AuthorityMarker, Integer>;

/// The base of the Feldman-style verification commitments
/// `vi[i] = v^{delta . s_i} mod n^2`, fixed to a cyclic generator of
/// squares (`2`). `rug::Integer` has no arbitrary-precision `const`
/// literal, so this is a function rather than a `const`.
pub(crate) fn verification_base() -> Integer {
    Integer::from(2)
}

/// `{n, g = n+1, n^2, delta = l!, w, l}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPublicKey {
    n: Integer,
    g: Integer,
    nn: Integer,
    delta: Integer,
    w: usize,
    l: usize,
}

impl ThresholdPublicKey {
    pub fn n(&self) -> &Integer {
        &self.n
    }
    pub fn g(&self) -> &Integer {
        &self.g
    }
    pub fn nn(&self) -> &Integer {
        &self.nn
    }
    pub fn delta(&self) -> &Integer {
        &self.delta
    }
    pub fn w(&self) -> usize {
        self.w
    }
    pub fn l(&self) -> usize {
        self.l
    }

    pub fn validate_plaintext(&self, m: &Integer) -> bool {
        number_util::member_of_mod(m, &self.n)
    }

    pub fn validate_ciphertext(&self, c: &Integer) -> bool {
        number_util::member_of_mul_group(c, &self.nn)
    }

    /// Checks `g = n + 1`, `n^2 = n * n`, and `delta = l!`.
    pub fn verify(&self) -> Result<()> {
        if self.g != Integer::from(&self.n + 1) || self.nn != Integer::from(&self.n * &self.n) {
            error!("threshold public key invariant violated: g/n^2 mismatch");
            return Err(Error::InvariantViolation);
        }
        if self.delta != Integer::from(Integer::factorial(self.l as u32)) {
            error!("threshold public key invariant violated: delta != l!");
            return Err(Error::InvariantViolation);
        }
        Ok(())
    }
}

/// Dealer-only, ephemeral. Destroyed by
/// [`ThresholdPrivateKey::deal`], which consumes it by value - reuse after
/// dealing is a compile-time error, since the value is gone and the type
/// system has no way to hand back an already-dealt dealer state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPrivateKey {
    n: Integer,
    nn: Integer,
    d: Integer,
    nm: Integer,
    l: usize,
    w: usize,
}

impl zeroize::Zeroize for ThresholdPrivateKey {
    fn zeroize(&mut self) {
        number_util::zeroize(&mut self.n);
        number_util::zeroize(&mut self.nn);
        number_util::zeroize(&mut self.d);
        number_util::zeroize(&mut self.nm);
    }
}

impl Drop for ThresholdPrivateKey {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(self);
    }
}

impl ThresholdPrivateKey {
    /// Construct the dealer's polynomial, evaluate it once per authority,
    /// compute the Feldman verification vector, and consume `self`, since
    /// the dealer has no further use for the private key material after
    /// this call.
    pub fn deal(
        self,
        r: &mut RandomSource,
        pk: &ThresholdPublicKey,
    ) -> (Vec<AuthServer>, VerificationVector) {
        let poly = Polynomial::sample(r, &self.d, &self.nm, self.w);
        let v = verification_base();

        let mut servers = Vec::with_capacity(self.l);
        let mut vi = Vec::with_capacity(self.l);
        for i in 1..=self.l {
            let si = poly.evaluate(i as u64, &self.nm);
            let exponent = Integer::from(&pk.delta * &si);
            let vi_i = v
                .clone()
                .pow_mod(&exponent, &pk.nn)
                .expect("exponent and modulus well-formed");
            servers.push(AuthServer::new(i, si));
            vi.push(vi_i);
        }
        (servers, VerificationVector::from_vec(vi))
        // `self` and `poly` both drop (and zeroize) here.
    }
}

/// Draw distinct safe primes `p = 2p'+1`, `q = 2q'+1`, set `m = p'q'`,
/// `n = pq`, `g = n+1`, `delta = l!`, and `d` satisfying `d == 1 mod n`,
/// `d == 0 mod m` via `crt2`. Validates
/// `1 <= w <= l`, tightened to `ceil(l/2) <= w <= l` when the
/// `strict-quorum` feature is enabled.
pub fn generate_key_pair(
    r: &mut RandomSource,
    bits: u32,
    w: usize,
    l: usize,
) -> Result<(ThresholdPublicKey, ThresholdPrivateKey)> {
    if bits < MIN_MODULUS_BITS {
        return Err(Error::InvalidKeySize);
    }
    if w == 0 || w > l {
        return Err(Error::InvalidKeySize);
    }
    #[cfg(feature = "strict-quorum")]
    if w < l.div_ceil(2) {
        return Err(Error::InvalidKeySize);
    }

    let half_bits = bits.div_ceil(2) + 1;
    let ((p, p_prime), (q, q_prime)) = loop {
        let (p, p_prime) = number_util::random_safe_prime(r, half_bits);
        let (q, q_prime) = number_util::random_safe_prime(r, half_bits);
        if p != q {
            break ((p, p_prime), (q, q_prime));
        }
    };

    let n = Integer::from(&p * &q);
    let nn = Integer::from(&n * &n);
    let m = Integer::from(&p_prime * &q_prime);

    let d = crt2(&Integer::from(1), &n, &Integer::from(0), &m)?;
    let nm = Integer::from(&n * &m);
    let g = Integer::from(&n + 1);
    let delta = Integer::from(Integer::factorial(l as u32));

    let pk = ThresholdPublicKey {
        n: n.clone(),
        g,
        nn: nn.clone(),
        delta,
        w,
        l,
    };
    let vk = ThresholdPrivateKey { n, nn, d, nm, l, w };
    Ok((pk, vk))
}

/// Same formula as plain Paillier's `encrypt`.
pub fn encrypt(pk: &ThresholdPublicKey, r: &mut RandomSource, m: &Integer) -> (Integer, Integer) {
    let u = random_in_mult_group(r, &pk.n);
    (encrypt_r(pk, m, &u), u)
}

pub fn encrypt_r(pk: &ThresholdPublicKey, m: &Integer, u: &Integer) -> Integer {
    let a = pk.g.clone().pow_mod(m, &pk.nn).expect("g coprime to n^2");
    let b = u.clone().pow_mod(&pk.n, &pk.nn).expect("u coprime to n^2");
    Integer::from(a * b).rem_euc(pk.nn.clone())
}

pub fn ep_add(pk: &ThresholdPublicKey, c: &Integer, m: &Integer) -> Integer {
    let gm = pk.g.clone().pow_mod(m, &pk.nn).expect("g coprime to n^2");
    Integer::from(c * gm).rem_euc(pk.nn.clone())
}

pub fn ee_add(pk: &ThresholdPublicKey, c1: &Integer, c2: &Integer) -> Integer {
    Integer::from(c1 * c2).rem_euc(pk.nn.clone())
}

pub fn ep_mul(pk: &ThresholdPublicKey, c: &Integer, m: &Integer) -> Integer {
    c.clone().pow_mod(m, &pk.nn).expect("c coprime to n^2")
}

pub fn reencrypt(pk: &ThresholdPublicKey, r: &mut RandomSource, c: &Integer) -> Integer {
    let u = random_in_mult_group(r, &pk.n);
    let un = u.pow_mod(&pk.n, &pk.nn).expect("u coprime to n^2");
    Integer::from(c * un).rem_euc(pk.nn.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dealt_servers(bits: u32, w: usize, l: usize, seed: u64) -> (ThresholdPublicKey, Vec<AuthServer>) {
        let mut r = RandomSource::new_with_seed(seed);
        let (pk, vk) = generate_key_pair(&mut r, bits, w, l).unwrap();
        let (servers, _vi) = vk.deal(&mut r, &pk);
        (pk, servers)
    }

    #[test]
    fn generate_key_pair_rejects_invalid_quorum() {
        let mut r = RandomSource::new_with_seed(0);
        assert_eq!(
            generate_key_pair(&mut r, 64, 0, 5).unwrap_err(),
            Error::InvalidKeySize
        );
        assert_eq!(
            generate_key_pair(&mut r, 64, 6, 5).unwrap_err(),
            Error::InvalidKeySize
        );
    }

    #[test]
    fn public_key_verify_detects_tampering() {
        let (mut pk, _) = dealt_servers(64, 1, 3, 0);
        pk.delta += 1;
        assert_eq!(pk.verify().unwrap_err(), Error::InvariantViolation);
    }

    #[test]
    fn auth_server_share_verifies_against_verification_vector() {
        let mut r = RandomSource::new_with_seed(1);
        let (pk, vk) = generate_key_pair(&mut r, 64, 2, 4).unwrap();
        let (servers, vi) = vk.deal(&mut r, &pk);
        for server in &servers {
            assert!(server.verify_share(&pk, &vi));
        }
    }

    #[test]
    fn tampered_share_fails_verification() {
        let mut r = RandomSource::new_with_seed(2);
        let (pk, vk) = generate_key_pair(&mut r, 64, 2, 4).unwrap();
        let (servers, vi) = vk.deal(&mut r, &pk);
        let mut bad = vi.clone();
        *bad.get_mut(TypedUsize::from_usize(0)).unwrap() += 1;
        assert!(!servers[0].verify_share(&pk, &bad));
    }

    #[test]
    fn concrete_scenario_3_of_5_quorum() {
        use crate::capability::Threshold as _;
        let (pk, servers) = dealt_servers(512, 3, 5, 0);
        let mut r = RandomSource::new_with_seed(1);
        let (c, _u) = encrypt(&pk, &mut r, &Integer::from(10));

        let partials: Vec<(usize, Integer)> = servers
            .iter()
            .map(|s| (s.external_index(), s.share_decrypt(&pk, &c)))
            .collect();

        let combos: [&[usize]; 4] = [&[0, 1, 2], &[1, 2, 4], &[0, 1, 2, 3, 4], &[1, 2, 3, 4]];
        for combo in combos {
            let subset: Vec<(usize, Integer)> = partials
                .iter()
                .filter(|(i, _)| combo.contains(i))
                .cloned()
                .collect();
            let m = combine::share_combine(&pk, &subset).unwrap();
            assert_eq!(m, Integer::from(10));
        }

        let short: Vec<(usize, Integer)> = partials
            .iter()
            .filter(|(i, _)| [0usize, 1].contains(i))
            .cloned()
            .collect();
        assert_eq!(
            combine::share_combine(&pk, &short).unwrap_err(),
            Error::QuorumNotMet
        );
    }

    #[test]
    fn concrete_scenario_single_authority_quorum() {
        use crate::capability::Threshold as _;
        let (pk, servers) = dealt_servers(16, 1, 3, 0);
        let mut r = RandomSource::new_with_seed(1);
        let (c, _u) = encrypt(&pk, &mut r, &Integer::from(10));

        for server in &servers {
            let share = server.share_decrypt(&pk, &c);
            let m = combine::share_combine(&pk, &[(server.external_index(), share)]).unwrap();
            assert_eq!(m, Integer::from(10));
        }
    }

    #[test]
    fn different_subsets_agree() {
        use crate::capability::Threshold as _;
        let (pk, servers) = dealt_servers(64, 3, 6, 7);
        let mut r = RandomSource::new_with_seed(8);
        let (c, _u) = encrypt(&pk, &mut r, &Integer::from(4242));

        let partials: Vec<(usize, Integer)> = servers
            .iter()
            .map(|s| (s.external_index(), s.share_decrypt(&pk, &c)))
            .collect();

        let m1 = combine::share_combine(&pk, &partials[0..3]).unwrap();
        let m2 = combine::share_combine(&pk, &partials[3..6]).unwrap();
        assert_eq!(m1, m2);
        assert_eq!(m1, Integer::from(4242));
    }

    #[test]
    fn homomorphic_addition_then_threshold_decrypt() {
        use crate::capability::Threshold as _;
        let (pk, servers) = dealt_servers(64, 2, 3, 9);
        let mut r = RandomSource::new_with_seed(10);
        let (c1, _) = encrypt(&pk, &mut r, &Integer::from(11));
        let (c2, _) = encrypt(&pk, &mut r, &Integer::from(22));
        let sum = ee_add(&pk, &c1, &c2);

        let partials: Vec<(usize, Integer)> = servers
            .iter()
            .take(2)
            .map(|s| (s.external_index(), s.share_decrypt(&pk, &sum)))
            .collect();
        let m = combine::share_combine(&pk, &partials).unwrap();
        assert_eq!(m, Integer::from(33));
    }
}
