//! The Damgård–Jurik generalization of Paillier. Ciphertexts live in
//! `Z*_{n^(s+1)}` for an implementation-chosen `s >= 1`; `s = 1` recovers
//! plain Paillier.
//!
//! `dlog_s` below is the recursive discrete-log recovery procedure,
//! generalized to arbitrary `s` (the `threshold` module elsewhere in this
//! crate hard-codes `s = 1` and inlines the simpler single-step form of
//! the same formula).

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::capability::AdditivelyHomomorphic;
use crate::constants::MIN_MODULUS_BITS;
use crate::error::{Error, Result};
use crate::number_util::{self, random_in_mult_group};
use crate::rand_source::RandomSource;
use rug::Integer;

/// `{n[0..s], g = n+1, s}` with `n[i] = n[0]^(i+1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DjPublicKey {
    n: Vec<Integer>,
    g: Integer,
    s: usize,
}

impl DjPublicKey {
    /// The base modulus `n = n[0]`.
    pub fn n(&self) -> &Integer {
        &self.n[0]
    }
    pub fn g(&self) -> &Integer {
        &self.g
    }
    /// The ciphertext-space modulus `n^(s+1) = n[s]`.
    pub fn ciphertext_modulus(&self) -> &Integer {
        &self.n[self.s]
    }
    pub fn s(&self) -> usize {
        self.s
    }

    /// `s = 1` is the base case Damgård–Jurik collapses to: plain Paillier
    /// over `Z*_{n^2}`. A thin constructor alias over [`generate_key_pair`]
    /// with `s` pinned to `1`.
    pub fn paillier_compatible(
        r: &mut RandomSource,
        bits: u32,
    ) -> Result<(DjPublicKey, DjPrivateKey)> {
        generate_key_pair(r, bits, 1)
    }

    /// `true` iff `0 <= m < n^s` (the plaintext space grows with `s`).
    pub fn validate_plaintext(&self, m: &Integer) -> bool {
        number_util::member_of_mod(m, &self.n[self.s - 1])
    }

    /// `true` iff `c` is a member of `Z*_{n^(s+1)}`.
    pub fn validate_ciphertext(&self, c: &Integer) -> bool {
        number_util::member_of_mul_group(c, self.ciphertext_modulus())
    }

    /// Checks `n[i] = n[0]^(i+1)` for every `i` and `g = n + 1`.
    pub fn verify(&self) -> Result<()> {
        if self.g != Integer::from(&self.n[0] + 1) {
            error!("dj public key invariant violated: g != n + 1");
            return Err(Error::InvariantViolation);
        }
        let mut power = self.n[0].clone();
        for (i, ni) in self.n.iter().enumerate() {
            if i == 0 {
                continue;
            }
            power = Integer::from(&power * &self.n[0]);
            if *ni != power {
                error!("dj public key invariant violated: n[{}] != n[0]^{}", i, i + 1);
                return Err(Error::InvariantViolation);
            }
        }
        Ok(())
    }
}

/// `{n[0..s], s, d, mu}`. Zeroized on drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DjPrivateKey {
    n: Vec<Integer>,
    s: usize,
    d: Integer,
    mu: Integer,
}

impl zeroize::Zeroize for DjPrivateKey {
    fn zeroize(&mut self) {
        for ni in &mut self.n {
            number_util::zeroize(ni);
        }
        number_util::zeroize(&mut self.d);
        number_util::zeroize(&mut self.mu);
    }
}

impl Drop for DjPrivateKey {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(self);
    }
}

impl DjPrivateKey {
    pub fn d(&self) -> &Integer {
        &self.d
    }
    pub fn mu(&self) -> &Integer {
        &self.mu
    }
}

/// Draw `p, q` of `ceil(bits/2) + 1` bits (safe primes are not required for
/// the non-threshold variant), set `n[i] = n^(i+1)` for `i` in `0..=s`,
/// `d = lcm(p-1, q-1)`, `g = n + 1`, and
/// `mu = dlog_s(g^d mod n^(s+1))^-1 mod n^s`.
pub fn generate_key_pair(
    r: &mut RandomSource,
    bits: u32,
    s: usize,
) -> Result<(DjPublicKey, DjPrivateKey)> {
    if bits < MIN_MODULUS_BITS {
        return Err(Error::InvalidKeySize);
    }
    if s == 0 {
        return Err(Error::InvalidKeySize);
    }

    let half_bits = bits.div_ceil(2) + 1;
    let (p, q) = loop {
        let p = number_util::random_prime(r, half_bits);
        let q = number_util::random_prime(r, half_bits);
        if p != q {
            break (p, q);
        }
    };

    let n0 = Integer::from(&p * &q);
    let mut n = Vec::with_capacity(s + 1);
    n.push(n0.clone());
    for i in 1..=s {
        n.push(Integer::from(&n[i - 1] * &n0));
    }

    let p_minus1 = Integer::from(&p - 1);
    let q_minus1 = Integer::from(&q - 1);
    let d = p_minus1.lcm(&q_minus1);

    let g = Integer::from(&n0 + 1);

    let gd = g
        .clone()
        .pow_mod(&d, &n[s])
        .map_err(|_| Error::InvalidModulus)?;
    let dlogged = dlog_s(&n, s, &gd);
    let mu = dlogged.invert(&n[s - 1]).map_err(|_| Error::InvalidModulus)?;

    let pk = DjPublicKey { n: n.clone(), g, s };
    let vk = DjPrivateKey { n, s, d, mu };
    Ok((pk, vk))
}

/// The recursive discrete-log recovery procedure from the Damgård–Jurik
/// paper: given `op = (1+n)^m mod n^(s+1)`, recover `m mod n^s`.
fn dlog_s(n: &[Integer], s: usize, op: &Integer) -> Integer {
    // L(op mod n[s]) = (op mod n^(s+1) - 1) / n, exact by construction.
    let reduced = op.clone().rem_euc(n[s].clone());
    let a = Integer::from(reduced - 1) / &n[0];

    let mut i = Integer::from(0);
    for j in 1..=s {
        let modulus = &n[j - 1]; // n^j
        let mut t1 = a.clone().rem_euc(modulus.clone());
        let mut t2 = i.clone();
        let mut kfact = Integer::from(1);

        for k in 2..=j {
            i -= 1;
            kfact *= k as u32;
            t2 = Integer::from(&t2 * &i).rem_euc(modulus.clone());

            let kfact_inv = kfact
                .clone()
                .invert(modulus)
                .expect("k! is coprime to n^j for k far smaller than n's prime factors");
            let mut t3 = Integer::from(&kfact_inv * &t2).rem_euc(modulus.clone());
            t3 = Integer::from(&t3 * &n[k - 2]).rem_euc(modulus.clone());
            t1 = Integer::from(&t1 - &t3).rem_euc(modulus.clone());
        }
        i = t1;
    }
    i
}

/// `g^m . u^{n^s} mod n^(s+1)` with `u` drawn from `Z*_n`.
pub fn encrypt(pk: &DjPublicKey, r: &mut RandomSource, m: &Integer) -> (Integer, Integer) {
    let u = random_in_mult_group(r, &pk.n[0]);
    (encrypt_r(pk, m, &u), u)
}

pub fn encrypt_r(pk: &DjPublicKey, m: &Integer, u: &Integer) -> Integer {
    let nn = &pk.n[pk.s];
    let a = pk.g.clone().pow_mod(m, nn).expect("g is coprime to n^(s+1)");
    let b = u
        .clone()
        .pow_mod(&pk.n[pk.s - 1], nn)
        .expect("u is coprime to n^(s+1)");
    Integer::from(a * b).rem_euc(nn.clone())
}

/// `a = c^d mod n^(s+1)`, then `dlog_s(a) * mu mod n^s`.
pub fn decrypt(vk: &DjPrivateKey, c: &Integer) -> Result<Integer> {
    let a = c
        .clone()
        .pow_mod(&vk.d, &vk.n[vk.s])
        .map_err(|_| Error::InvalidModulus)?;
    let m = dlog_s(&vk.n, vk.s, &a);
    Ok(Integer::from(m * &vk.mu).rem_euc(vk.n[vk.s - 1].clone()))
}

pub fn ep_add(pk: &DjPublicKey, c: &Integer, m: &Integer) -> Integer {
    let nn = &pk.n[pk.s];
    let gm = pk.g.clone().pow_mod(m, nn).expect("g is coprime to n^(s+1)");
    Integer::from(c * gm).rem_euc(nn.clone())
}

pub fn ee_add(pk: &DjPublicKey, c1: &Integer, c2: &Integer) -> Integer {
    let nn = &pk.n[pk.s];
    Integer::from(c1 * c2).rem_euc(nn.clone())
}

pub fn ep_mul(pk: &DjPublicKey, c: &Integer, m: &Integer) -> Integer {
    c.clone()
        .pow_mod(m, &pk.n[pk.s])
        .expect("c is coprime to n^(s+1)")
}

pub fn reencrypt(pk: &DjPublicKey, r: &mut RandomSource, c: &Integer) -> Integer {
    let nn = &pk.n[pk.s];
    let u = random_in_mult_group(r, &pk.n[0]);
    let un = u
        .pow_mod(&pk.n[pk.s - 1], nn)
        .expect("u is coprime to n^(s+1)");
    Integer::from(c * un).rem_euc(nn.clone())
}

/// Adapts the free functions above to the shared [`AdditivelyHomomorphic`]
/// capability.
pub struct DamgardJurik;

impl AdditivelyHomomorphic for DamgardJurik {
    type PublicKey = DjPublicKey;
    type Plaintext = Integer;
    type Ciphertext = Integer;
    type Randomness = Integer;

    fn encrypt(
        pk: &Self::PublicKey,
        r: &mut RandomSource,
        m: &Self::Plaintext,
    ) -> (Self::Ciphertext, Self::Randomness) {
        encrypt(pk, r, m)
    }

    fn encrypt_r(
        pk: &Self::PublicKey,
        m: &Self::Plaintext,
        u: &Self::Randomness,
    ) -> Self::Ciphertext {
        encrypt_r(pk, m, u)
    }

    fn ee_add(
        pk: &Self::PublicKey,
        c1: &Self::Ciphertext,
        c2: &Self::Ciphertext,
    ) -> Self::Ciphertext {
        ee_add(pk, c1, c2)
    }

    fn ep_add(pk: &Self::PublicKey, c: &Self::Ciphertext, m: &Self::Plaintext) -> Self::Ciphertext {
        ep_add(pk, c, m)
    }

    fn ep_mul(pk: &Self::PublicKey, c: &Self::Ciphertext, m: &Self::Plaintext) -> Self::Ciphertext {
        ep_mul(pk, c, m)
    }

    fn reencrypt(
        pk: &Self::PublicKey,
        r: &mut RandomSource,
        c: &Self::Ciphertext,
    ) -> Self::Ciphertext {
        reencrypt(pk, r, c)
    }
}
