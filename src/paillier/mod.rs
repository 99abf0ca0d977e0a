//! The single-party Paillier cryptosystem.
//!
//! Textbook form only: every operation here is a direct
//! `pow_mod`/`invert` sequence over `rug::Integer`.
//!
//! Key generation has two variants, selected at compile time. The default,
//! `g = n + 1`, makes `mu` fall straight out of `lambda^-1 mod n`. Enabling
//! the `g-equal-2` Cargo feature switches to the fixed-base variant instead:
//! `g = 2`, `t = (g^lambda mod n^2 - 1) / n`, and `mu = t^-1 mod n` (key
//! generation fails if `gcd(t, n) != 1`). Every operation past key
//! generation (`encrypt`, `decrypt`, `ep_add`, `ee_add`, `ep_mul`,
//! `reencrypt`) already takes `g` from the public key rather than assuming
//! its value, so neither variant needs its own copy of them.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::capability::AdditivelyHomomorphic;
use crate::constants::MIN_MODULUS_BITS;
use crate::error::{Error, Result};
use crate::number_util::{self, crt2, paillier_l, random_in_mult_group};
use crate::rand_source::RandomSource;
use rug::Integer;

/// `{n, g, n^2}`. `g = n + 1` by default, or `g = 2` under the `g-equal-2`
/// feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaillierPublicKey {
    n: Integer,
    g: Integer,
    nn: Integer,
}

impl PaillierPublicKey {
    pub fn n(&self) -> &Integer {
        &self.n
    }
    pub fn g(&self) -> &Integer {
        &self.g
    }
    pub fn nn(&self) -> &Integer {
        &self.nn
    }

    /// `true` iff `0 <= m < n`.
    pub fn validate_plaintext(&self, m: &Integer) -> bool {
        number_util::member_of_mod(m, &self.n)
    }

    /// `true` iff `c` is a member of `Z*_{n^2}`.
    pub fn validate_ciphertext(&self, c: &Integer) -> bool {
        number_util::member_of_mul_group(c, &self.nn)
    }

    /// `true` iff `r` is a member of `Z*_n`.
    pub fn validate_randomness(&self, r: &Integer) -> bool {
        number_util::member_of_mul_group(r, &self.n)
    }

    /// Checks `g = n + 1` (or `g = 2` under `g-equal-2`) and `n^2 = n * n`.
    pub fn verify(&self) -> Result<()> {
        #[cfg(not(feature = "g-equal-2"))]
        let g_ok = self.g == Integer::from(&self.n + 1);
        #[cfg(feature = "g-equal-2")]
        let g_ok = self.g == 2;

        if !g_ok || self.nn != Integer::from(&self.n * &self.n) {
            error!("paillier public key invariant violated");
            return Err(Error::InvariantViolation);
        }
        Ok(())
    }
}

/// `{p, q, p^2, q^2, lambda, mu, hp, hq, n, n^2}`.
/// `PaillierPrivateKey`. Zeroized on drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaillierPrivateKey {
    p: Integer,
    q: Integer,
    p2: Integer,
    q2: Integer,
    lambda: Integer,
    mu: Integer,
    hp: Integer,
    hq: Integer,
    n: Integer,
    nn: Integer,
}

impl zeroize::Zeroize for PaillierPrivateKey {
    fn zeroize(&mut self) {
        number_util::zeroize(&mut self.p);
        number_util::zeroize(&mut self.q);
        number_util::zeroize(&mut self.p2);
        number_util::zeroize(&mut self.q2);
        number_util::zeroize(&mut self.lambda);
        number_util::zeroize(&mut self.mu);
        number_util::zeroize(&mut self.hp);
        number_util::zeroize(&mut self.hq);
        number_util::zeroize(&mut self.n);
        number_util::zeroize(&mut self.nn);
    }
}

impl Drop for PaillierPrivateKey {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(self);
    }
}

impl PaillierPrivateKey {
    pub fn n(&self) -> &Integer {
        &self.n
    }
    pub fn lambda(&self) -> &Integer {
        &self.lambda
    }
    pub fn mu(&self) -> &Integer {
        &self.mu
    }

    /// Checks `n^2 = n * n` and that `mu` is the inverse this variant's key
    /// generation would have derived.
    pub fn verify(&self) -> Result<()> {
        if self.nn != Integer::from(&self.n * &self.n) {
            error!("paillier private key invariant violated: n^2 mismatch");
            return Err(Error::InvariantViolation);
        }

        #[cfg(not(feature = "g-equal-2"))]
        let expected_mu = self
            .lambda
            .clone()
            .invert(&self.n)
            .map_err(|_| Error::InvariantViolation)?;

        #[cfg(feature = "g-equal-2")]
        let expected_mu = {
            let t_raw = Integer::from(2)
                .pow_mod(&self.lambda, &self.nn)
                .map_err(|_| Error::InvariantViolation)?;
            let t = paillier_l(&t_raw, &self.n);
            t.invert(&self.n).map_err(|_| Error::InvariantViolation)?
        };

        if self.mu != expected_mu {
            error!("paillier private key invariant violated: mu mismatch");
            return Err(Error::InvariantViolation);
        }
        Ok(())
    }
}

/// Checks both keys individually and that `pk.n = vk.n`.
pub fn verify_pair(pk: &PaillierPublicKey, vk: &PaillierPrivateKey) -> Result<()> {
    pk.verify()?;
    vk.verify()?;
    if pk.n != vk.n {
        error!("paillier key pair invariant violated: n mismatch between pk and vk");
        return Err(Error::InvariantViolation);
    }
    Ok(())
}

/// Draw two primes `p, q` of `ceil(bits/2) + 1` bits each, `p != q`, and
/// derive `n = pq`, `lambda = lcm(p-1, q-1)`, and the CRT-decryption
/// helpers `hp`, `hq`.
///
/// `g` and `mu` depend on which variant is compiled in. By default,
/// `g = n + 1` and `mu = lambda^-1 mod n`. Under the `g-equal-2` feature,
/// `g = 2`, `t = (g^lambda mod n^2 - 1) / n`, and `mu = t^-1 mod n`; this
/// variant fails key generation with [`Error::InvalidModulus`] if
/// `gcd(t, n) != 1`.
pub fn generate_key_pair(
    r: &mut RandomSource,
    bits: u32,
) -> Result<(PaillierPublicKey, PaillierPrivateKey)> {
    if bits < MIN_MODULUS_BITS {
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

    let n = Integer::from(&p * &q);
    let p2 = Integer::from(&p * &p);
    let q2 = Integer::from(&q * &q);
    let nn = Integer::from(&n * &n);

    let p_minus1 = Integer::from(&p - 1);
    let q_minus1 = Integer::from(&q - 1);
    let lambda = p_minus1.lcm(&q_minus1);

    #[cfg(not(feature = "g-equal-2"))]
    let (g, mu) = {
        let g = Integer::from(&n + 1);
        let mu = lambda
            .clone()
            .invert(&n)
            .map_err(|_| Error::InvalidModulus)?;
        (g, mu)
    };

    #[cfg(feature = "g-equal-2")]
    let (g, mu) = {
        let g = Integer::from(2);
        let t_raw = g
            .clone()
            .pow_mod(&lambda, &nn)
            .map_err(|_| Error::InvalidModulus)?;
        let t = paillier_l(&t_raw, &n);
        if t.clone().gcd(&n) != 1 {
            return Err(Error::InvalidModulus);
        }
        let mu = t.invert(&n).map_err(|_| Error::InvalidModulus)?;
        (g, mu)
    };

    let hp = paillier_decryption_helper(&g, &p, &p2)?;
    let hq = paillier_decryption_helper(&g, &q, &q2)?;

    let pk = PaillierPublicKey {
        n: n.clone(),
        g,
        nn: nn.clone(),
    };
    let vk = PaillierPrivateKey {
        p,
        q,
        p2,
        q2,
        lambda,
        mu,
        hp,
        hq,
        n,
        nn,
    };

    Ok((pk, vk))
}

/// `hp = L_p(g^{p-1} mod p^2)^-1 mod p` (and analogously for `hq`).
fn paillier_decryption_helper(g: &Integer, p: &Integer, p2: &Integer) -> Result<Integer> {
    let p_minus1 = Integer::from(p - 1);
    let t = g
        .clone()
        .pow_mod(&p_minus1, p2)
        .map_err(|_| Error::InvalidModulus)?;
    let l = paillier_l(&t, p);
    l.invert(p).map_err(|_| Error::InvalidModulus)
}

/// Sample `u` uniform in `Z*_n` and return `(encrypt_r(pk, m, u), u)`.
pub fn encrypt(pk: &PaillierPublicKey, r: &mut RandomSource, m: &Integer) -> (Integer, Integer) {
    let u = random_in_mult_group(r, &pk.n);
    (encrypt_r(pk, m, &u), u)
}

/// Deterministic encryption with caller-supplied randomness `u`.
pub fn encrypt_r(pk: &PaillierPublicKey, m: &Integer, u: &Integer) -> Integer {
    let a = pk.g.clone().pow_mod(m, &pk.nn).expect("g is coprime to n^2");
    let b = u.clone().pow_mod(&pk.n, &pk.nn).expect("u is coprime to n^2");
    Integer::from(a * b).rem_euc(pk.nn.clone())
}

/// Decrypt `c` via the 2-prime CRT optimization.
pub fn decrypt(vk: &PaillierPrivateKey, c: &Integer) -> Result<Integer> {
    let p_minus1 = Integer::from(&vk.p - 1);
    let q_minus1 = Integer::from(&vk.q - 1);

    let cp = c
        .clone()
        .pow_mod(&p_minus1, &vk.p2)
        .map_err(|_| Error::InvalidModulus)?;
    let cq = c
        .clone()
        .pow_mod(&q_minus1, &vk.q2)
        .map_err(|_| Error::InvalidModulus)?;

    let xp = Integer::from(paillier_l(&cp, &vk.p) * &vk.hp).rem_euc(vk.p.clone());
    let xq = Integer::from(paillier_l(&cq, &vk.q) * &vk.hq).rem_euc(vk.q.clone());

    let x = crt2(&xp, &vk.p, &xq, &vk.q)?;
    Ok(x.rem_euc(vk.n.clone()))
}

/// `c . g^m mod n^2`: homomorphic ciphertext-plaintext addition.
pub fn ep_add(pk: &PaillierPublicKey, c: &Integer, m: &Integer) -> Integer {
    let gm = pk.g.clone().pow_mod(m, &pk.nn).expect("g is coprime to n^2");
    Integer::from(c * gm).rem_euc(pk.nn.clone())
}

/// `c1 . c2 mod n^2`: homomorphic ciphertext-ciphertext addition.
pub fn ee_add(pk: &PaillierPublicKey, c1: &Integer, c2: &Integer) -> Integer {
    Integer::from(c1 * c2).rem_euc(pk.nn.clone())
}

/// `c^m mod n^2`: ciphertext scaled by a plaintext scalar.
pub fn ep_mul(pk: &PaillierPublicKey, c: &Integer, m: &Integer) -> Integer {
    c.clone().pow_mod(m, &pk.nn).expect("c is coprime to n^2")
}

/// `c . u^n mod n^2` with fresh `u`: a new ciphertext with identical
/// plaintext.
pub fn reencrypt(pk: &PaillierPublicKey, r: &mut RandomSource, c: &Integer) -> Integer {
    let u = random_in_mult_group(r, &pk.n);
    let un = u.pow_mod(&pk.n, &pk.nn).expect("u is coprime to n^2");
    Integer::from(c * un).rem_euc(pk.nn.clone())
}

/// Adapts the free functions above to the shared [`AdditivelyHomomorphic`]
/// capability.
pub struct Paillier;

impl AdditivelyHomomorphic for Paillier {
    type PublicKey = PaillierPublicKey;
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
