//! El-Gamal over `Z*_q`. A conventional multiplicative scheme, included
//! for completeness alongside the additive family; `ee_mul` yields an
//! encryption of the plaintext product.
//!
//! Key generation draws `q` as prime, then samples `g` and `x` uniform in
//! `[1, q-1]` by sampling in `[0, q-2]` and adding one back, so neither a
//! generator nor a secret exponent can come back zero.

use rug::Integer;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::capability::MultiplicativelyHomomorphic;
use crate::constants::MIN_MODULUS_BITS;
use crate::error::{Error, Result};
use crate::number_util;
use crate::rand_source::{random_below, RandomSource};

/// `{g, q, h = g^x mod q}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElGamalPublicKey {
    g: Integer,
    q: Integer,
    h: Integer,
}

impl ElGamalPublicKey {
    pub fn g(&self) -> &Integer {
        &self.g
    }

    pub fn q(&self) -> &Integer {
        &self.q
    }

    pub fn h(&self) -> &Integer {
        &self.h
    }

    /// `h == g^x mod q` for the matching private key.
    pub fn verify(&self, vk: &ElGamalPrivateKey) -> bool {
        self.q == vk.q
            && self.h
                == self
                    .g
                    .clone()
                    .pow_mod(&vk.x, &self.q)
                    .expect("g coprime to q")
    }
}

/// `{x, q}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElGamalPrivateKey {
    x: Integer,
    q: Integer,
}

impl Zeroize for ElGamalPrivateKey {
    fn zeroize(&mut self) {
        number_util::zeroize(&mut self.x);
        number_util::zeroize(&mut self.q);
    }
}

impl Drop for ElGamalPrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// `(c1, c2) ∈ Z_q × Z_q`, both reduced mod `q`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElGamalCipher {
    pub c1: Integer,
    pub c2: Integer,
}

/// Draw `q` prime, then `g` and `x` uniform in `[1, q-1]`.
pub fn generate_key_pair(
    r: &mut RandomSource,
    bits: u32,
) -> Result<(ElGamalPublicKey, ElGamalPrivateKey)> {
    if bits < MIN_MODULUS_BITS {
        return Err(Error::InvalidKeySize);
    }

    let q = number_util::random_prime(r, bits);
    let q_minus_1 = Integer::from(&q - 1);

    let g = r.with_rand_state(|rs| random_below(rs, &q_minus_1)) + 1;
    let x = r.with_rand_state(|rs| random_below(rs, &q_minus_1)) + 1;

    let h = g.clone().pow_mod(&x, &q).map_err(|_| Error::InvalidModulus)?;

    Ok((
        ElGamalPublicKey {
            g,
            q: q.clone(),
            h,
        },
        ElGamalPrivateKey { x, q },
    ))
}

/// `c1 = g^t mod q`, `c2 = h^t . m mod q` for `t` uniform in `[1, q-1]`.
pub fn encrypt(pk: &ElGamalPublicKey, r: &mut RandomSource, m: &Integer) -> ElGamalCipher {
    let q_minus_1 = Integer::from(&pk.q - 1);
    let t = r.with_rand_state(|rs| random_below(rs, &q_minus_1)) + 1;

    let c1 = pk.g.clone().pow_mod(&t, &pk.q).expect("g coprime to q");
    let ht = pk.h.clone().pow_mod(&t, &pk.q).expect("h coprime to q");
    let c2 = Integer::from(ht * m).rem_euc(pk.q.clone());

    ElGamalCipher { c1, c2 }
}

/// `m = c2 . c1^{q-1-x} mod q`.
pub fn decrypt(vk: &ElGamalPrivateKey, c: &ElGamalCipher) -> Integer {
    let exponent = Integer::from(&vk.q - 1) - &vk.x;
    let s = c
        .c1
        .clone()
        .pow_mod(&exponent, &vk.q)
        .expect("c1 coprime to q");
    Integer::from(&s * &c.c2).rem_euc(vk.q.clone())
}

/// Componentwise product mod `q`: encrypts the product of the two
/// plaintexts.
pub fn ee_mul(pk: &ElGamalPublicKey, c1: &ElGamalCipher, c2: &ElGamalCipher) -> ElGamalCipher {
    ElGamalCipher {
        c1: Integer::from(&c1.c1 * &c2.c1).rem_euc(pk.q.clone()),
        c2: Integer::from(&c1.c2 * &c2.c2).rem_euc(pk.q.clone()),
    }
}

/// Re-randomize a ciphertext in place by folding in a fresh encryption of
/// `1` (supplemented feature,
/// additive schemes have `reencrypt`, the multiplicative scheme needs the
/// analogous operation to unlink a ciphertext from its history without
/// changing the plaintext it decrypts to).
pub fn rescale(pk: &ElGamalPublicKey, r: &mut RandomSource, c: &ElGamalCipher) -> ElGamalCipher {
    let blinding = encrypt(pk, r, &Integer::from(1));
    ee_mul(pk, c, &blinding)
}

pub struct ElGamal;

impl MultiplicativelyHomomorphic for ElGamal {
    type PublicKey = ElGamalPublicKey;
    type Plaintext = Integer;
    type Ciphertext = ElGamalCipher;

    fn encrypt(pk: &Self::PublicKey, r: &mut RandomSource, m: &Self::Plaintext) -> Self::Ciphertext {
        encrypt(pk, r, m)
    }

    fn ee_mul(pk: &Self::PublicKey, c1: &Self::Ciphertext, c2: &Self::Ciphertext) -> Self::Ciphertext {
        ee_mul(pk, c1, c2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut r = RandomSource::new_with_seed(0);
        let (pk, vk) = generate_key_pair(&mut r, 64).unwrap();
        assert!(pk.verify(&vk));

        let m = Integer::from(42);
        let c = encrypt(&pk, &mut r, &m);
        assert_eq!(decrypt(&vk, &c), m);
    }

    #[test]
    fn ee_mul_yields_plaintext_product() {
        let mut r = RandomSource::new_with_seed(1);
        let (pk, vk) = generate_key_pair(&mut r, 64).unwrap();

        let m1 = Integer::from(6);
        let m2 = Integer::from(7);
        let c1 = encrypt(&pk, &mut r, &m1);
        let c2 = encrypt(&pk, &mut r, &m2);

        let product = ee_mul(&pk, &c1, &c2);
        assert_eq!(decrypt(&vk, &product), Integer::from(42));
    }

    #[test]
    fn rescale_preserves_plaintext_but_changes_ciphertext() {
        let mut r = RandomSource::new_with_seed(2);
        let (pk, vk) = generate_key_pair(&mut r, 64).unwrap();

        let m = Integer::from(13);
        let c = encrypt(&pk, &mut r, &m);
        let rescaled = rescale(&pk, &mut r, &c);

        assert_ne!(c, rescaled);
        assert_eq!(decrypt(&vk, &rescaled), m);
    }

    #[test]
    fn generate_key_pair_rejects_undersized_modulus() {
        let mut r = RandomSource::new_with_seed(3);
        assert_eq!(
            generate_key_pair(&mut r, 8).unwrap_err(),
            Error::InvalidKeySize
        );
    }
}
