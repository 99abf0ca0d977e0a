//! A single decryption authority.
//!
//! An authority exclusively owns its secret share for its lifetime; the
//! share is never exposed outside the authority except as the output of
//! [`AuthServer::share_decrypt`], which reveals nothing about the share
//! itself (only a ciphertext raised to a power of it).

use rug::Integer;
use zeroize::Zeroize;

use crate::capability::{AdditivelyHomomorphic, Threshold};
use crate::collections::TypedUsize;
use crate::error::Result;
use crate::number_util;
use crate::rand_source::RandomSource;

use super::combine::share_combine;
use super::{encrypt, encrypt_r, ee_add, ep_add, ep_mul, reencrypt, ThresholdPublicKey, VerificationVector};

/// Marker type for [`TypedUsize`] indices identifying authorities.
pub struct AuthorityMarker;

/// `{i, s_i = P(i) mod nm}`. `i` is the
/// **1-based** internal index handed out by [`super::ThresholdPrivateKey::deal`];
/// [`AuthServer::external_index`] exposes the 0-based index the public API
/// presents.
pub struct AuthServer {
    index: TypedUsize<AuthorityMarker>,
    share: Integer,
}

impl Zeroize for AuthServer {
    fn zeroize(&mut self) {
        number_util::zeroize(&mut self.share);
    }
}

impl Drop for AuthServer {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl AuthServer {
    pub(crate) fn new(one_based_index: usize, share: Integer) -> Self {
        Self {
            index: TypedUsize::from_usize(one_based_index),
            share,
        }
    }

    /// The 1-based index used internally by the dealing and combination math.
    pub fn internal_index(&self) -> usize {
        self.index.as_usize()
    }

    /// The 0-based index the external API presents.
    pub fn external_index(&self) -> usize {
        self.index.as_usize() - 1
    }

    /// Checks this authority's share against the dealer's Feldman-style
    /// verification vector, without trusting the dealer.
    pub fn verify_share(&self, pk: &ThresholdPublicKey, verification_vector: &VerificationVector) -> bool {
        let index = TypedUsize::from_usize(self.external_index());
        let Ok(vi) = verification_vector.get(index) else {
            return false;
        };
        let exponent = Integer::from(&pk.delta * &self.share);
        let expected = super::verification_base()
            .pow_mod(&exponent, &pk.nn)
            .expect("exponent and modulus are well-formed");
        *vi == expected
    }
}

impl AdditivelyHomomorphic for AuthServer {
    type PublicKey = ThresholdPublicKey;
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

impl Threshold for AuthServer {
    type PartialDecryption = Integer;

    /// `c_i = c^{2 . delta . s_i} mod n^2`.
    fn share_decrypt(&self, pk: &Self::PublicKey, c: &Self::Ciphertext) -> Self::PartialDecryption {
        let exponent = Integer::from(2 * &pk.delta) * &self.share;
        c.clone()
            .pow_mod(&exponent, &pk.nn)
            .expect("ciphertext is a member of Z*_n^2")
    }

    fn share_combine(
        pk: &Self::PublicKey,
        shares: &[(usize, Self::PartialDecryption)],
    ) -> Result<Self::Plaintext> {
        share_combine(pk, shares)
    }
}
