//! Capability traits unifying the cryptosystem families behind one shared
//! shape, rather than three structurally-similar-but-unrelated modules.

use crate::error::Result;
use crate::rand_source::RandomSource;

/// A public-key scheme with additive homomorphism over its plaintext ring.
/// Implemented by Paillier, Damgård–Jurik, and (read-only, for the
/// operations that remain meaningful without the private key) the
/// threshold variant's public key.
pub trait AdditivelyHomomorphic {
    type PublicKey;
    type Plaintext;
    type Ciphertext;
    type Randomness;

    /// Encrypt `m` with fresh randomness drawn from `r`.
    fn encrypt(
        pk: &Self::PublicKey,
        r: &mut RandomSource,
        m: &Self::Plaintext,
    ) -> (Self::Ciphertext, Self::Randomness);

    /// Encrypt `m` with caller-supplied randomness `u` (used by the ZK proof
    /// subsystem, which must encrypt with a specific, known `u`).
    fn encrypt_r(pk: &Self::PublicKey, m: &Self::Plaintext, u: &Self::Randomness)
        -> Self::Ciphertext;

    /// `c1 . c2`: homomorphic ciphertext-ciphertext addition.
    fn ee_add(
        pk: &Self::PublicKey,
        c1: &Self::Ciphertext,
        c2: &Self::Ciphertext,
    ) -> Self::Ciphertext;

    /// `c + m`: homomorphic ciphertext-plaintext addition.
    fn ep_add(pk: &Self::PublicKey, c: &Self::Ciphertext, m: &Self::Plaintext) -> Self::Ciphertext;

    /// `c * m`: ciphertext scaled by a plaintext scalar.
    fn ep_mul(pk: &Self::PublicKey, c: &Self::Ciphertext, m: &Self::Plaintext) -> Self::Ciphertext;

    /// A fresh ciphertext with identical plaintext, unlinkable under CPA.
    fn reencrypt(
        pk: &Self::PublicKey,
        r: &mut RandomSource,
        c: &Self::Ciphertext,
    ) -> Self::Ciphertext;
}

/// A threshold-decryption capability: the private key is split among `l`
/// authorities, any `w` of which can jointly recover a plaintext.
pub trait Threshold: AdditivelyHomomorphic {
    type PartialDecryption;

    /// Authority-side partial decryption of a ciphertext.
    fn share_decrypt(&self, pk: &Self::PublicKey, c: &Self::Ciphertext) -> Self::PartialDecryption;

    /// Combine `>= w` partial decryptions (indexed by authority, absent
    /// entries represented by the caller) into the plaintext.
    fn share_combine(
        pk: &Self::PublicKey,
        shares: &[(usize, Self::PartialDecryption)],
    ) -> Result<Self::Plaintext>;
}

/// A conventional multiplicative scheme (El-Gamal is the only instance in
/// this crate), included for completeness alongside the additive family.
pub trait MultiplicativelyHomomorphic {
    type PublicKey;
    type Plaintext;
    type Ciphertext;

    fn encrypt(
        pk: &Self::PublicKey,
        r: &mut RandomSource,
        m: &Self::Plaintext,
    ) -> Self::Ciphertext;

    /// `c1 . c2`: homomorphic ciphertext-ciphertext multiplication, yielding
    /// an encryption of the plaintext product.
    fn ee_mul(
        pk: &Self::PublicKey,
        c1: &Self::Ciphertext,
        c2: &Self::Ciphertext,
    ) -> Self::Ciphertext;
}
