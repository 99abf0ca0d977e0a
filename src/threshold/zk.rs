//! The `n`-th-power Σ-protocol and its 1-of-2 composition.
//!
//! A hard-coded challenge constant would make every proof forgeable by
//! anyone who knows it in advance. This module instead derives the
//! challenge from a `Sha256` hash of the full transcript, truncated to
//! [`CHALLENGE_BITS`], the standard Fiat-Shamir transform.

use rug::Integer;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{CHALLENGE_BITS, ONE_OF_TWO_PROOF_TAG_LEFT, ONE_OF_TWO_PROOF_TAG_RIGHT};
use crate::error::{Error, Result};
use crate::paillier::{encrypt_r, PaillierPublicKey};
use crate::rand_source::{random_bits, RandomSource};

/// Proves that a ciphertext `u` encrypts an `n`-th power of its modulus
/// (canonically: that `u` is an encryption of zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NthPowerProof {
    a: Integer,
    z: Integer,
}

/// `r' <- Z*_n`; `a = encrypt_r(pk, r', 0)`; `e = H(transcript)`;
/// `z = v^e . r' mod n`, where `v` is the `n`-th root witness for `u`
/// (i.e. `u = v^n mod n^2`, the randomness originally used to encrypt 0).
pub fn prove(
    pk: &PaillierPublicKey,
    r: &mut RandomSource,
    u: &Integer,
    v: &Integer,
    prover_id: &[u8],
) -> NthPowerProof {
    let r_prime = crate::number_util::random_in_mult_group(r, pk.n());
    let a = encrypt_r(pk, &Integer::from(0), &r_prime);
    let e = nth_power_challenge(pk, u, &a, prover_id);
    let z = Integer::from(v.clone().pow_mod(&e, pk.n()).expect("v coprime to n") * &r_prime)
        .rem_euc(pk.n().clone());
    NthPowerProof { a, z }
}

/// Accept iff `u, a, z` are all coprime to `n` and
/// `encrypt_r(pk, z, 0) == u^e . a mod n^2`, with `e` recomputed from the
/// transcript.
pub fn verify(
    pk: &PaillierPublicKey,
    u: &Integer,
    proof: &NthPowerProof,
    prover_id: &[u8],
) -> Result<()> {
    if u.clone().gcd(pk.n()) != 1
        || proof.a.clone().gcd(pk.n()) != 1
        || proof.z.clone().gcd(pk.n()) != 1
    {
        return Err(Error::InvalidProof);
    }

    let e = nth_power_challenge(pk, u, &proof.a, prover_id);
    let lhs = encrypt_r(pk, &Integer::from(0), &proof.z);
    let rhs = Integer::from(
        u.clone().pow_mod(&e, pk.nn()).expect("u coprime to n^2") * &proof.a,
    )
    .rem_euc(pk.nn().clone());

    if lhs != rhs {
        return Err(Error::InvalidProof);
    }
    Ok(())
}

fn nth_power_challenge(pk: &PaillierPublicKey, u: &Integer, a: &Integer, prover_id: &[u8]) -> Integer {
    hash_challenge(&[
        &[crate::constants::NTH_POWER_PROOF_TAG],
        pk.n().to_string_radix(16).as_bytes(),
        u.to_string_radix(16).as_bytes(),
        a.to_string_radix(16).as_bytes(),
        prover_id,
    ])
}

/// `u` encrypts **either** `m1` **or** `m2`.
/// Two parallel Σ-protocols share a single Fiat-Shamir challenge
/// `e = e1 xor e2`; the prover knows the witness for exactly one branch and
/// simulates the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneOfTwoProof {
    e1: Integer,
    e2: Integer,
    u1: Integer,
    u2: Integer,
    a1: Integer,
    a2: Integer,
    z1: Integer,
    z2: Integer,
    m1: Integer,
    m2: Integer,
}

/// Which of the two candidate plaintexts the prover actually encrypted,
/// carrying the `n`-th-root witness (the original encryption randomness).
pub enum Witness {
    First(Integer),
    Second(Integer),
}

/// `u . g^{-m} mod n^2`: if `u` is an encryption of `m`, this is an
/// encryption of zero, i.e. an `n`-th power.
fn strip_plaintext(pk: &PaillierPublicKey, u: &Integer, m: &Integer) -> Integer {
    let gm = pk.g().clone().pow_mod(m, pk.nn()).expect("g coprime to n^2");
    let gm_inv = gm.invert(pk.nn()).expect("g^m coprime to n^2");
    Integer::from(u * gm_inv).rem_euc(pk.nn().clone())
}

pub fn prove_one_of_two(
    pk: &PaillierPublicKey,
    r: &mut RandomSource,
    u: &Integer,
    witness: Witness,
    m1: &Integer,
    m2: &Integer,
    prover_id: &[u8],
) -> OneOfTwoProof {
    let u1 = strip_plaintext(pk, u, m1);
    let u2 = strip_plaintext(pk, u, m2);

    let (true_is_first, v) = match witness {
        Witness::First(v) => (true, v),
        Witness::Second(v) => (false, v),
    };

    // Real branch: an honest Σ-protocol commitment.
    let r_real = crate::number_util::random_in_mult_group(r, pk.n());
    let a_real = encrypt_r(pk, &Integer::from(0), &r_real);

    // Simulated branch: pick the response and challenge first, back-derive
    // the commitment that makes verification hold.
    let e_sim = r.with_rand_state(|rand| random_bits(rand, CHALLENGE_BITS));
    let z_sim = crate::number_util::random_in_mult_group(r, pk.n());
    let u_sim = if true_is_first { &u2 } else { &u1 };
    let a_sim = {
        let zn = encrypt_r(pk, &Integer::from(0), &z_sim);
        let u_pow_e = u_sim.clone().pow_mod(&e_sim, pk.nn()).expect("u coprime to n^2");
        let u_pow_e_inv = u_pow_e.invert(pk.nn()).expect("u^e coprime to n^2");
        Integer::from(zn * u_pow_e_inv).rem_euc(pk.nn().clone())
    };

    let (a1, a2) = if true_is_first {
        (a_real.clone(), a_sim.clone())
    } else {
        (a_sim.clone(), a_real.clone())
    };

    let e = one_of_two_challenge(pk, u, &u1, &u2, &a1, &a2, prover_id);
    let e_real = Integer::from(&e ^ &e_sim);

    let z_real = Integer::from(v.clone().pow_mod(&e_real, pk.n()).expect("v coprime to n") * &r_real)
        .rem_euc(pk.n().clone());

    let (e1, e2, z1, z2) = if true_is_first {
        (e_real, e_sim, z_real, z_sim)
    } else {
        (e_sim, e_real, z_sim, z_real)
    };

    OneOfTwoProof {
        e1,
        e2,
        u1,
        u2,
        a1,
        a2,
        z1,
        z2,
        m1: m1.clone(),
        m2: m2.clone(),
    }
}

pub fn verify_one_of_two(
    pk: &PaillierPublicKey,
    u: &Integer,
    proof: &OneOfTwoProof,
    prover_id: &[u8],
) -> Result<()> {
    let expected_u1 = strip_plaintext(pk, u, &proof.m1);
    let expected_u2 = strip_plaintext(pk, u, &proof.m2);
    if expected_u1 != proof.u1 || expected_u2 != proof.u2 {
        return Err(Error::InvalidProof);
    }

    for x in [&proof.u1, &proof.u2, &proof.a1, &proof.a2, &proof.z1, &proof.z2] {
        if x.clone().gcd(pk.n()) != 1 {
            return Err(Error::InvalidProof);
        }
    }

    let e = one_of_two_challenge(pk, u, &proof.u1, &proof.u2, &proof.a1, &proof.a2, prover_id);
    if Integer::from(&proof.e1 ^ &proof.e2) != e {
        return Err(Error::InvalidProof);
    }

    let branch_holds = |uj: &Integer, aj: &Integer, ej: &Integer, zj: &Integer| -> bool {
        let lhs = encrypt_r(pk, &Integer::from(0), zj);
        let rhs = Integer::from(uj.clone().pow_mod(ej, pk.nn()).expect("u coprime to n^2") * aj)
            .rem_euc(pk.nn().clone());
        lhs == rhs
    };

    if !branch_holds(&proof.u1, &proof.a1, &proof.e1, &proof.z1)
        || !branch_holds(&proof.u2, &proof.a2, &proof.e2, &proof.z2)
    {
        return Err(Error::InvalidProof);
    }
    Ok(())
}

fn one_of_two_challenge(
    pk: &PaillierPublicKey,
    u: &Integer,
    u1: &Integer,
    u2: &Integer,
    a1: &Integer,
    a2: &Integer,
    prover_id: &[u8],
) -> Integer {
    hash_challenge(&[
        &[ONE_OF_TWO_PROOF_TAG_LEFT, ONE_OF_TWO_PROOF_TAG_RIGHT],
        pk.n().to_string_radix(16).as_bytes(),
        u.to_string_radix(16).as_bytes(),
        u1.to_string_radix(16).as_bytes(),
        u2.to_string_radix(16).as_bytes(),
        a1.to_string_radix(16).as_bytes(),
        a2.to_string_radix(16).as_bytes(),
        prover_id,
    ])
}

/// Hash the transcript with `Sha256` and reduce it to [`CHALLENGE_BITS`]
/// bits. `CHALLENGE_BITS` is exactly the `Sha256` output size, so this is a
/// direct big-endian interpretation of the digest.
fn hash_challenge(parts: &[&[u8]]) -> Integer {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    let digest = hasher.finalize();
    debug_assert_eq!(digest.len() as u32 * 8, CHALLENGE_BITS);
    Integer::from_digits(&digest, rug::integer::Order::MsfBe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paillier::{encrypt, generate_key_pair};

    #[test]
    fn nth_power_proof_accepts_genuine_encryption_of_zero() {
        let mut r = RandomSource::new_with_seed(1);
        let (pk, _vk) = generate_key_pair(&mut r, 256).unwrap();
        let v = crate::number_util::random_in_mult_group(&mut r, pk.n());
        let u = encrypt_r(&pk, &Integer::from(0), &v);

        let proof = prove(&pk, &mut r, &u, &v, b"prover-1");
        assert!(verify(&pk, &u, &proof, b"prover-1").is_ok());
    }

    #[test]
    fn nth_power_proof_rejects_tampered_a() {
        let mut r = RandomSource::new_with_seed(2);
        let (pk, _vk) = generate_key_pair(&mut r, 256).unwrap();
        let v = crate::number_util::random_in_mult_group(&mut r, pk.n());
        let u = encrypt_r(&pk, &Integer::from(0), &v);

        let mut proof = prove(&pk, &mut r, &u, &v, b"prover-1");
        proof.a += 1;
        assert_eq!(
            verify(&pk, &u, &proof, b"prover-1").unwrap_err(),
            Error::InvalidProof
        );
    }

    #[test]
    fn one_of_two_proof_accepts_either_genuine_branch() {
        let mut r = RandomSource::new_with_seed(3);
        let (pk, _vk) = generate_key_pair(&mut r, 256).unwrap();
        let m1 = Integer::from(0);
        let m2 = Integer::from(1);

        let (u, v) = encrypt(&pk, &mut r, &m1);
        let proof = prove_one_of_two(&pk, &mut r, &u, Witness::First(v), &m1, &m2, b"voter-1");
        assert!(verify_one_of_two(&pk, &u, &proof, b"voter-1").is_ok());
    }

    #[test]
    fn one_of_two_proof_rejects_tampered_branch() {
        let mut r = RandomSource::new_with_seed(4);
        let (pk, _vk) = generate_key_pair(&mut r, 256).unwrap();
        let m1 = Integer::from(0);
        let m2 = Integer::from(1);

        let (u, v) = encrypt(&pk, &mut r, &m1);
        let mut proof = prove_one_of_two(&pk, &mut r, &u, Witness::First(v), &m1, &m2, b"voter-1");
        proof.a1 += 1;
        assert_eq!(
            verify_one_of_two(&pk, &u, &proof, b"voter-1").unwrap_err(),
            Error::InvalidProof
        );
    }

    #[test]
    fn one_of_two_proof_rejects_mismatched_prover_id() {
        let mut r = RandomSource::new_with_seed(5);
        let (pk, _vk) = generate_key_pair(&mut r, 256).unwrap();
        let m1 = Integer::from(0);
        let m2 = Integer::from(1);

        let (u, v) = encrypt(&pk, &mut r, &m1);
        let proof = prove_one_of_two(&pk, &mut r, &u, Witness::First(v), &m1, &m2, b"voter-1");
        assert_eq!(
            verify_one_of_two(&pk, &u, &proof, b"voter-2").unwrap_err(),
            Error::InvalidProof
        );
    }
}
