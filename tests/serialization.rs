//! Serialization idempotence: `import(export(k))` preserves
//! every public attribute of `k` verbatim. Logical (not byte-exact), so we
//! round-trip through `serde_json` and compare the reconstructed key's
//! accessors rather than the bytes.

use rug::Integer;

use hcs::elgamal::{self, ElGamalPublicKey};
use hcs::paillier::{self, PaillierPublicKey};
use hcs::rand_source::RandomSource;
use hcs::threshold::{self, ThresholdPublicKey};

#[test]
fn paillier_public_key_round_trips_through_json() {
    let mut r = RandomSource::new_with_seed(21);
    let (pk, _vk) = paillier::generate_key_pair(&mut r, 256).unwrap();

    let json = serde_json::to_string(&pk).unwrap();
    let restored: PaillierPublicKey = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.n(), pk.n());
    assert_eq!(restored.g(), pk.g());
    assert_eq!(restored.nn(), pk.nn());
    assert!(restored.verify().is_ok());
}

#[test]
fn threshold_public_key_round_trips_through_json() {
    let mut r = RandomSource::new_with_seed(22);
    let (pk, _vk) = threshold::generate_key_pair(&mut r, 64, 2, 4).unwrap();

    let json = serde_json::to_string(&pk).unwrap();
    let restored: ThresholdPublicKey = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.n(), pk.n());
    assert_eq!(restored.delta(), pk.delta());
    assert_eq!(restored.w(), pk.w());
    assert_eq!(restored.l(), pk.l());
    assert!(restored.verify().is_ok());
}

#[test]
fn elgamal_public_key_round_trips_through_json() {
    let mut r = RandomSource::new_with_seed(23);
    let (pk, vk) = elgamal::generate_key_pair(&mut r, 64).unwrap();

    let json = serde_json::to_string(&pk).unwrap();
    let restored: ElGamalPublicKey = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.g(), pk.g());
    assert_eq!(restored.q(), pk.q());
    assert_eq!(restored.h(), pk.h());
    assert!(restored.verify(&vk));

    // Encrypting under the restored key and decrypting under the original
    // private key should behave identically to the original public key.
    let m = Integer::from(99);
    let c = elgamal::encrypt(&restored, &mut r, &m);
    assert_eq!(elgamal::decrypt(&vk, &c), m);
}
