//! Round-trip and homomorphic laws for Paillier and Damgard-Jurik.

use rug::Integer;

use hcs::damgard_jurik::{self, generate_key_pair as dj_generate_key_pair};
use hcs::paillier::{self, generate_key_pair};
use hcs::rand_source::RandomSource;

#[test]
fn paillier_round_trip_across_key_sizes() {
    for bits in [256, 512] {
        let mut r = RandomSource::new_with_seed(bits as u64);
        let (pk, vk) = generate_key_pair(&mut r, bits).unwrap();

        for m in [Integer::from(0), Integer::from(1), Integer::from(123456789)] {
            let (c, _u) = paillier::encrypt(&pk, &mut r, &m);
            assert_eq!(paillier::decrypt(&vk, &c).unwrap(), m);

            let reenc = paillier::reencrypt(&pk, &mut r, &c);
            assert_ne!(reenc, c);
            assert_eq!(paillier::decrypt(&vk, &reenc).unwrap(), m);
        }
    }
}

#[test]
fn paillier_homomorphic_laws_hold_jointly() {
    let mut r = RandomSource::new_with_seed(7);
    let (pk, vk) = generate_key_pair(&mut r, 256).unwrap();

    let m1 = Integer::from(15634);
    let m2 = Integer::from(1640);
    let k = Integer::from(3);

    let (c1, _) = paillier::encrypt(&pk, &mut r, &m1);
    let (c2, _) = paillier::encrypt(&pk, &mut r, &m2);

    let summed = paillier::ee_add(&pk, &c1, &c2);
    assert_eq!(
        paillier::decrypt(&vk, &summed).unwrap(),
        Integer::from(&m1 + &m2)
    );

    let plain_added = paillier::ep_add(&pk, &c1, &m2);
    assert_eq!(
        paillier::decrypt(&vk, &plain_added).unwrap(),
        Integer::from(&m1 + &m2)
    );

    let scaled = paillier::ep_mul(&pk, &c1, &k);
    assert_eq!(
        paillier::decrypt(&vk, &scaled).unwrap(),
        Integer::from(&m1 * &k)
    );
}

#[test]
fn damgard_jurik_round_trip_for_s_in_1_to_3() {
    for s in 1..=3usize {
        let mut r = RandomSource::new_with_seed(s as u64);
        let (pk, vk) = dj_generate_key_pair(&mut r, 256, s).unwrap();

        let m = Integer::from(987654321u64);
        let (c, _u) = damgard_jurik::encrypt(&pk, &mut r, &m);
        assert_eq!(damgard_jurik::decrypt(&vk, &c).unwrap(), m);
    }
}
