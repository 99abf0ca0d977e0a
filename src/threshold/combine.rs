//! Lagrange-based combination of partial decryptions.
//!
//! Computes the Lagrange coefficient over the *actual* set of present
//! indices, so any `w`-or-more subset combines correctly regardless of
//! which authorities happen to be present or what order they arrive in.

use rug::Integer;

use crate::error::{Error, Result};

use super::ThresholdPublicKey;

/// Combine `>= w` partial decryptions into the plaintext.
///
/// `shares` is a sparse list of `(external_index, c_i)` pairs with
/// `external_index` in `0..l`; absent authorities are simply omitted.
pub fn share_combine(pk: &ThresholdPublicKey, shares: &[(usize, Integer)]) -> Result<Integer> {
    if shares.len() < pk.w {
        return Err(Error::QuorumNotMet);
    }

    let present: Vec<usize> = shares.iter().map(|(i, _)| *i).collect();

    let mut product = Integer::from(1);
    for (i, ci) in shares {
        let i = *i as i64;

        let mut numerator = pk.delta.clone();
        let mut denominator = Integer::from(1);
        for &j in &present {
            if j as i64 == i {
                continue;
            }
            numerator *= Integer::from(j as i64 + 1);
            denominator *= Integer::from(j as i64 - i);
        }

        // Exact by construction: delta = l! is divisible by every
        // (j - i) product of at most l - 1 distinct nonzero factors each
        // of magnitude < l.
        let remainder = Integer::from(&numerator % &denominator);
        if remainder != 0 {
            return Err(Error::ShareCombineFailed);
        }
        let lambda = Integer::from(&numerator / &denominator);

        let exponent = Integer::from(2 * lambda.clone().abs());
        let mut t = ci
            .clone()
            .pow_mod(&exponent, &pk.nn)
            .map_err(|_| Error::ShareCombineFailed)?;
        if lambda.cmp0() == std::cmp::Ordering::Less {
            t = t.invert(&pk.nn).map_err(|_| Error::ShareCombineFailed)?;
        }

        product = Integer::from(&product * &t).rem_euc(pk.nn.clone());
    }

    // x = L(product) = (product - 1) / n mod n.
    let numerator = Integer::from(&product - 1);
    let remainder = Integer::from(&numerator % &pk.n);
    if remainder != 0 {
        return Err(Error::ShareCombineFailed);
    }
    let x = Integer::from(&numerator / &pk.n).rem_euc(pk.n.clone());

    let four_delta_sq = Integer::from(4 * Integer::from(&pk.delta * &pk.delta));
    let inv = four_delta_sq
        .invert(&pk.n)
        .map_err(|_| Error::ShareCombineFailed)?;

    Ok(Integer::from(&x * &inv).rem_euc(pk.n.clone()))
}
