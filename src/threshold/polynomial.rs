//! The dealer's secret-sharing polynomial. Ephemeral: constructed, evaluated once per
//! authority, then dropped (and zeroized) by [`ThresholdPrivateKey::deal`].

use rug::Integer;
use zeroize::Zeroize;

use crate::number_util;
use crate::rand_source::{random_below, RandomSource};

/// `P(X) = d + a_1 X + ... + a_{w-1} X^{w-1}`, coefficients in `Z_{nm}`,
/// `a_0 = d`.
pub struct Polynomial {
    coeffs: Vec<Integer>,
}

impl Polynomial {
    /// Samples `a_1..a_{w-1}` uniformly in `Z_{nm}`; `a_0` is fixed to `d`.
    pub fn sample(r: &mut RandomSource, d: &Integer, nm: &Integer, w: usize) -> Self {
        let mut coeffs = Vec::with_capacity(w);
        coeffs.push(d.clone());
        r.with_rand_state(|rand| {
            for _ in 1..w {
                coeffs.push(random_below(rand, nm));
            }
        });
        Self { coeffs }
    }

    /// `P(x) mod nm` via Horner's method.
    pub fn evaluate(&self, x: u64, nm: &Integer) -> Integer {
        let mut acc = Integer::new();
        for c in self.coeffs.iter().rev() {
            acc = Integer::from(&acc * x) + c;
            acc = acc.rem_euc(nm.clone());
        }
        acc
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }
}

impl Zeroize for Polynomial {
    fn zeroize(&mut self) {
        for c in &mut self.coeffs {
            number_util::zeroize(c);
        }
    }
}

impl Drop for Polynomial {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_at_zero_returns_constant_term() {
        let mut r = RandomSource::new_with_seed(1);
        let d = Integer::from(777);
        let nm = Integer::from(1_000_003u64 * 999_983u64);
        let poly = Polynomial::sample(&mut r, &d, &nm, 3);
        assert_eq!(poly.evaluate(0, &nm), d);
        assert_eq!(poly.degree(), 2);
    }

    #[test]
    fn evaluate_is_deterministic_for_fixed_coefficients() {
        let mut r = RandomSource::new_with_seed(2);
        let nm = Integer::from(97 * 89);
        let poly = Polynomial::sample(&mut r, &Integer::from(5), &nm, 2);
        let a = poly.evaluate(3, &nm);
        let b = poly.evaluate(3, &nm);
        assert_eq!(a, b);
    }
}
