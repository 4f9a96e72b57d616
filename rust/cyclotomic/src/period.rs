//! Gaussian periods: the subring of Z[ω] fixed by the subgroup of index e
//! of the Galois group.
//!
//! For f | n - 1 and e = (n - 1) / f, the period
//!
//! ```text
//! η_i = Σ_{j ≡ i mod e} ω^(g^j),   i = 0..e-1,
//! ```
//!
//! is a sum of f conjugates, and η_0, ..., η_{e-1} is a Z-basis of the fixed
//! ring. Since η_0 + ... + η_{e-1} = -1, the all-(-1) vector represents 1.

use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::{CyclotomicError, Result};
use crate::ring::{CyclotomicInteger, CyclotomicRing};

/// Multiplication table and minimal polynomial for periods of length f.
#[derive(Debug)]
pub struct PeriodRing {
    ring: Arc<CyclotomicRing>,
    f: usize,
    e: usize,
    /// η_0 · η_i = Σ_k table[i][k] η_k
    table: Vec<Vec<i64>>,
    /// Π (x - η_i), lowest degree first
    min_poly: Vec<BigInt>,
}

impl PeriodRing {
    /// Periods of length `f` over `ring`; `f` must divide n - 1.
    pub fn new(ring: &Arc<CyclotomicRing>, f: usize) -> Result<Arc<Self>> {
        let n = ring.degree();
        if f == 0 || (n - 1) % f != 0 {
            return Err(CyclotomicError::InvalidPeriodLength { f, n_minus_1: n - 1 });
        }
        let e = (n - 1) / f;

        // η_0 η_i = Σ_{j ≡ i mod e} Σ_{l ≡ 0 mod e} ω^(g^l + g^j), and
        // summing over l turns each 1 + g^(j-l) back into a period. A
        // vanishing exponent contributes f copies of 1 = -(η_0 + ... + η_{e-1}).
        let mut table = vec![vec![0i64; e]; e];
        for (i, row) in table.iter_mut().enumerate() {
            for j in (i..n - 1).step_by(e) {
                match ring.discrete_log(1 + ring.generator_power(j)) {
                    Some(k) => row[k % e] += 1,
                    None => row.iter_mut().for_each(|w| *w -= f as i64),
                }
            }
        }

        let min_poly = minimal_polynomial(ring, e);
        Ok(Arc::new(Self {
            ring: ring.clone(),
            f,
            e,
            table,
            min_poly,
        }))
    }

    pub fn cyclotomic_ring(&self) -> &Arc<CyclotomicRing> {
        &self.ring
    }

    /// Length f of each period.
    pub fn period_length(&self) -> usize {
        self.f
    }

    /// Number e of distinct periods.
    pub fn num_periods(&self) -> usize {
        self.e
    }

    pub fn table(&self) -> &[Vec<i64>] {
        &self.table
    }

    /// Monic integer coefficients of the minimal polynomial of η_0.
    pub fn min_poly(&self) -> &[BigInt] {
        &self.min_poly
    }
}

/// η_i written out in the power basis of Z[ω].
fn eta(ring: &Arc<CyclotomicRing>, e: usize, i: usize) -> CyclotomicInteger {
    let mut coeffs = vec![BigInt::zero(); ring.degree()];
    for j in (i % e..ring.degree() - 1).step_by(e) {
        coeffs[ring.generator_power(j)] = BigInt::from(1);
    }
    CyclotomicInteger::new(ring, coeffs)
}

/// Expand Π_{i<e} (x - η_i) in Z[ω]; the coefficients are symmetric
/// functions of the conjugates and hence rational.
fn minimal_polynomial(ring: &Arc<CyclotomicRing>, e: usize) -> Vec<BigInt> {
    let mut poly = vec![CyclotomicInteger::one(ring)];
    for i in 0..e {
        let root = eta(ring, e, i);
        let mut next = vec![CyclotomicInteger::zero(ring); poly.len() + 1];
        for (k, c) in poly.iter().enumerate() {
            next[k + 1] = &next[k + 1] + c;
            next[k] = &next[k] - &(c * &root);
        }
        poly = next;
    }
    poly.iter()
        .map(|c| {
            debug_assert!(c.rational().is_some());
            c.coefficient(0).clone()
        })
        .collect()
}

/// An element Σ c_i η_i of the period subring.
#[derive(Debug, Clone)]
pub struct Period {
    ring: Arc<PeriodRing>,
    coeffs: Vec<BigInt>,
}

impl Period {
    pub fn new(ring: &Arc<PeriodRing>, mut coeffs: Vec<BigInt>) -> Self {
        coeffs.resize(ring.e, BigInt::zero());
        Self {
            ring: ring.clone(),
            coeffs,
        }
    }

    /// The basis period η_i, `i` taken mod e.
    pub fn basis(ring: &Arc<PeriodRing>, i: usize) -> Self {
        let mut coeffs = vec![BigInt::zero(); ring.e];
        coeffs[i % ring.e] = BigInt::from(1);
        Self::new(ring, coeffs)
    }

    /// The rational integer k, i.e. -k · (η_0 + ... + η_{e-1}).
    pub fn from_int(ring: &Arc<PeriodRing>, k: impl Into<BigInt>) -> Self {
        let k = -k.into();
        Self::new(ring, vec![k; ring.e])
    }

    pub fn period_ring(&self) -> &Arc<PeriodRing> {
        &self.ring
    }

    pub fn coefficients(&self) -> &[BigInt] {
        &self.coeffs
    }

    fn check_ring(&self, other: &Self) {
        assert!(
            self.ring.e == other.ring.e && self.ring.ring.degree() == other.ring.ring.degree(),
            "periods of different subrings"
        );
    }

    /// Bilinear product through the table:
    /// η_i η_j = Σ_k table[(j - i) mod e][k] η_{(k + i) mod e}.
    fn multiply(&self, other: &Self) -> Self {
        self.check_ring(other);
        let e = self.ring.e;
        let mut c = vec![BigInt::zero(); e];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                if b.is_zero() {
                    continue;
                }
                let ab = a * b;
                let row = &self.ring.table[(j + e - i) % e];
                for (k, &w) in row.iter().enumerate() {
                    if w != 0 {
                        c[(k + i) % e] += &ab * w;
                    }
                }
            }
        }
        Self::new(&self.ring, c)
    }

    /// Cyclic shift η_j -> η_{j+i}, the action of σ^i.
    pub fn conjugate(&self, i: usize) -> Self {
        let e = self.ring.e;
        let mut c = vec![BigInt::zero(); e];
        for (j, a) in self.coeffs.iter().enumerate() {
            c[(j + i) % e] = a.clone();
        }
        Self::new(&self.ring, c)
    }

    /// `Some(k)` when all coordinates are equal, i.e. the element is the
    /// rational integer k.
    pub fn rational(&self) -> Option<BigInt> {
        let first = &self.coeffs[0];
        if self.coeffs.iter().all(|c| c == first) {
            Some(-first)
        } else {
            None
        }
    }

    pub fn is_rational(&self) -> bool {
        self.rational().is_some()
    }

    /// Product of the e conjugates, a rational integer (possibly negative).
    pub fn norm(&self) -> BigInt {
        let product = (1..self.ring.e).fold(self.clone(), |acc, i| acc.multiply(&self.conjugate(i)));
        debug_assert!(product.is_rational());
        -&product.coeffs[0]
    }

    /// Replicate coordinate i over the exponents g^j with j ≡ i mod e.
    pub fn to_cyclotomic(&self) -> CyclotomicInteger {
        let ring = &self.ring.ring;
        let e = self.ring.e;
        let mut coeffs = vec![BigInt::zero(); ring.degree()];
        for j in 0..ring.degree() - 1 {
            coeffs[ring.generator_power(j)] = self.coeffs[j % e].clone();
        }
        CyclotomicInteger::new(ring, coeffs)
    }
}

impl PartialEq for Period {
    fn eq(&self, other: &Self) -> bool {
        self.ring.e == other.ring.e && self.coeffs == other.coeffs
    }
}

impl Eq for Period {}

impl<'a> Add<&'a Period> for &'a Period {
    type Output = Period;

    fn add(self, other: &Period) -> Period {
        self.check_ring(other);
        let c = self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a + b).collect();
        Period::new(&self.ring, c)
    }
}

impl<'a> Sub<&'a Period> for &'a Period {
    type Output = Period;

    fn sub(self, other: &Period) -> Period {
        self.check_ring(other);
        let c = self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a - b).collect();
        Period::new(&self.ring, c)
    }
}

impl<'a> Mul<&'a Period> for &'a Period {
    type Output = Period;

    fn mul(self, other: &Period) -> Period {
        self.multiply(other)
    }
}

impl Neg for &Period {
    type Output = Period;

    fn neg(self) -> Period {
        Period::new(&self.ring, self.coeffs.iter().map(|c| -c).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periods(n: u64, f: usize) -> Arc<PeriodRing> {
        let ring = CyclotomicRing::new(n).unwrap();
        PeriodRing::new(&ring, f).unwrap()
    }

    fn ints(c: &[i64]) -> Vec<BigInt> {
        c.iter().map(|&v| BigInt::from(v)).collect()
    }

    #[test]
    fn test_rejects_non_divisor() {
        let ring = CyclotomicRing::new(7).unwrap();
        for f in [0usize, 4, 5, 7] {
            assert!(matches!(
                PeriodRing::new(&ring, f),
                Err(CyclotomicError::InvalidPeriodLength { .. })
            ));
        }
        assert!(PeriodRing::new(&ring, 3).is_ok());
    }

    #[test]
    fn test_quadratic_periods_of_seven() {
        // η_0 = ω + ω^2 + ω^4 satisfies x^2 + x + 2.
        let pr = periods(7, 3);
        assert_eq!(pr.num_periods(), 2);
        assert_eq!(pr.min_poly(), ints(&[2, 1, 1]).as_slice());
        let eta0 = Period::basis(&pr, 0).to_cyclotomic();
        assert_eq!(eta0, CyclotomicInteger::from_coefficients(pr.cyclotomic_ring(), &[0, 1, 1, 0, 1]));
    }

    #[test]
    fn test_quadratic_periods_of_five() {
        // η_0 = ω + ω^4 satisfies x^2 + x - 1.
        let pr = periods(5, 2);
        assert_eq!(pr.min_poly(), ints(&[-1, 1, 1]).as_slice());
    }

    #[test]
    fn test_product_matches_cyclotomic_product() {
        for (n, f) in [(7u64, 1usize), (7, 2), (13, 3), (13, 2), (11, 5), (19, 6)] {
            let pr = periods(n, f);
            let e = pr.num_periods();
            for i in 0..e {
                for j in 0..e {
                    let a = Period::basis(&pr, i);
                    let b = Period::basis(&pr, j);
                    assert_eq!(
                        (&a * &b).to_cyclotomic(),
                        &a.to_cyclotomic() * &b.to_cyclotomic(),
                        "n = {}, f = {}, i = {}, j = {}",
                        n,
                        f,
                        i,
                        j
                    );
                }
            }
        }
    }

    #[test]
    fn test_rational_representation() {
        let pr = periods(13, 4);
        let one = Period::from_int(&pr, 1);
        assert_eq!(one.rational(), Some(BigInt::from(1)));
        assert_eq!(one.to_cyclotomic(), CyclotomicInteger::one(pr.cyclotomic_ring()));
        let x = Period::new(&pr, ints(&[2, -1, 0]));
        assert_eq!(&x * &one, x);
        assert!(!x.is_rational());
    }

    #[test]
    fn test_norm_agrees_with_cyclotomic_norm() {
        // N_{Q(ω)/Q}(y) = N_periods(y)^f
        let pr = periods(13, 3);
        let y = Period::new(&pr, ints(&[3, -1, 0, 2]));
        let norm = y.norm();
        assert_eq!(y.to_cyclotomic().norm(), norm.pow(3));
        let product = (0..4).fold(Period::from_int(&pr, 1), |acc, i| &acc * &y.conjugate(i));
        assert_eq!(product.rational(), Some(norm));
    }

    #[test]
    fn test_conjugation_matches_galois_action() {
        let pr = periods(13, 3);
        let y = Period::new(&pr, ints(&[1, 5, -2, 0]));
        for i in 0..4 {
            assert_eq!(y.conjugate(i).to_cyclotomic(), y.to_cyclotomic().conjugate(i));
        }
        assert_eq!(y.conjugate(4), y);
    }

    #[test]
    fn test_min_poly_vanishes_at_eta() {
        let pr = periods(13, 2);
        let ring = pr.cyclotomic_ring();
        let eta0 = Period::basis(&pr, 0).to_cyclotomic();
        let value = pr
            .min_poly()
            .iter()
            .rev()
            .fold(CyclotomicInteger::zero(ring), |acc, c| {
                &(&acc * &eta0) + &CyclotomicInteger::from_int(ring, c.clone())
            });
        assert!(value.is_zero());
    }
}
