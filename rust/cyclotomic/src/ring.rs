//! The ring Z[ω] of cyclotomic integers, ω a primitive n-th root of unity
//! for an odd prime n.
//!
//! Elements are stored as n integer coefficients of 1, ω, ..., ω^(n-1) in a
//! normal form where the coefficient of ω^(n-1) is zero. Since
//! 1 + ω + ... + ω^(n-1) = 0, every element has exactly one such form, so
//! equality and hashing work on the coefficient vector directly.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

use factoring_core::small;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rand::Rng;

use crate::error::{CyclotomicError, Result};

/// Galois tables for a fixed prime degree n.
///
/// With g a primitive root mod n, the automorphism σ^i sends ω to ω^(g^i);
/// σ generates the cyclic Galois group of order n - 1.
#[derive(Debug)]
pub struct CyclotomicRing {
    n: usize,
    generator: usize,
    /// g_pow[j] = g^j mod n, j < n - 1
    g_pow: Vec<usize>,
    /// log_g[g^j mod n] = j; log_g[0] is unused
    log_g: Vec<usize>,
    /// multiplicative order of a mod n; order[0] = 1
    order: Vec<usize>,
    /// cjind[i][j] = j * g^i mod n
    cjind: Vec<Vec<usize>>,
}

impl CyclotomicRing {
    /// Build the tables for degree `n`, which must be an odd prime.
    pub fn new(n: u64) -> Result<Arc<Self>> {
        if n < 3 || n % 2 == 0 || !small::is_prime_u64(n) {
            return Err(CyclotomicError::InvalidDegree(n));
        }
        let generator = small::primitive_root(n) as usize;
        let n = usize::try_from(n).map_err(|_| CyclotomicError::InvalidDegree(n))?;
        let n1 = n - 1;

        let mut g_pow = vec![0usize; n1];
        let mut log_g = vec![0usize; n];
        let mut order = vec![1usize; n];
        let mut cjind = Vec::with_capacity(n1);
        let mut a = 1usize;
        for i in 0..n1 {
            g_pow[i] = a;
            log_g[a] = i;
            order[a] = n1 / i.gcd(&n1);
            cjind.push((0..n).map(|j| j * a % n).collect());
            a = a * generator % n;
        }

        Ok(Arc::new(Self {
            n,
            generator,
            g_pow,
            log_g,
            order,
            cjind,
        }))
    }

    /// The prime degree n.
    pub fn degree(&self) -> usize {
        self.n
    }

    /// The primitive root g used to index the Galois group.
    pub fn generator(&self) -> usize {
        self.generator
    }

    /// g^j mod n, with j taken mod n - 1.
    pub fn generator_power(&self, j: usize) -> usize {
        self.g_pow[j % (self.n - 1)]
    }

    /// Discrete logarithm of `a` to base g; `None` when n divides a.
    pub fn discrete_log(&self, a: usize) -> Option<usize> {
        match a % self.n {
            0 => None,
            r => Some(self.log_g[r]),
        }
    }

    /// Multiplicative order of `a` mod n (1 when n divides a).
    pub fn order(&self, a: u64) -> usize {
        self.order[(a % self.n as u64) as usize]
    }

    /// Multiplicative order of a big integer mod n.
    pub fn order_of(&self, a: &BigUint) -> usize {
        let r = (a % BigUint::from(self.n)).to_usize().unwrap_or(0);
        self.order[r]
    }
}

/// An element of Z[ω].
#[derive(Clone)]
pub struct CyclotomicInteger {
    ring: Arc<CyclotomicRing>,
    coeffs: Vec<BigInt>,
}

impl CyclotomicInteger {
    /// Element with the given coefficients of ω^0, ω^1, ...; indices wrap mod n.
    pub fn new(ring: &Arc<CyclotomicRing>, coeffs: Vec<BigInt>) -> Self {
        let n = ring.n;
        let mut folded = vec![BigInt::zero(); n];
        for (i, c) in coeffs.into_iter().enumerate() {
            folded[i % n] += c;
        }
        Self::from_raw(ring.clone(), folded)
    }

    pub fn from_coefficients(ring: &Arc<CyclotomicRing>, coeffs: &[i64]) -> Self {
        Self::new(ring, coeffs.iter().map(|&c| BigInt::from(c)).collect())
    }

    pub fn from_int(ring: &Arc<CyclotomicRing>, k: impl Into<BigInt>) -> Self {
        let mut coeffs = vec![BigInt::zero(); ring.n];
        coeffs[0] = k.into();
        Self {
            ring: ring.clone(),
            coeffs,
        }
    }

    pub fn zero(ring: &Arc<CyclotomicRing>) -> Self {
        Self::from_int(ring, 0)
    }

    pub fn one(ring: &Arc<CyclotomicRing>) -> Self {
        Self::from_int(ring, 1)
    }

    pub fn omega(ring: &Arc<CyclotomicRing>) -> Self {
        Self::from_coefficients(ring, &[0, 1])
    }

    /// 1 - ω, the unique prime above n; its norm is n.
    pub fn ramified_prime(ring: &Arc<CyclotomicRing>) -> Self {
        Self::from_coefficients(ring, &[1, -1])
    }

    /// Random element whose free coefficients lie in (-bound, bound).
    ///
    /// Only the first n - 1 coefficients are sampled; the last one is fixed
    /// by the relation 1 + ω + ... + ω^(n-1) = 0.
    pub fn random_bounded(ring: &Arc<CyclotomicRing>, bound: u64, rng: &mut impl Rng) -> Self {
        let b = i64::try_from(bound.saturating_sub(1)).unwrap_or(i64::MAX);
        let mut coeffs: Vec<BigInt> = (0..ring.n - 1)
            .map(|_| BigInt::from(rng.gen_range(-b..=b)))
            .collect();
        coeffs.push(BigInt::zero());
        Self {
            ring: ring.clone(),
            coeffs,
        }
    }

    fn from_raw(ring: Arc<CyclotomicRing>, coeffs: Vec<BigInt>) -> Self {
        let mut a = Self { ring, coeffs };
        a.normalize();
        a
    }

    /// Subtract the top coefficient from all coefficients.
    fn normalize(&mut self) {
        let top = self.coeffs[self.ring.n - 1].clone();
        if !top.is_zero() {
            for c in self.coeffs.iter_mut() {
                *c -= &top;
            }
        }
    }

    pub fn ring(&self) -> &Arc<CyclotomicRing> {
        &self.ring
    }

    pub fn degree(&self) -> usize {
        self.ring.n
    }

    pub fn coefficients(&self) -> &[BigInt] {
        &self.coeffs
    }

    /// Coefficient of ω^i in normal form; `i` is taken mod n.
    pub fn coefficient(&self, i: usize) -> &BigInt {
        &self.coeffs[i % self.ring.n]
    }

    /// Set the coefficient of ω^i, `i` taken mod n.
    ///
    /// ω^(n-1) is not a free basis element: assigning it adds c·ω^(n-1) and
    /// re-reduces, which leaves -c on every lower coefficient.
    pub fn set_coefficient(&mut self, i: usize, c: impl Into<BigInt>) {
        let n = self.ring.n;
        let i = i % n;
        let c = c.into();
        if i == n - 1 {
            for x in self.coeffs[..n - 1].iter_mut() {
                *x -= &c;
            }
        } else {
            self.coeffs[i] = c;
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_zero())
    }

    /// `Some(k)` if this element is the rational integer k.
    pub fn rational(&self) -> Option<BigInt> {
        if self.coeffs[1..].iter().all(|c| c.is_zero()) {
            Some(self.coeffs[0].clone())
        } else {
            None
        }
    }

    fn check_ring(&self, other: &Self) {
        assert_eq!(
            self.ring.n, other.ring.n,
            "cyclotomic integers of different degrees"
        );
    }

    fn multiply(&self, other: &Self) -> Self {
        self.check_ring(other);
        let n = self.ring.n;
        let mut c = vec![BigInt::zero(); n];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                if !b.is_zero() {
                    c[(i + j) % n] += a * b;
                }
            }
        }
        Self::from_raw(self.ring.clone(), c)
    }

    pub fn square(&self) -> Self {
        self.multiply(self)
    }

    pub fn pow(&self, exp: u32) -> Self {
        let mut result = Self::one(&self.ring);
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = result.multiply(&base);
            }
            e >>= 1;
            if e > 0 {
                base = base.square();
            }
        }
        result
    }

    /// Multiply every coefficient by the integer `k`.
    pub fn scale(&self, k: &BigInt) -> Self {
        Self {
            ring: self.ring.clone(),
            coeffs: self.coeffs.iter().map(|c| c * k).collect(),
        }
    }

    /// σ^i(a): replace ω by ω^(g^i). `i` is taken mod n - 1.
    pub fn conjugate(&self, i: usize) -> Self {
        let n = self.ring.n;
        let index = &self.ring.cjind[i % (n - 1)];
        let mut c = vec![BigInt::zero(); n];
        for (j, a) in self.coeffs.iter().enumerate() {
            c[index[j]] = a.clone();
        }
        Self::from_raw(self.ring.clone(), c)
    }

    /// a · σ(a) · ... · σ^(k-1)(a), by binary splitting.
    pub fn conjugate_product(&self, k: usize) -> Self {
        match k {
            0 => Self::one(&self.ring),
            1 => self.clone(),
            _ if k % 2 == 0 => {
                let half = self.conjugate_product(k / 2);
                let shifted = half.conjugate(k / 2);
                half.multiply(&shifted)
            }
            _ => self.conjugate_product(k - 1).multiply(&self.conjugate(k - 1)),
        }
    }

    /// Product of all n - 1 conjugates. Never negative for odd n.
    pub fn norm(&self) -> BigInt {
        let p = self.conjugate_product(self.ring.n - 1);
        debug_assert!(p.rational().is_some());
        p.coeffs[0].clone()
    }

    /// Greatest common divisor of the coefficients; 0 for the zero element.
    pub fn content(&self) -> BigInt {
        self.coeffs.iter().fold(BigInt::zero(), |acc, c| acc.gcd(c))
    }

    /// This element divided by its content.
    pub fn primitive_part(&self) -> Self {
        let d = self.content();
        if d.is_zero() || d.is_one() {
            return self.clone();
        }
        Self {
            ring: self.ring.clone(),
            coeffs: self.coeffs.iter().map(|c| c / &d).collect(),
        }
    }

    /// Exact quotient `self / divisor`, or `None` if it is not in Z[ω].
    ///
    /// Multiplying both sides by t = σ(b)···σ^(n-2)(b) turns the divisor into
    /// the rational integer N(b), so divisibility reduces to divisibility of
    /// every coefficient of self·t by N(b).
    pub fn divide(&self, divisor: &Self) -> Option<Self> {
        self.check_ring(divisor);
        if divisor.is_zero() {
            return None;
        }
        let n = self.ring.n;
        let t = divisor.conjugate_product(n - 2).conjugate(1);
        let norm = divisor.multiply(&t).coeffs[0].clone();
        let scaled = self.multiply(&t);
        if scaled.coeffs.iter().any(|c| !c.is_multiple_of(&norm)) {
            return None;
        }
        Some(Self {
            ring: self.ring.clone(),
            coeffs: scaled.coeffs.iter().map(|c| c / &norm).collect(),
        })
    }

    pub fn is_divisible_by(&self, divisor: &Self) -> bool {
        self.divide(divisor).is_some()
    }

    /// Units are exactly the elements of norm 1.
    pub fn is_unit(&self) -> bool {
        self.norm().is_one()
    }

    /// True if `self = u · other` for a unit u.
    pub fn is_associate(&self, other: &Self) -> bool {
        self.divide(other).map_or(false, |q| q.is_unit())
    }

    /// Largest absolute coefficient in normal form.
    pub fn height(&self) -> BigInt {
        self.coeffs
            .iter()
            .map(|c| c.abs())
            .max()
            .unwrap_or_else(BigInt::zero)
    }
}

impl PartialEq for CyclotomicInteger {
    fn eq(&self, other: &Self) -> bool {
        self.ring.n == other.ring.n && self.coeffs == other.coeffs
    }
}

impl Eq for CyclotomicInteger {}

impl Hash for CyclotomicInteger {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ring.n.hash(state);
        self.coeffs.hash(state);
    }
}

impl fmt::Debug for CyclotomicInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CyclotomicInteger(n={}, {})", self.ring.n, self)
    }
}

impl fmt::Display for CyclotomicInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .coeffs
            .iter()
            .rposition(|c| !c.is_zero())
            .map_or(1, |i| i + 1);
        write!(f, "[")?;
        for (i, c) in self.coeffs[..len].iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}

impl<'a> Add<&'a CyclotomicInteger> for &'a CyclotomicInteger {
    type Output = CyclotomicInteger;

    fn add(self, other: &CyclotomicInteger) -> CyclotomicInteger {
        self.check_ring(other);
        CyclotomicInteger {
            ring: self.ring.clone(),
            coeffs: self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a + b).collect(),
        }
    }
}

impl<'a> Sub<&'a CyclotomicInteger> for &'a CyclotomicInteger {
    type Output = CyclotomicInteger;

    fn sub(self, other: &CyclotomicInteger) -> CyclotomicInteger {
        self.check_ring(other);
        CyclotomicInteger {
            ring: self.ring.clone(),
            coeffs: self.coeffs.iter().zip(&other.coeffs).map(|(a, b)| a - b).collect(),
        }
    }
}

impl<'a> Mul<&'a CyclotomicInteger> for &'a CyclotomicInteger {
    type Output = CyclotomicInteger;

    fn mul(self, other: &CyclotomicInteger) -> CyclotomicInteger {
        self.multiply(other)
    }
}

impl Neg for &CyclotomicInteger {
    type Output = CyclotomicInteger;

    fn neg(self) -> CyclotomicInteger {
        CyclotomicInteger {
            ring: self.ring.clone(),
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }
}

impl Neg for CyclotomicInteger {
    type Output = CyclotomicInteger;

    fn neg(self) -> CyclotomicInteger {
        -&self
    }
}

impl Add for CyclotomicInteger {
    type Output = CyclotomicInteger;

    fn add(self, other: CyclotomicInteger) -> CyclotomicInteger {
        &self + &other
    }
}

impl Sub for CyclotomicInteger {
    type Output = CyclotomicInteger;

    fn sub(self, other: CyclotomicInteger) -> CyclotomicInteger {
        &self - &other
    }
}

impl Mul for CyclotomicInteger {
    type Output = CyclotomicInteger;

    fn mul(self, other: CyclotomicInteger) -> CyclotomicInteger {
        self.multiply(&other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cyc(ring: &Arc<CyclotomicRing>, c: &[i64]) -> CyclotomicInteger {
        CyclotomicInteger::from_coefficients(ring, c)
    }

    #[test]
    fn test_ring_rejects_bad_degrees() {
        for n in [0u64, 1, 2, 4, 9, 15, 21] {
            assert!(
                matches!(CyclotomicRing::new(n), Err(CyclotomicError::InvalidDegree(m)) if m == n),
                "n = {}",
                n
            );
        }
    }

    #[test]
    fn test_ring_tables() {
        let ring = CyclotomicRing::new(7).unwrap();
        assert_eq!(ring.generator(), 3);
        let powers: Vec<usize> = (0..6).map(|j| ring.generator_power(j)).collect();
        assert_eq!(powers, vec![1, 3, 2, 6, 4, 5]);
        for j in 0..6 {
            assert_eq!(ring.discrete_log(ring.generator_power(j)), Some(j));
        }
        assert_eq!(ring.discrete_log(14), None);
        assert_eq!(ring.order(2), 3);
        assert_eq!(ring.order(6), 2);
        assert_eq!(ring.order(1), 1);
        assert_eq!(ring.order(7), 1);
        assert_eq!(ring.order_of(&BigUint::from(29u32)), 1);
        assert_eq!(ring.order_of(&BigUint::from(13u32)), 2);
    }

    #[test]
    fn test_normal_form() {
        let ring = CyclotomicRing::new(5).unwrap();
        // ω^4 = -1 - ω - ω^2 - ω^3
        let a = cyc(&ring, &[0, 0, 0, 0, 1]);
        assert_eq!(a, cyc(&ring, &[-1, -1, -1, -1]));
        // Indices wrap: ω^5 = 1
        assert_eq!(cyc(&ring, &[0, 0, 0, 0, 0, 3]), CyclotomicInteger::from_int(&ring, 3));
        assert_eq!(
            cyc(&ring, &[1, 1, 1, 1, 1]),
            CyclotomicInteger::zero(&ring)
        );
    }

    #[test]
    fn test_set_top_coefficient_reduces() {
        let ring = CyclotomicRing::new(5).unwrap();
        let mut a = cyc(&ring, &[2, 0, 1]);
        a.set_coefficient(4, 3);
        assert_eq!(a, cyc(&ring, &[-1, -3, -2, -3]));
        assert!(a.coefficient(4).is_zero());
        a.set_coefficient(6, 10);
        assert_eq!(a.coefficient(1), &BigInt::from(10));
    }

    #[test]
    fn test_omega_has_order_n() {
        let ring = CyclotomicRing::new(11).unwrap();
        let w = CyclotomicInteger::omega(&ring);
        assert_eq!(w.pow(11), CyclotomicInteger::one(&ring));
        assert_ne!(w.pow(5), CyclotomicInteger::one(&ring));
        assert!(w.is_unit());
    }

    #[test]
    fn test_pow_matches_repeated_multiplication() {
        let ring = CyclotomicRing::new(7).unwrap();
        let a = cyc(&ring, &[1, -2, 0, 3]);
        let mut expected = CyclotomicInteger::one(&ring);
        for k in 0..6u32 {
            assert_eq!(a.pow(k), expected);
            expected = &expected * &a;
        }
        assert_eq!(a.square(), &a * &a);
    }

    #[test]
    fn test_norms_of_special_elements() {
        for n in [3u64, 5, 7, 13, 19] {
            let ring = CyclotomicRing::new(n).unwrap();
            assert_eq!(
                CyclotomicInteger::ramified_prime(&ring).norm(),
                BigInt::from(n)
            );
            let k = CyclotomicInteger::from_int(&ring, -3);
            assert_eq!(k.norm(), BigInt::from(3).pow((n - 1) as u32));
            assert!(CyclotomicInteger::zero(&ring).norm().is_zero());
        }
    }

    #[test]
    fn test_norm_is_product_of_conjugates() {
        let ring = CyclotomicRing::new(7).unwrap();
        let a = cyc(&ring, &[2, 1, 0, -1, 3]);
        let direct = (1..6).fold(a.clone(), |acc, i| &acc * &a.conjugate(i));
        assert_eq!(direct.rational(), Some(a.norm()));
        assert_eq!(a.conjugate_product(6).rational(), Some(a.norm()));
    }

    #[test]
    fn test_conjugation_composes() {
        let ring = CyclotomicRing::new(7).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let a = CyclotomicInteger::random_bounded(&ring, 4, &mut rng);
        assert_eq!(a.conjugate(0), a);
        for i in 0..6 {
            for j in 0..6 {
                assert_eq!(a.conjugate(i).conjugate(j), a.conjugate((i + j) % 6));
            }
        }
        // σ sends ω to ω^g
        assert_eq!(
            CyclotomicInteger::omega(&ring).conjugate(1),
            cyc(&ring, &[0, 0, 0, 1])
        );
    }

    #[test]
    fn test_divide() {
        let ring = CyclotomicRing::new(5).unwrap();
        let a = cyc(&ring, &[3, -1, 2]);
        let b = cyc(&ring, &[1, 1, 0, -2]);
        let prod = &a * &b;
        assert_eq!(prod.divide(&b), Some(a.clone()));
        assert_eq!(prod.divide(&a), Some(b.clone()));
        assert!(prod.is_divisible_by(&a));
        assert_eq!(a.divide(&CyclotomicInteger::zero(&ring)), None);
        assert_eq!(
            CyclotomicInteger::one(&ring).divide(&CyclotomicInteger::from_int(&ring, 2)),
            None
        );
        assert_eq!(
            CyclotomicInteger::zero(&ring).divide(&a),
            Some(CyclotomicInteger::zero(&ring))
        );
    }

    #[test]
    fn test_units_and_associates() {
        let ring = CyclotomicRing::new(5).unwrap();
        // 1 + ω is a unit: (1 + ω)(-ω - ω^3) = 1
        let u = cyc(&ring, &[1, 1]);
        assert!(u.is_unit());
        assert!(!cyc(&ring, &[2]).is_unit());
        let pi = CyclotomicInteger::ramified_prime(&ring);
        assert!((&pi * &u).is_associate(&pi));
        assert!(pi.is_associate(&pi.conjugate(1)));
        assert!(!pi.is_associate(&cyc(&ring, &[2])));
    }

    #[test]
    fn test_content_and_primitive_part() {
        let ring = CyclotomicRing::new(7).unwrap();
        let a = cyc(&ring, &[6, -4, 0, 10]);
        assert_eq!(a.content(), BigInt::from(2));
        assert_eq!(a.primitive_part(), cyc(&ring, &[3, -2, 0, 5]));
        assert!(CyclotomicInteger::zero(&ring).content().is_zero());
        assert_eq!(a.primitive_part().content(), BigInt::one());
    }

    #[test]
    fn test_rational_detection() {
        let ring = CyclotomicRing::new(5).unwrap();
        assert_eq!(cyc(&ring, &[7]).rational(), Some(BigInt::from(7)));
        assert_eq!(cyc(&ring, &[2, 5, 5, 5, 5]).rational(), Some(BigInt::from(-3)));
        assert_eq!(cyc(&ring, &[1, 1]).rational(), None);
    }

    #[test]
    fn test_random_bounded_respects_bound() {
        let ring = CyclotomicRing::new(13).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let a = CyclotomicInteger::random_bounded(&ring, 5, &mut rng);
            assert!(a.height() < BigInt::from(5));
            assert!(a.coefficient(12).is_zero());
        }
    }

    #[test]
    fn test_random_bounded_extreme_bounds() {
        let ring = CyclotomicRing::new(5).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        assert!(CyclotomicInteger::random_bounded(&ring, 1, &mut rng).is_zero());
        assert!(CyclotomicInteger::random_bounded(&ring, 0, &mut rng).is_zero());
        // Bounds past i64::MAX are clamped rather than wrapped.
        let a = CyclotomicInteger::random_bounded(&ring, u64::MAX, &mut rng);
        assert!(!a.is_zero());
        assert!(a.height() <= BigInt::from(i64::MAX));
    }

    #[test]
    fn test_display() {
        let ring = CyclotomicRing::new(5).unwrap();
        assert_eq!(cyc(&ring, &[1, -1]).to_string(), "[1, -1]");
        assert_eq!(CyclotomicInteger::zero(&ring).to_string(), "[0]");
    }
}
