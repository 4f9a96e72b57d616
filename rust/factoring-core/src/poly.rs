//! Univariate polynomials over a prime field and root finding.
//!
//! Roots are found by exhaustive scan for small p, and otherwise by
//! Cantor-Zassenhaus equal-degree splitting of gcd(f, x^p - x), with the
//! quadratic formula finishing off degree-2 pieces.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use rand::Rng;

use crate::prime_field::PrimeField;
use crate::random_below;

/// A polynomial with coefficients in F_p, lowest degree first.
///
/// The coefficient vector never has trailing zeros; the zero polynomial is
/// the empty vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpPoly {
    coeffs: Vec<BigUint>,
}

impl FpPoly {
    pub fn new(field: &PrimeField, coeffs: Vec<BigUint>) -> Self {
        let coeffs = coeffs.iter().map(|c| field.reduce(c)).collect();
        Self::trimmed(coeffs)
    }

    /// Reduce an integer polynomial modulo p.
    pub fn from_signed(field: &PrimeField, coeffs: &[BigInt]) -> Self {
        Self::trimmed(coeffs.iter().map(|c| field.reduce_signed(c)).collect())
    }

    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    pub fn constant(field: &PrimeField, c: BigUint) -> Self {
        Self::new(field, vec![c])
    }

    /// The monic linear polynomial x + a.
    pub fn linear(field: &PrimeField, a: &BigUint) -> Self {
        Self::new(field, vec![a.clone(), BigUint::one()])
    }

    fn trimmed(mut coeffs: Vec<BigUint>) -> Self {
        while coeffs.last().map_or(false, |c| c.is_zero()) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    pub fn coefficients(&self) -> &[BigUint] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree, `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    fn leading(&self) -> Option<&BigUint> {
        self.coeffs.last()
    }

    pub fn monic(&self, field: &PrimeField) -> Self {
        match self.leading().and_then(|lc| field.inv(lc)) {
            Some(inv) => Self::trimmed(self.coeffs.iter().map(|c| field.mul(c, &inv)).collect()),
            None => self.clone(),
        }
    }

    pub fn add(&self, other: &Self, field: &PrimeField) -> Self {
        let len = self.coeffs.len().max(other.coeffs.len());
        let zero = BigUint::zero();
        let coeffs = (0..len)
            .map(|i| {
                let a = self.coeffs.get(i).unwrap_or(&zero);
                let b = other.coeffs.get(i).unwrap_or(&zero);
                field.add(a, b)
            })
            .collect();
        Self::trimmed(coeffs)
    }

    pub fn sub(&self, other: &Self, field: &PrimeField) -> Self {
        let len = self.coeffs.len().max(other.coeffs.len());
        let zero = BigUint::zero();
        let coeffs = (0..len)
            .map(|i| {
                let a = self.coeffs.get(i).unwrap_or(&zero);
                let b = other.coeffs.get(i).unwrap_or(&zero);
                field.sub(a, b)
            })
            .collect();
        Self::trimmed(coeffs)
    }

    pub fn mul(&self, other: &Self, field: &PrimeField) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut coeffs = vec![BigUint::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Self::new(field, coeffs)
    }

    /// Quotient and remainder. Panics if `divisor` is zero.
    pub fn div_rem(&self, divisor: &Self, field: &PrimeField) -> (Self, Self) {
        let d_deg = divisor.degree().expect("division by the zero polynomial");
        let lc_inv = divisor
            .leading()
            .and_then(|lc| field.inv(lc))
            .expect("leading coefficient is a unit");

        let mut rem = self.coeffs.clone();
        if rem.len() <= d_deg {
            return (Self::zero(), self.clone());
        }
        let mut quot = vec![BigUint::zero(); rem.len() - d_deg];
        for i in (0..quot.len()).rev() {
            let c = field.mul(&rem[i + d_deg], &lc_inv);
            if c.is_zero() {
                continue;
            }
            for (j, d) in divisor.coeffs.iter().enumerate() {
                let t = field.mul(&c, d);
                rem[i + j] = field.sub(&rem[i + j], &t);
            }
            quot[i] = c;
        }
        rem.truncate(d_deg);
        (Self::trimmed(quot), Self::trimmed(rem))
    }

    pub fn rem(&self, divisor: &Self, field: &PrimeField) -> Self {
        self.div_rem(divisor, field).1
    }

    /// Monic greatest common divisor.
    pub fn gcd(&self, other: &Self, field: &PrimeField) -> Self {
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let r = a.rem(&b, field);
            a = b;
            b = r;
        }
        a.monic(field)
    }

    /// `self^exp mod modulus`.
    pub fn pow_mod(&self, exp: &BigUint, modulus: &Self, field: &PrimeField) -> Self {
        let mut result = Self::constant(field, BigUint::one()).rem(modulus, field);
        let mut base = self.rem(modulus, field);
        let bits = exp.bits();
        for i in 0..bits {
            if exp.bit(i) {
                result = result.mul(&base, field).rem(modulus, field);
            }
            if i + 1 < bits {
                base = base.mul(&base, field).rem(modulus, field);
            }
        }
        result
    }

    /// Horner evaluation at `x`.
    pub fn eval(&self, x: &BigUint, field: &PrimeField) -> BigUint {
        self.coeffs
            .iter()
            .rev()
            .fold(BigUint::zero(), |acc, c| field.add(&field.mul(&acc, x), c))
    }

    /// All distinct roots in F_p, in increasing order.
    ///
    /// Primes up to `scan_limit` are handled by evaluating at every residue.
    pub fn roots(&self, field: &PrimeField, scan_limit: u64) -> Vec<BigUint> {
        if self.degree().map_or(true, |d| d == 0) {
            return Vec::new();
        }
        let p = field.modulus();
        let mut roots = if *p <= BigUint::from(scan_limit) || *p == BigUint::from(2u32) {
            let mut found = Vec::new();
            let mut x = BigUint::zero();
            while &x < p {
                if self.eval(&x, field).is_zero() {
                    found.push(x.clone());
                }
                x += 1u32;
            }
            found
        } else {
            // Restrict to the product of the distinct linear factors.
            let f = self.monic(field);
            let x = Self::linear(field, &BigUint::zero());
            let xp = x.pow_mod(p, &f, field);
            let split = f.gcd(&xp.sub(&x, field), field);
            let mut found = Vec::new();
            let mut rng = rand::thread_rng();
            split_linear(&split, field, &mut rng, &mut found);
            found
        };
        roots.sort();
        roots.dedup();
        roots
    }
}

/// Collect the roots of a monic squarefree `f` that splits into linear
/// factors over F_p, p odd.
fn split_linear(f: &FpPoly, field: &PrimeField, rng: &mut impl Rng, out: &mut Vec<BigUint>) {
    match f.degree() {
        None | Some(0) => {}
        Some(1) => out.push(field.neg(&f.coeffs[0])),
        Some(2) => {
            // x^2 + b x + c = 0  =>  x = (-b +- sqrt(b^2 - 4c)) / 2
            let (c, b) = (&f.coeffs[0], &f.coeffs[1]);
            let disc = field.sub(&field.mul(b, b), &field.mul(&BigUint::from(4u32), c));
            if let (Some(s), Some(half)) = (field.sqrt(&disc), field.inv(&BigUint::from(2u32))) {
                let minus_b = field.neg(b);
                out.push(field.mul(&field.add(&minus_b, &s), &half));
                out.push(field.mul(&field.sub(&minus_b, &s), &half));
            }
        }
        Some(deg) => {
            let p = field.modulus();
            let exp = (p - 1u32) >> 1u32;
            let one = FpPoly::constant(field, BigUint::one());
            loop {
                let a = random_below(p, rng);
                let t = FpPoly::linear(field, &a).pow_mod(&exp, f, field);
                let g = f.gcd(&t.sub(&one, field), field);
                match g.degree() {
                    Some(d) if d > 0 && d < deg => {
                        let (h, _) = f.div_rem(&g, field);
                        split_linear(&g, field, rng, out);
                        split_linear(&h.monic(field), field, rng, out);
                        return;
                    }
                    _ => continue,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn from_roots(field: &PrimeField, roots: &[u64]) -> FpPoly {
        roots.iter().fold(FpPoly::constant(field, big(1)), |acc, &r| {
            acc.mul(&FpPoly::linear(field, &field.neg(&big(r))), field)
        })
    }

    #[test]
    fn test_div_rem_reconstructs() {
        let field = PrimeField::new(big(17));
        let a = FpPoly::new(&field, vec![big(3), big(0), big(5), big(1), big(7)]);
        let b = FpPoly::new(&field, vec![big(2), big(9), big(4)]);
        let (q, r) = a.div_rem(&b, &field);
        assert!(r.degree().map_or(true, |d| d < 2));
        assert_eq!(q.mul(&b, &field).add(&r, &field), a);
    }

    #[test]
    fn test_gcd_of_products() {
        let field = PrimeField::new(big(101));
        let a = from_roots(&field, &[1, 2, 3]);
        let b = from_roots(&field, &[2, 3, 50]);
        assert_eq!(a.gcd(&b, &field), from_roots(&field, &[2, 3]));
    }

    #[test]
    fn test_from_signed() {
        let field = PrimeField::new(big(7));
        let p = FpPoly::from_signed(&field, &[BigInt::from(-1), BigInt::from(8), BigInt::from(14)]);
        assert_eq!(p.coefficients(), &[big(6), big(1)]);
        assert_eq!(p.degree(), Some(1));
    }

    #[test]
    fn test_roots_by_scan() {
        let field = PrimeField::new(big(31));
        let f = from_roots(&field, &[4, 17, 30]);
        assert_eq!(f.roots(&field, 1000), vec![big(4), big(17), big(30)]);

        let field = PrimeField::new(big(2));
        let f = from_roots(&field, &[0, 1]);
        assert_eq!(f.roots(&field, 0), vec![big(0), big(1)]);
    }

    #[test]
    fn test_roots_by_splitting() {
        let p = 1_000_003u64;
        let field = PrimeField::new(big(p));
        let expected = [2u64, 77, 4_096, 500_001, 999_999, 1_000_002];
        let f = from_roots(&field, &expected);
        let roots = f.roots(&field, 1000);
        assert_eq!(roots, expected.iter().map(|&r| big(r)).collect::<Vec<_>>());
    }

    #[test]
    fn test_roots_ignore_irreducible_part() {
        // x^2 + 1 has no roots when p = 3 (mod 4).
        let p = 1_000_003u64;
        let field = PrimeField::new(big(p));
        let irreducible = FpPoly::new(&field, vec![big(1), big(0), big(1)]);
        let f = irreducible.mul(&from_roots(&field, &[5, 6]), &field);
        assert_eq!(f.roots(&field, 1000), vec![big(5), big(6)]);
    }

    #[test]
    fn test_eval() {
        let field = PrimeField::new(big(13));
        let f = FpPoly::new(&field, vec![big(1), big(2), big(3)]);
        // 1 + 2*5 + 3*25 = 86 = 8 (mod 13)
        assert_eq!(f.eval(&big(5), &field), big(8));
    }
}
