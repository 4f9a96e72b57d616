//! Arithmetic in the prime field F_p for an arbitrary-precision prime p.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

/// The field of p elements. Elements are canonical residues in `[0, p)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeField {
    p: BigUint,
}

impl PrimeField {
    /// `p` must be prime; this is not checked.
    pub fn new(p: BigUint) -> Self {
        Self { p }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    pub fn reduce(&self, a: &BigUint) -> BigUint {
        a % &self.p
    }

    /// Residue of a signed integer.
    pub fn reduce_signed(&self, a: &BigInt) -> BigUint {
        let r = a.magnitude() % &self.p;
        if a.sign() == Sign::Minus && !r.is_zero() {
            &self.p - r
        } else {
            r
        }
    }

    /// Representative of `a` in the symmetric range (-p/2, p/2].
    pub fn lift_symmetric(&self, a: &BigUint) -> BigInt {
        let a = self.reduce(a);
        let half = &self.p >> 1u32;
        if a > half {
            BigInt::from(a) - BigInt::from(self.p.clone())
        } else {
            BigInt::from(a)
        }
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.p
    }

    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let b = self.reduce(b);
        (a + &self.p - b) % &self.p
    }

    pub fn neg(&self, a: &BigUint) -> BigUint {
        self.sub(&BigUint::zero(), a)
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    pub fn pow(&self, a: &BigUint, exp: &BigUint) -> BigUint {
        a.modpow(exp, &self.p)
    }

    /// Multiplicative inverse, `None` for zero.
    pub fn inv(&self, a: &BigUint) -> Option<BigUint> {
        let a = self.reduce(a);
        if a.is_zero() {
            return None;
        }
        crate::mod_inverse(&a, &self.p)
    }

    /// Legendre symbol of `a`: 1, -1, or 0. Requires p odd.
    pub fn legendre(&self, a: &BigUint) -> i32 {
        jacobi(a, &self.p)
    }

    /// Square root by Cipolla's method; `None` if `a` is a non-residue.
    pub fn sqrt(&self, a: &BigUint) -> Option<BigUint> {
        let a = self.reduce(a);
        if a.is_zero() || self.p == BigUint::from(2u32) {
            return Some(a);
        }
        if self.legendre(&a) != 1 {
            return None;
        }

        // Find b with b^2 - a a non-residue, then (b + sqrt(b^2 - a))^((p+1)/2)
        // computed in F_p[s]/(s^2 - d) is a square root of a.
        let mut b = BigUint::one();
        let d = loop {
            let d = self.sub(&self.mul(&b, &b), &a);
            if self.legendre(&d) == -1 {
                break d;
            }
            b += 1u32;
        };

        let mul_ext = |x: &(BigUint, BigUint), y: &(BigUint, BigUint)| {
            let re = self.add(&self.mul(&x.0, &y.0), &self.mul(&self.mul(&x.1, &y.1), &d));
            let im = self.add(&self.mul(&x.0, &y.1), &self.mul(&x.1, &y.0));
            (re, im)
        };

        let mut exp: BigUint = (&self.p + 1u32) >> 1u32;
        let mut base = (b, BigUint::one());
        let mut acc = (BigUint::one(), BigUint::zero());
        while !exp.is_zero() {
            if exp.is_odd() {
                acc = mul_ext(&acc, &base);
            }
            base = mul_ext(&base, &base);
            exp >>= 1u32;
        }
        debug_assert!(acc.1.is_zero());
        Some(acc.0)
    }
}

/// Jacobi symbol (a/n) for odd n > 0.
pub fn jacobi(a: &BigUint, n: &BigUint) -> i32 {
    let mut a = a % n;
    let mut n = n.clone();
    let mut result = 1i32;

    while !a.is_zero() {
        while a.is_even() {
            a >>= 1u32;
            let n_mod8 = (&n % 8u32).to_u32_digits().first().copied().unwrap_or(0);
            if n_mod8 == 3 || n_mod8 == 5 {
                result = -result;
            }
        }
        std::mem::swap(&mut a, &mut n);
        let three = BigUint::from(3u32);
        if &a % 4u32 == three && &n % 4u32 == three {
            result = -result;
        }
        a %= &n;
    }

    if n.is_one() {
        result
    } else {
        0
    }
}
