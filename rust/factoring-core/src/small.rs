//! Word-sized arithmetic modulo a small prime.
//!
//! Used while building the Galois tables of a cyclotomic ring, where the
//! modulus is the degree n itself.

use num_bigint::BigUint;

/// base^exp mod m, with u128 intermediates.
pub fn mod_pow(base: u64, exp: u64, m: u64) -> u64 {
    if m == 1 {
        return 0;
    }
    let m = m as u128;
    let mut acc = 1u128;
    let mut square = base as u128 % m;
    let mut e = exp;
    while e != 0 {
        if e & 1 == 1 {
            acc = acc * square % m;
        }
        square = square * square % m;
        e >>= 1;
    }
    acc as u64
}

/// Jacobi symbol (a/m) for odd m > 0.
pub fn jacobi_symbol(a: i64, m: u64) -> i64 {
    let mut top = a.rem_euclid(m as i64) as u64;
    let mut bottom = m;
    let mut sign = 1i64;

    while top != 0 {
        let twos = top.trailing_zeros();
        top >>= twos;
        if twos % 2 == 1 && matches!(bottom % 8, 3 | 5) {
            sign = -sign;
        }
        if top % 4 == 3 && bottom % 4 == 3 {
            sign = -sign;
        }
        let r = bottom % top;
        bottom = top;
        top = r;
    }

    if bottom == 1 {
        sign
    } else {
        0
    }
}

/// Distinct prime divisors of `m`, smallest first.
pub fn distinct_prime_factors(m: u64) -> Vec<u64> {
    let mut rest = m;
    let mut primes = Vec::new();
    let mut q = 2u64;
    while q.saturating_mul(q) <= rest {
        if rest % q == 0 {
            primes.push(q);
            while rest % q == 0 {
                rest /= q;
            }
        }
        q += if q == 2 { 1 } else { 2 };
    }
    if rest > 1 {
        primes.push(rest);
    }
    primes
}

/// Least primitive root modulo the prime `p` (1 for p = 2).
pub fn primitive_root(p: u64) -> u64 {
    if p == 2 {
        return 1;
    }
    let cofactors: Vec<u64> = distinct_prime_factors(p - 1)
        .into_iter()
        .map(|q| (p - 1) / q)
        .collect();

    // Generators are non-residues, so squares are skipped before any powering.
    (2..p)
        .filter(|&g| jacobi_symbol(g as i64, p) == -1)
        .find(|&g| cofactors.iter().all(|&c| mod_pow(g, c, p) != 1))
        .unwrap_or(1)
}

/// Exact primality for word-sized integers.
pub fn is_prime_u64(m: u64) -> bool {
    crate::is_probably_prime(&BigUint::from(m), 0)
}
