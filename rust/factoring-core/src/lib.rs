//! Exact number-theory utilities shared by the cyclotomic factoring crates.
//!
//! Rational-integer factorization (trial division followed by Pollard's rho),
//! probabilistic primality, random primes, and the finite-field machinery
//! (prime fields, polynomials over them, linear systems) that the prime
//! search in Z[ω] consumes as black-box primitives.

pub mod linalg;
pub mod poly;
pub mod prime_field;
pub mod small;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

/// A rational prime together with its multiplicity.
pub type PrimePower = (BigUint, u32);

/// Default bound for the trial-division pass of [`factorize`].
pub const DEFAULT_TRIAL_BOUND: u64 = 10_000;

/// Small primes used as fixed Miller-Rabin witnesses.
const WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Errors raised while factoring rational integers.
#[derive(Debug, thiserror::Error)]
pub enum FactorError {
    #[error("could not split composite cofactor {0}")]
    Incomplete(BigUint),
}

/// Uniform random integer in `[0, bound)`. `bound` must be nonzero.
pub fn random_below(bound: &BigUint, rng: &mut impl Rng) -> BigUint {
    let num_bytes = bound.to_bytes_be().len() + 8;
    let mut bytes = vec![0u8; num_bytes];
    rng.fill(&mut bytes[..]);
    BigUint::from_bytes_be(&bytes) % bound
}

/// Random prime of exactly `bits` bits, or `None` when `bits < 2`.
pub fn random_prime(bits: u32, rng: &mut impl Rng) -> Option<BigUint> {
    if bits < 2 {
        return None;
    }
    let low = BigUint::one() << (bits - 1);
    loop {
        let candidate = &low + random_below(&low, rng);
        if is_probably_prime(&candidate, 20) {
            return Some(candidate);
        }
    }
}

/// Miller-Rabin primality test.
///
/// The twelve smallest primes are always used as witnesses, which makes the
/// answer exact below 3.3 * 10^24; `rounds` random witnesses are added on top.
pub fn is_probably_prime(n: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);

    if *n < two {
        return false;
    }
    for &w in &WITNESSES {
        let w = BigUint::from(w);
        if *n == w {
            return true;
        }
        if (n % &w).is_zero() {
            return false;
        }
    }

    // Write n-1 as 2^r * d
    let n_minus_1 = n - &one;
    let mut d = n_minus_1.clone();
    let mut r: u32 = 0;
    while d.is_even() {
        d >>= 1u32;
        r += 1;
    }

    let mut rng = rand::thread_rng();
    let span = n - 3u32;
    let random_witnesses = (0..rounds).map(|_| random_below(&span, &mut rng) + 2u32);
    let witnesses = WITNESSES.iter().map(|&w| BigUint::from(w)).chain(random_witnesses);

    'witness: for a in witnesses {
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_1 {
            continue 'witness;
        }
        for _ in 0..r - 1 {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Modular inverse a^(-1) mod `modulus`, or `None` if gcd(a, modulus) != 1.
pub fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    if *modulus <= BigUint::one() {
        return None;
    }
    let a = BigInt::from(a % modulus);
    let m = BigInt::from(modulus.clone());
    let egcd = a.extended_gcd(&m);
    if !egcd.gcd.is_one() {
        return None;
    }
    egcd.x.mod_floor(&m).to_biguint()
}

/// Strip all prime factors up to `bound` from `n`.
///
/// Returns the prime powers found, in increasing order, and the cofactor
/// left over. The cofactor is 1 or has no prime factor <= `bound`; it is
/// known to be prime when it is below `bound^2`.
pub fn trial_division(n: &BigUint, bound: u64) -> (Vec<PrimePower>, BigUint) {
    let mut factors = Vec::new();
    let mut remaining = n.clone();
    if remaining.is_zero() {
        return (factors, remaining);
    }

    let mut twos = 0u32;
    while remaining.is_even() {
        remaining >>= 1u32;
        twos += 1;
    }
    if twos > 0 {
        factors.push((BigUint::from(2u32), twos));
    }

    let mut divisor = 3u64;
    while divisor <= bound && BigUint::from(divisor) * BigUint::from(divisor) <= remaining {
        let big_divisor = BigUint::from(divisor);
        let mut exponent = 0u32;
        while (&remaining % &big_divisor).is_zero() {
            remaining /= &big_divisor;
            exponent += 1;
        }
        if exponent > 0 {
            factors.push((big_divisor, exponent));
        }
        divisor += 2;
    }
    // A cofactor at or below the bound has no smaller divisor, so it is prime.
    if remaining > BigUint::one() && remaining <= BigUint::from(bound) {
        factors.push((std::mem::replace(&mut remaining, BigUint::one()), 1));
    }

    (factors, remaining)
}

/// Complete prime factorization of `n` as `(prime, exponent)` pairs in
/// increasing prime order. 0 and 1 factor as the empty list.
pub fn factorize(n: &BigUint, bound: u64) -> Result<Vec<PrimePower>, FactorError> {
    let (mut factors, cofactor) = trial_division(n, bound);

    let mut pending = vec![cofactor];
    let mut large: Vec<BigUint> = Vec::new();
    while let Some(m) = pending.pop() {
        if m <= BigUint::one() {
            continue;
        }
        if is_probably_prime(&m, 20) {
            large.push(m);
            continue;
        }
        let d = split_composite(&m).ok_or_else(|| FactorError::Incomplete(m.clone()))?;
        pending.push(&m / &d);
        pending.push(d);
    }

    factors.extend(large.into_iter().map(|p| (p, 1)));
    factors.sort_by(|a, b| a.0.cmp(&b.0));

    let mut merged: Vec<PrimePower> = Vec::with_capacity(factors.len());
    for (p, e) in factors {
        match merged.last_mut() {
            Some(last) if last.0 == p => last.1 += e,
            _ => merged.push((p, e)),
        }
    }
    Ok(merged)
}

/// The largest prime in a factorization, if any.
pub fn largest_prime(factors: &[PrimePower]) -> Option<&BigUint> {
    factors.iter().map(|(p, _)| p).max()
}

/// Find a nontrivial divisor of a composite `n`.
fn split_composite(n: &BigUint) -> Option<BigUint> {
    if n.is_even() {
        return Some(BigUint::from(2u32));
    }
    (0..5).find_map(|_| pollard_rho_brent(n))
}

/// Pollard's rho with Brent's cycle search.
///
/// Differences are multiplied into a running product and a gcd is taken once
/// per block of up to 100 steps. Returns a proper divisor of `n`, or `None`
/// after every random polynomial x^2 + c has failed.
pub fn pollard_rho_brent(n: &BigUint) -> Option<BigUint> {
    if *n <= BigUint::from(3u32) {
        return None;
    }
    if n.is_even() {
        return Some(BigUint::from(2u32));
    }

    const ATTEMPTS: u32 = 20;
    const MAX_CYCLE: u64 = 2_000_000;
    let mut rng = rand::thread_rng();

    for _ in 0..ATTEMPTS {
        let c = random_below(&(n - 3u32), &mut rng) + 1u32;
        let step = |x: &BigUint| (x * x + &c) % n;
        let distance = |a: &BigUint, b: &BigUint| if a > b { a - b } else { b - a };

        let mut y = random_below(&(n - 1u32), &mut rng) + 1u32;
        let mut x = y.clone();
        let mut saved = y.clone();
        let mut acc = BigUint::one();
        let mut divisor = BigUint::one();
        let mut cycle: u64 = 1;

        while divisor.is_one() && cycle <= MAX_CYCLE {
            x = y.clone();
            for _ in 0..cycle {
                y = step(&y);
            }
            let mut done = 0u64;
            while done < cycle && divisor.is_one() {
                saved = y.clone();
                let block = (cycle - done).min(100);
                for _ in 0..block {
                    y = step(&y);
                    acc = acc * distance(&y, &x) % n;
                }
                divisor = acc.gcd(n);
                done += block;
            }
            cycle <<= 1;
        }

        if divisor.is_one() {
            continue;
        }
        if divisor == *n {
            // The block overshot; walk forward one step at a time from `saved`.
            divisor = loop {
                saved = step(&saved);
                let g = distance(&saved, &x).gcd(n);
                if !g.is_one() {
                    break g;
                }
            };
        }
        if divisor != *n {
            return Some(divisor);
        }
    }

    None
}
