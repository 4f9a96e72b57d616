//! Factorization of arbitrary elements of Z[ω] into cyclotomic primes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use factoring_core::factorize;
use log::debug;
use num_bigint::{BigInt, BigUint};

use crate::config::{SearchParams, MAX_FACTOR_DEGREE};
use crate::error::{CyclotomicError, Result};
use crate::prime::find_prime;
use crate::ring::{CyclotomicInteger, CyclotomicRing};

/// One prime power π^k of a factorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeFactor {
    pub prime: CyclotomicInteger,
    pub exponent: u32,
    /// The rational prime p below π.
    pub rational_prime: BigUint,
    /// Residue degree f, so that N(π) = p^f.
    pub residue_degree: usize,
}

/// A list of prime powers whose product is associate to the factored
/// element. The ramified prime 1 - ω comes first if present, the rest
/// follow in increasing order of the rational prime below them.
#[derive(Debug, Clone)]
pub struct Factorization {
    ring: Arc<CyclotomicRing>,
    factors: Vec<PrimeFactor>,
}

impl Factorization {
    pub fn factors(&self) -> &[PrimeFactor] {
        &self.factors
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrimeFactor> {
        self.factors.iter()
    }

    /// Π π^k over all entries (1 for the empty factorization).
    pub fn product(&self) -> CyclotomicInteger {
        self.factors
            .iter()
            .fold(CyclotomicInteger::one(&self.ring), |acc, pf| {
                &acc * &pf.prime.pow(pf.exponent)
            })
    }

    /// Record one more factor π above p, merging with an associate entry.
    fn push_prime(&mut self, prime: CyclotomicInteger, p: &BigUint, f: usize) {
        for entry in self.factors.iter_mut() {
            if entry.rational_prime == *p && entry.prime.is_associate(&prime) {
                entry.exponent += 1;
                return;
            }
        }
        self.factors.push(PrimeFactor {
            prime,
            exponent: 1,
            rational_prime: p.clone(),
            residue_degree: f,
        });
    }
}

impl fmt::Display for Factorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, pf) in self.factors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", pf.prime, pf.exponent)?;
        }
        write!(f, "}}")
    }
}

/// Factor `a` into cyclotomic primes.
///
/// The content d of `a` and the norm of its primitive part b are factored
/// over Z. Every prime p dividing d divides all e = (n - 1) / f primes above
/// it equally, so they are listed with p's exponent in d. Primes dividing
/// N(b) are found by trial-dividing b by a prime above p and its conjugates,
/// each successful division accounting for p^f of the norm.
///
/// Only degrees n <= 19 are supported. The zero element factors as the
/// empty list.
pub fn factor(a: &CyclotomicInteger, params: &SearchParams) -> Result<Factorization> {
    let ring = a.ring().clone();
    let n = ring.degree();
    if n > MAX_FACTOR_DEGREE {
        return Err(CyclotomicError::UnsupportedDegree {
            n,
            max: MAX_FACTOR_DEGREE,
        });
    }

    let mut result = Factorization {
        ring: ring.clone(),
        factors: Vec::new(),
    };
    if a.is_zero() {
        return Ok(result);
    }

    let content = a.content();
    let mut b = a.primitive_part();
    let norm = b.norm();
    debug!("factoring {}: content {}, norm {}", a, content, norm);

    let mut from_norm: BTreeMap<BigUint, u32> =
        factorize(norm.magnitude(), params.trial_division_bound)?
            .into_iter()
            .collect();
    let mut from_content: BTreeMap<BigUint, u32> =
        factorize(content.magnitude(), params.trial_division_bound)?
            .into_iter()
            .collect();

    let big_n = BigUint::from(n);
    let ramified = from_norm.remove(&big_n).unwrap_or(0) as usize
        + (n - 1) * from_content.remove(&big_n).unwrap_or(0) as usize;
    if ramified > 0 {
        result.factors.push(PrimeFactor {
            prime: CyclotomicInteger::ramified_prime(&ring),
            exponent: ramified as u32,
            rational_prime: big_n,
            residue_degree: 1,
        });
    }

    let primes: Vec<BigUint> = from_norm
        .keys()
        .chain(from_content.keys())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    for p in &primes {
        let f = ring.order_of(p);
        let pi = find_prime(&ring, p, Some(f), params)?;
        debug!("prime above {}: {} (f = {})", p, pi, f);

        match from_content.get(p) {
            Some(&exponent) => {
                let start = result.factors.len();
                let count = (n - 1) / f;
                let mut conjugate = pi;
                for _ in 0..count {
                    let next = conjugate.conjugate(1);
                    result.factors.push(PrimeFactor {
                        prime: conjugate,
                        exponent,
                        rational_prime: p.clone(),
                        residue_degree: f,
                    });
                    conjugate = next;
                }
                if let Some(&norm_exponent) = from_norm.get(p) {
                    b = divide_into_entries(b, &mut result.factors[start..], norm_exponent, f, p)?;
                }
            }
            None => {
                let norm_exponent = from_norm.get(p).copied().unwrap_or(0);
                b = divide_by_conjugates(b, pi, &mut result, norm_exponent, f, p)?;
            }
        }
    }

    Ok(result)
}

/// Trial-divide b by the primes already listed in `entries` (the distinct
/// primes above p), cycling through them, until p^norm_exponent is used up.
fn divide_into_entries(
    mut b: CyclotomicInteger,
    entries: &mut [PrimeFactor],
    norm_exponent: u32,
    f: usize,
    p: &BigUint,
) -> Result<CyclotomicInteger> {
    let mut remaining = norm_exponent as usize;
    let mut index = 0usize;
    let mut misses = 0usize;
    while remaining > 0 {
        match b.divide(&entries[index].prime) {
            Some(q) => {
                b = q;
                entries[index].exponent += 1;
                remaining = remaining.saturating_sub(f);
                misses = 0;
            }
            None => {
                misses += 1;
                if misses > entries.len() {
                    return Err(CyclotomicError::Unresolvable(p.clone()));
                }
                index = (index + 1) % entries.len();
            }
        }
    }
    Ok(b)
}

/// Trial-divide b by π and its conjugates until p^norm_exponent is used up,
/// recording every successful divisor.
fn divide_by_conjugates(
    mut b: CyclotomicInteger,
    mut pi: CyclotomicInteger,
    result: &mut Factorization,
    norm_exponent: u32,
    f: usize,
    p: &BigUint,
) -> Result<CyclotomicInteger> {
    let n = b.degree();
    let mut remaining = norm_exponent as usize;
    let mut misses = 0usize;
    while remaining > 0 {
        match b.divide(&pi) {
            Some(q) => {
                b = q;
                result.push_prime(pi.clone(), p, f);
                remaining = remaining.saturating_sub(f);
                misses = 0;
            }
            None => {
                misses += 1;
                if misses > n - 1 {
                    return Err(CyclotomicError::Unresolvable(p.clone()));
                }
                pi = pi.conjugate(1);
            }
        }
    }
    Ok(b)
}

/// Norm of the product of a factorization, for cross-checking against the
/// norm of the original element.
pub fn factorization_norm(factorization: &Factorization) -> BigInt {
    factorization
        .iter()
        .map(|pf| pf.prime.norm().pow(pf.exponent))
        .product()
}
