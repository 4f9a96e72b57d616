//! Random cyclotomic primes.

use std::sync::Arc;

use factoring_core::random_prime;
use log::debug;
use num_bigint::BigUint;
use rand::Rng;

use crate::config::SearchParams;
use crate::error::{CyclotomicError, Result};
use crate::prime::find_prime;
use crate::ring::{CyclotomicInteger, CyclotomicRing};

/// A random cyclotomic prime together with the rational prime below it.
#[derive(Debug, Clone)]
pub struct GeneratedPrime {
    pub prime: CyclotomicInteger,
    pub rational_prime: BigUint,
    /// Residue degree f, so that N(prime) = rational_prime^f.
    pub residue_degree: usize,
}

/// Draw a random `bits`-bit prime p and return a cyclotomic prime above it.
///
/// With `order = Some(f)`, up to `tries` primes are drawn until one has
/// multiplicative order exactly f mod n; f must divide n - 1. With `None`
/// the first prime drawn is used, whatever its order.
pub fn generate_prime(
    ring: &Arc<CyclotomicRing>,
    bits: u32,
    order: Option<usize>,
    tries: usize,
    params: &SearchParams,
    rng: &mut impl Rng,
) -> Result<GeneratedPrime> {
    let n1 = ring.degree() - 1;
    if let Some(f) = order {
        if f == 0 || n1 % f != 0 {
            return Err(CyclotomicError::InvalidPeriodLength { f, n_minus_1: n1 });
        }
    }
    let failed = || CyclotomicError::GenerationFailed {
        bits,
        order: order.unwrap_or(0),
        tries,
    };

    let p = match order {
        None => random_prime(bits, rng),
        Some(f) => (0..tries)
            .map_while(|_| random_prime(bits, &mut *rng))
            .find(|p| ring.order_of(p) == f),
    }
    .ok_or_else(failed)?;
    let f = ring.order_of(&p);
    debug!("generated p = {} with f = {}", p, f);

    let prime = find_prime(ring, &p, Some(f), params)?;
    Ok(GeneratedPrime {
        prime,
        rational_prime: p,
        residue_degree: f,
    })
}
