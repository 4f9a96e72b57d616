//! Explicit cyclotomic primes above a rational prime p.
//!
//! With f the order of p mod n, p splits into e = (n - 1) / f primes of
//! residue degree f, and each of them already lies in the ring of periods of
//! length f. A root u_0 of the minimal polynomial of η_0 mod p fixes one such
//! prime P through η_0 ≡ u_0; the other congruences η_i ≡ u_i (mod P) follow
//! from the multiplication table. Period elements in P form a lattice of
//! index p in Z^e, and a short vector of it usually generates P outright.
//! Otherwise the unwanted cofactor of a short vector's norm is stripped off
//! by dividing out primes above smaller rational primes.

use std::sync::Arc;

use factoring_core::linalg;
use factoring_core::poly::FpPoly;
use factoring_core::prime_field::PrimeField;
use factoring_core::{factorize, largest_prime, PrimePower};
use lattice_reduction::{lll_reduce, IntBasis};
use log::{debug, warn};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::Zero;

use crate::config::SearchParams;
use crate::error::{CyclotomicError, Result};
use crate::period::{Period, PeriodRing};
use crate::ring::{CyclotomicInteger, CyclotomicRing};

/// A short lattice vector whose norm is p times an unwanted cofactor.
struct Candidate {
    element: Period,
    residual: Vec<PrimePower>,
    largest: BigUint,
}

/// Find π ∈ Z[ω] with N(π) = p^f.
///
/// `order` is the multiplicative order f of p mod n and is computed when
/// `None`. For p = n the answer is 1 - ω (norm n), and for inert p
/// (f = n - 1) it is p itself.
pub fn find_prime(
    ring: &Arc<CyclotomicRing>,
    p: &BigUint,
    order: Option<usize>,
    params: &SearchParams,
) -> Result<CyclotomicInteger> {
    let n = ring.degree();
    if *p == BigUint::from(n) {
        return Ok(CyclotomicInteger::ramified_prime(ring));
    }
    let f = order.unwrap_or_else(|| ring.order_of(p));
    if f == n - 1 {
        return Ok(CyclotomicInteger::from_int(ring, BigInt::from(p.clone())));
    }

    let periods = PeriodRing::new(ring, f)?;
    let field = PrimeField::new(p.clone());
    let min_poly = FpPoly::from_signed(&field, periods.min_poly());
    let roots = min_poly.roots(&field, params.root_scan_limit);
    debug!(
        "p = {}, f = {}: {} roots of the period polynomial",
        p,
        f,
        roots.len()
    );

    let mut pending = Vec::new();
    let mut reduced = Vec::with_capacity(roots.len());
    for u0 in &roots {
        let residues = match period_residues(&periods, &field, u0) {
            Some(u) => u,
            None => {
                warn!("singular period system for p = {}, root {}; skipping", p, u0);
                continue;
            }
        };
        let mut basis = match ideal_lattice(&field, &residues) {
            Some(b) => b,
            None => continue,
        };
        lll_reduce(&mut basis, &params.lll)?;

        let vectors = candidates(&basis, params.combine_pairs);
        if let Some(pi) = scan(&periods, vectors, p, &mut pending) {
            return certify(pi, p, f);
        }
        reduced.push(basis);
    }

    // Pair combinations deferred by `combine_pairs = false` are still tried
    // before falling back to cofactor stripping.
    if !params.combine_pairs {
        for basis in &reduced {
            if let Some(pi) = scan(&periods, pair_combinations(basis), p, &mut pending) {
                return certify(pi, p, f);
            }
        }
    }

    let best = select_candidate(pending, p, params)
        .ok_or_else(|| CyclotomicError::Unresolvable(p.clone()))?;
    warn!(
        "p = {}: no lattice vector of norm p; dividing out cofactor {:?}",
        p, best.residual
    );
    let pi = strip_cofactor(ring, best.element.to_cyclotomic(), &best.residual, f, params)?;
    certify(pi, p, f)
}

/// Among candidates with norm p * m, pick the one whose m has the smallest
/// largest prime factor, provided that factor is below p.
fn select_candidate(
    pending: Vec<(Period, BigUint)>,
    p: &BigUint,
    params: &SearchParams,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for (element, residual) in pending {
        let factors = match factorize(&residual, params.trial_division_bound) {
            Ok(factors) => factors,
            Err(e) => {
                debug!("skipping candidate: {}", e);
                continue;
            }
        };
        let largest = match largest_prime(&factors) {
            Some(q) if q < p => q.clone(),
            _ => continue,
        };
        if best.as_ref().map_or(true, |b| largest < b.largest) {
            best = Some(Candidate {
                element,
                residual: factors,
                largest,
            });
        }
    }
    best
}

/// Divide q by primes above each k in `residual`, cycling through the
/// conjugates of each prime when a division fails.
fn strip_cofactor(
    ring: &Arc<CyclotomicRing>,
    mut q: CyclotomicInteger,
    residual: &[PrimePower],
    f: usize,
    params: &SearchParams,
) -> Result<CyclotomicInteger> {
    let n = ring.degree();
    for (k, exponent) in residual {
        let j = ring.order_of(k);
        let mut s = find_prime(ring, k, Some(j), params)?;
        // k^(exponent f) divides N(q), each prime above k carries k^j.
        let mut remaining = *exponent as usize * f;
        let mut misses = 0usize;
        while remaining > 0 {
            match q.divide(&s) {
                Some(quotient) => {
                    q = quotient;
                    remaining = remaining.saturating_sub(j);
                    misses = 0;
                }
                None => {
                    misses += 1;
                    if misses > n - 1 {
                        return Err(CyclotomicError::Unresolvable(k.clone()));
                    }
                    s = s.conjugate(1);
                }
            }
        }
    }
    Ok(q)
}

fn certify(pi: CyclotomicInteger, p: &BigUint, f: usize) -> Result<CyclotomicInteger> {
    let expected = BigInt::from(p.clone()).pow(f as u32);
    if pi.norm() == expected {
        Ok(pi)
    } else {
        Err(CyclotomicError::Unresolvable(p.clone()))
    }
}

/// Residues u_i ≡ η_i (mod P) given u_0 ≡ η_0.
///
/// Reducing η_0 η_i = Σ_k W[i][k] η_k gives, for i = 1..e-1,
/// Σ_{k≥1} (W[i][k] - u_0 δ_ik) u_k = -W[i][0] u_0.
fn period_residues(periods: &PeriodRing, field: &PrimeField, u0: &BigUint) -> Option<Vec<BigUint>> {
    let e = periods.num_periods();
    let table = periods.table();
    let u0_signed = BigInt::from(u0.clone());

    let mut a = Vec::with_capacity(e - 1);
    let mut b = Vec::with_capacity(e - 1);
    for i in 1..e {
        let row: Vec<BigUint> = (1..e)
            .map(|k| {
                let mut w = BigInt::from(table[i][k]);
                if i == k {
                    w -= &u0_signed;
                }
                field.reduce_signed(&w)
            })
            .collect();
        a.push(row);
        b.push(field.reduce_signed(&(-BigInt::from(table[i][0]) * &u0_signed)));
    }

    let rest = linalg::solve(field, &a, &b)?;
    let mut u = Vec::with_capacity(e);
    u.push(u0.clone());
    u.extend(rest);
    Some(u)
}

/// Basis of {c ∈ Z^e : Σ c_i u_i ≡ 0 (mod p)}: the null space of the row
/// (u_0 .. u_{e-1}) lifted to small integers, plus p times the pivot vector.
fn ideal_lattice(field: &PrimeField, u: &[BigUint]) -> Option<IntBasis> {
    let e = u.len();
    let pivot = u.iter().position(|x| !x.is_zero())?;
    let kernel = linalg::kernel(field, &[u.to_vec()], e);

    let mut basis = Vec::with_capacity(e);
    let mut shifted = vec![BigInt::zero(); e];
    shifted[pivot] = BigInt::from(field.modulus().clone());
    basis.push(shifted);
    basis.extend(
        kernel
            .iter()
            .map(|v| v.iter().map(|x| field.lift_symmetric(x)).collect::<Vec<_>>()),
    );
    Some(basis)
}

/// Test lattice vectors as period elements. Returns the first one of norm
/// ±p as a cyclotomic integer; vectors of norm p * m go to `pending`.
fn scan(
    periods: &Arc<PeriodRing>,
    vectors: Vec<Vec<BigInt>>,
    p: &BigUint,
    pending: &mut Vec<(Period, BigUint)>,
) -> Option<CyclotomicInteger> {
    for coords in vectors {
        let element = Period::new(periods, coords);
        let norm = element.norm().magnitude().clone();
        if norm == *p {
            debug!("p = {}: lattice vector of norm p found", p);
            return Some(element.to_cyclotomic());
        }
        if !norm.is_zero() && norm.is_multiple_of(p) {
            pending.push((element, norm / p));
        }
    }
    None
}

/// Reduced rows, then (optionally) pairwise sums and differences.
fn candidates(basis: &IntBasis, combine_pairs: bool) -> Vec<Vec<BigInt>> {
    let mut out = basis.clone();
    if combine_pairs {
        out.extend(pair_combinations(basis));
    }
    out
}

fn pair_combinations(basis: &IntBasis) -> Vec<Vec<BigInt>> {
    let mut out = Vec::new();
    for i in 0..basis.len() {
        for j in i + 1..basis.len() {
            out.push(basis[i].iter().zip(&basis[j]).map(|(a, b)| a + b).collect());
            out.push(basis[i].iter().zip(&basis[j]).map(|(a, b)| a - b).collect());
        }
    }
    out
}

/// True if π has norm p^f for the order f of p (or norm n when p = n).
pub fn is_prime_above(pi: &CyclotomicInteger, p: &BigUint) -> bool {
    let ring = pi.ring();
    let f = if *p == BigUint::from(ring.degree()) {
        1
    } else {
        ring.order_of(p)
    };
    pi.norm() == BigInt::from(p.clone()).pow(f as u32)
}
