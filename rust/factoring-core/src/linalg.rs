//! Linear algebra over F_p.
//!
//! Gauss-Jordan elimination to reduced row echelon form, which gives both
//! the solution of square systems and a basis of the null space.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::prime_field::PrimeField;

/// Reduce `rows` in place to reduced row echelon form over the first
/// `num_cols` columns. Returns the pivot column of each nonzero row.
fn row_reduce(field: &PrimeField, rows: &mut [Vec<BigUint>], num_cols: usize) -> Vec<usize> {
    let mut pivots = Vec::new();
    let mut rank = 0usize;

    for col in 0..num_cols {
        if rank == rows.len() {
            break;
        }
        let pivot = match (rank..rows.len()).find(|&r| !rows[r][col].is_zero()) {
            Some(r) => r,
            None => continue,
        };
        rows.swap(rank, pivot);

        let inv = match field.inv(&rows[rank][col]) {
            Some(inv) => inv,
            None => continue,
        };
        for v in rows[rank].iter_mut() {
            *v = field.mul(v, &inv);
        }

        let pivot_row = rows[rank].clone();
        for (r, row) in rows.iter_mut().enumerate() {
            if r == rank || row[col].is_zero() {
                continue;
            }
            let factor = row[col].clone();
            for (v, pv) in row.iter_mut().zip(pivot_row.iter()) {
                *v = field.sub(v, &field.mul(&factor, pv));
            }
        }

        pivots.push(col);
        rank += 1;
    }

    pivots
}

/// Solve the square system `a * x = b` over F_p.
///
/// Returns `None` if `a` is singular.
pub fn solve(field: &PrimeField, a: &[Vec<BigUint>], b: &[BigUint]) -> Option<Vec<BigUint>> {
    let m = a.len();
    if b.len() != m || a.iter().any(|row| row.len() != m) {
        return None;
    }
    let mut augmented: Vec<Vec<BigUint>> = a
        .iter()
        .zip(b.iter())
        .map(|(row, rhs)| {
            let mut r: Vec<BigUint> = row.iter().map(|v| field.reduce(v)).collect();
            r.push(field.reduce(rhs));
            r
        })
        .collect();

    let pivots = row_reduce(field, &mut augmented, m);
    if pivots.len() < m {
        return None;
    }
    Some(augmented.into_iter().map(|row| row[m].clone()).collect())
}

/// Basis of the right null space {x : a * x = 0} over F_p.
pub fn kernel(field: &PrimeField, a: &[Vec<BigUint>], num_cols: usize) -> Vec<Vec<BigUint>> {
    let mut rows: Vec<Vec<BigUint>> = a
        .iter()
        .map(|row| {
            let mut r: Vec<BigUint> = row.iter().map(|v| field.reduce(v)).collect();
            r.resize(num_cols, BigUint::zero());
            r
        })
        .collect();

    let pivots = row_reduce(field, &mut rows, num_cols);

    (0..num_cols)
        .filter(|col| !pivots.contains(col))
        .map(|free| {
            let mut v = vec![BigUint::zero(); num_cols];
            v[free] = BigUint::one();
            for (r, &pc) in pivots.iter().enumerate() {
                v[pc] = field.neg(&rows[r][free]);
            }
            v
        })
        .collect()
}
