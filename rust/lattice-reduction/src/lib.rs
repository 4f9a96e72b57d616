//! Exact lattice basis reduction.
//!
//! Implements the all-integer LLL algorithm (Cohen, "A Course in
//! Computational Algebraic Number Theory", Algorithm 2.6.7). The Gram-Schmidt
//! data is kept as integer subdeterminants `d_i` and scaled coefficients
//! `lambda_{k,j} = d_{j+1} * mu_{k,j}`, so no precision is ever lost, which
//! matters when the lattice entries are the size of a large prime.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

/// A lattice basis; each row is a basis vector.
pub type IntBasis = Vec<Vec<BigInt>>;

#[derive(Debug, thiserror::Error)]
pub enum LatticeError {
    #[error("basis rows are linearly dependent (row {0})")]
    DependentRows(usize),
}

/// Lovász condition parameter delta = `delta_num / delta_den`, in (1/4, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LllParams {
    pub delta_num: u32,
    pub delta_den: u32,
}

impl Default for LllParams {
    fn default() -> Self {
        Self {
            delta_num: 3,
            delta_den: 4,
        }
    }
}

pub fn inner_product(a: &[BigInt], b: &[BigInt]) -> BigInt {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn squared_norm(v: &[BigInt]) -> BigInt {
    inner_product(v, v)
}

/// Incremental integral Gram-Schmidt state.
struct GramSchmidt {
    /// d[0] = 1, d[i + 1] = Gram determinant of rows 0..=i
    d: Vec<BigInt>,
    /// lambda[k][j] for j < k
    lambda: Vec<Vec<BigInt>>,
}

impl GramSchmidt {
    fn new(rows: usize) -> Self {
        let mut d = vec![BigInt::zero(); rows + 1];
        d[0] = BigInt::from(1);
        Self {
            d,
            lambda: vec![vec![BigInt::zero(); rows]; rows],
        }
    }

    /// Compute row k of lambda and d[k + 1] from rows 0..k.
    fn extend(&mut self, basis: &IntBasis, k: usize) -> Result<(), LatticeError> {
        for j in 0..=k {
            let mut u = inner_product(&basis[k], &basis[j]);
            for i in 0..j {
                u = (&self.d[i + 1] * &u - &self.lambda[k][i] * &self.lambda[j][i]) / &self.d[i];
            }
            if j < k {
                self.lambda[k][j] = u;
            } else {
                if u.is_zero() {
                    return Err(LatticeError::DependentRows(k));
                }
                self.d[k + 1] = u;
            }
        }
        Ok(())
    }

    /// Size-reduce row k against row l.
    fn reduce(&mut self, basis: &mut IntBasis, k: usize, l: usize) {
        let two = BigInt::from(2);
        let dl = self.d[l + 1].clone();
        let twice = &self.lambda[k][l] * &two;
        if twice.abs() <= dl {
            return;
        }
        // q = nearest integer to lambda / d_l
        let q = (&twice + &dl).div_floor(&(&dl * &two));
        let row_l = basis[l].clone();
        for (x, y) in basis[k].iter_mut().zip(row_l.iter()) {
            *x -= &q * y;
        }
        self.lambda[k][l] -= &q * &dl;
        for i in 0..l {
            let t = &q * &self.lambda[l][i];
            self.lambda[k][i] -= t;
        }
    }

    /// Swap rows k-1 and k, updating the Gram-Schmidt data.
    fn swap(&mut self, basis: &mut IntBasis, k: usize, kmax: usize) {
        basis.swap(k, k - 1);
        for j in 0..k - 1 {
            let t = std::mem::take(&mut self.lambda[k][j]);
            self.lambda[k][j] = std::mem::replace(&mut self.lambda[k - 1][j], t);
        }
        let lam = self.lambda[k][k - 1].clone();
        let b = (&self.d[k - 1] * &self.d[k + 1] + &lam * &lam) / &self.d[k];
        for i in k + 1..=kmax {
            let t = self.lambda[i][k].clone();
            self.lambda[i][k] =
                (&self.d[k + 1] * &self.lambda[i][k - 1] - &lam * &t) / &self.d[k];
            self.lambda[i][k - 1] = (&b * &t + &lam * &self.lambda[i][k]) / &self.d[k + 1];
        }
        self.d[k] = b;
    }
}

/// LLL-reduce `basis` in place.
///
/// The rows must be linearly independent; the reduced basis spans the same
/// lattice and its first row is within a factor 2^((r-1)/2) of the shortest
/// nonzero vector for the default parameters.
pub fn lll_reduce(basis: &mut IntBasis, params: &LllParams) -> Result<(), LatticeError> {
    let rows = basis.len();
    if rows == 0 {
        return Ok(());
    }

    let num = BigInt::from(params.delta_num);
    let den = BigInt::from(params.delta_den);
    let mut gs = GramSchmidt::new(rows);
    gs.extend(basis, 0)?;

    let mut k = 1usize;
    let mut kmax = 0usize;
    while k < rows {
        if k > kmax {
            kmax = k;
            gs.extend(basis, k)?;
        }
        loop {
            gs.reduce(basis, k, k - 1);
            let lam = &gs.lambda[k][k - 1];
            let lhs = &den * &gs.d[k + 1] * &gs.d[k - 1];
            let rhs = &num * &gs.d[k] * &gs.d[k] - &den * lam * lam;
            if lhs < rhs {
                gs.swap(basis, k, kmax);
                if k > 1 {
                    k -= 1;
                }
            } else {
                for l in (0..k - 1).rev() {
                    gs.reduce(basis, k, l);
                }
                k += 1;
                break;
            }
        }
    }
    Ok(())
}

/// Absolute value of the lattice determinant squared (the Gram determinant).
pub fn gram_determinant(basis: &IntBasis) -> Result<BigInt, LatticeError> {
    let rows = basis.len();
    let mut gs = GramSchmidt::new(rows);
    for k in 0..rows {
        gs.extend(basis, k)?;
    }
    Ok(gs.d[rows].clone())
}
