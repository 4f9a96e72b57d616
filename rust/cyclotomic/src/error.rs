use factoring_core::FactorError;
use lattice_reduction::LatticeError;
use num_bigint::BigUint;

/// Errors that can occur while computing in Z[ω].
#[derive(Debug, thiserror::Error)]
pub enum CyclotomicError {
    #[error("degree {0} is not an odd prime")]
    InvalidDegree(u64),

    #[error("period length {f} does not divide n - 1 = {n_minus_1}")]
    InvalidPeriodLength { f: usize, n_minus_1: usize },

    #[error("factorization is only supported for degree <= {max}, got {n}")]
    UnsupportedDegree { n: usize, max: usize },

    #[error("no {bits}-bit prime of order {order} found in {tries} tries")]
    GenerationFailed { bits: u32, order: usize, tries: usize },

    #[error("could not find a cyclotomic prime above {0}")]
    Unresolvable(BigUint),

    #[error("rational factorization failed: {0}")]
    Factoring(#[from] FactorError),

    #[error("lattice reduction failed: {0}")]
    Lattice(#[from] LatticeError),
}

pub type Result<T> = std::result::Result<T, CyclotomicError>;
