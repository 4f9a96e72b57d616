//! Tunable parameters for the prime search and factorization.

use lattice_reduction::LllParams;
use serde::{Deserialize, Serialize};

/// Largest degree n for which [`crate::factor`] is supported.
pub const MAX_FACTOR_DEGREE: usize = 19;

/// Default number of random primes tried by [`crate::generate_prime`].
pub const DEFAULT_GENERATION_TRIES: usize = 1000;

/// Parameters of the cyclotomic prime search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Lovász parameter of the lattice reduction.
    pub lll: LllParams,
    /// Scan sums and differences of reduced rows together with the rows
    /// themselves. When false they are only formed after every root's rows
    /// have failed, still ahead of the cofactor fallback.
    pub combine_pairs: bool,
    /// Primes up to this value find polynomial roots by exhaustive scan.
    pub root_scan_limit: u64,
    /// Trial-division bound handed to the rational factorizer.
    pub trial_division_bound: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            lll: LllParams::default(),
            combine_pairs: true,
            root_scan_limit: 1000,
            trial_division_bound: factoring_core::DEFAULT_TRIAL_BOUND,
        }
    }
}
