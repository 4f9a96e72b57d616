//! Cyclotomic integers and their factorization into primes.
//!
//! Arithmetic in Z[ω] for an odd prime n, the subring of Gaussian periods,
//! and the constructive prime search of Kummer and Edwards: for a rational
//! prime p of order f mod n, find an explicit π with N(π) = p^f, then factor
//! arbitrary cyclotomic integers by trial division with π and its
//! conjugates.
//!
//! ```no_run
//! use cyclotomic::{factor, CyclotomicInteger, CyclotomicRing, SearchParams};
//!
//! let ring = CyclotomicRing::new(13).unwrap();
//! let a = CyclotomicInteger::from_coefficients(&ring, &[3, -1, 4, 1, -5]);
//! let f = factor(&a, &SearchParams::default()).unwrap();
//! assert!(f.product().is_associate(&a));
//! ```

pub mod config;
pub mod error;
pub mod factor;
pub mod generate;
pub mod period;
pub mod prime;
pub mod ring;

pub use config::{SearchParams, DEFAULT_GENERATION_TRIES, MAX_FACTOR_DEGREE};
pub use error::{CyclotomicError, Result};
pub use factor::{factor, Factorization, PrimeFactor};
pub use generate::{generate_prime, GeneratedPrime};
pub use period::{Period, PeriodRing};
pub use prime::{find_prime, is_prime_above};
pub use ring::{CyclotomicInteger, CyclotomicRing};
