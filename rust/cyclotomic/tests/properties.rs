//! Algebraic properties of the ring and the prime search.

use cyclotomic::{
    factor, find_prime, generate_prime, CyclotomicError, CyclotomicInteger, CyclotomicRing,
    PeriodRing, SearchParams, DEFAULT_GENERATION_TRIES,
};
use num_bigint::{BigInt, BigUint};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn big(n: u64) -> BigUint {
    BigUint::from(n)
}

#[test]
fn test_init_rejects_invalid_degrees() {
    for n in [1u64, 2, 9, 25] {
        assert!(matches!(
            CyclotomicRing::new(n),
            Err(CyclotomicError::InvalidDegree(_))
        ));
    }
}

#[test]
fn test_period_length_must_divide() {
    let ring = CyclotomicRing::new(13).unwrap();
    assert!(matches!(
        PeriodRing::new(&ring, 5),
        Err(CyclotomicError::InvalidPeriodLength { f: 5, n_minus_1: 12 })
    ));
}

#[test]
fn test_norm_is_multiplicative() {
    let mut rng = StdRng::seed_from_u64(17);
    for n in [5u64, 7, 11, 17] {
        let ring = CyclotomicRing::new(n).unwrap();
        for _ in 0..10 {
            let a = CyclotomicInteger::random_bounded(&ring, 6, &mut rng);
            let b = CyclotomicInteger::random_bounded(&ring, 6, &mut rng);
            assert_eq!((&a * &b).norm(), a.norm() * b.norm());
            assert!(a.norm() >= BigInt::from(0));
        }
    }
}

#[test]
fn test_conjugation_is_a_group_action() {
    let mut rng = StdRng::seed_from_u64(23);
    let ring = CyclotomicRing::new(11).unwrap();
    let a = CyclotomicInteger::random_bounded(&ring, 10, &mut rng);
    let b = CyclotomicInteger::random_bounded(&ring, 10, &mut rng);
    assert_eq!(a.conjugate(0), a);
    for i in 0..10 {
        // σ^i is a ring homomorphism
        assert_eq!((&a * &b).conjugate(i), &a.conjugate(i) * &b.conjugate(i));
        assert_eq!((&a + &b).conjugate(i), &a.conjugate(i) + &b.conjugate(i));
        for j in 0..10 {
            assert_eq!(a.conjugate(i).conjugate(j), a.conjugate((i + j) % 10));
        }
    }
}

#[test]
fn test_unit_detection() {
    let mut rng = StdRng::seed_from_u64(29);
    let ring = CyclotomicRing::new(7).unwrap();
    for _ in 0..50 {
        let a = CyclotomicInteger::random_bounded(&ring, 2, &mut rng);
        assert_eq!(a.is_unit(), a.norm() == BigInt::from(1));
    }
    // Cyclotomic units (1 - ω^k) / (1 - ω) = 1 + ω + ... + ω^(k-1)
    let u = CyclotomicInteger::from_coefficients(&ring, &[1, 1, 1]);
    assert!(u.is_unit());
    assert!(u.pow(5).is_unit());
}

#[test]
fn test_prime_certification() {
    let params = SearchParams::default();
    let cases: &[(u64, &[u64])] = &[
        (5, &[11, 31, 41, 19, 29, 2, 3]),
        (7, &[29, 13, 2, 43, 71, 97]),
        (13, &[53, 79, 5, 3, 131, 157]),
        (17, &[103, 137, 2, 13]),
        (19, &[191, 229, 7, 11]),
    ];
    for (n, primes) in cases {
        let ring = CyclotomicRing::new(*n).unwrap();
        for &p in *primes {
            let f = ring.order(p);
            let pi = find_prime(&ring, &big(p), None, &params).unwrap();
            assert_eq!(
                pi.norm(),
                BigInt::from(p).pow(f as u32),
                "n = {}, p = {}",
                n,
                p
            );
        }
    }
}

#[test]
fn test_large_prime_uses_root_splitting() {
    // 1_000_039 = 1 (mod 13) lies above the exhaustive-scan limit.
    let ring = CyclotomicRing::new(13).unwrap();
    let p = big(1_000_039);
    let pi = find_prime(&ring, &p, None, &SearchParams::default()).unwrap();
    assert_eq!(pi.norm(), BigInt::from(1_000_039u64));
}

#[test]
fn test_degenerate_prime_cases() {
    let params = SearchParams::default();
    let ring = CyclotomicRing::new(13).unwrap();
    assert_eq!(
        find_prime(&ring, &big(13), None, &params).unwrap(),
        CyclotomicInteger::ramified_prime(&ring)
    );
    // 2 is a primitive root mod 13.
    assert_eq!(
        find_prime(&ring, &big(2), None, &params).unwrap(),
        CyclotomicInteger::from_int(&ring, 2)
    );
}

#[test]
fn test_primes_above_p_are_conjugates() {
    // p = 29 splits completely in Z[ω_7]: the six conjugates of π are
    // pairwise non-associate and multiply to an associate of 29.
    let ring = CyclotomicRing::new(7).unwrap();
    let pi = find_prime(&ring, &big(29), None, &SearchParams::default()).unwrap();
    let conjugates: Vec<_> = (0..6).map(|i| pi.conjugate(i)).collect();
    for i in 0..6 {
        for j in i + 1..6 {
            assert!(!conjugates[i].is_associate(&conjugates[j]));
        }
    }
    let product = conjugates
        .iter()
        .fold(CyclotomicInteger::one(&ring), |acc, c| &acc * c);
    assert!(product.is_associate(&CyclotomicInteger::from_int(&ring, 29)));
}

#[test]
fn test_factor_boundaries() {
    let params = SearchParams::default();
    let ring = CyclotomicRing::new(13).unwrap();
    assert!(factor(&CyclotomicInteger::zero(&ring), &params)
        .unwrap()
        .is_empty());

    let big_ring = CyclotomicRing::new(29).unwrap();
    assert!(matches!(
        factor(&CyclotomicInteger::from_int(&big_ring, 6), &params),
        Err(CyclotomicError::UnsupportedDegree { n: 29, .. })
    ));
}

#[test]
fn test_generate_prime_orders() {
    let params = SearchParams::default();
    let ring = CyclotomicRing::new(13).unwrap();
    let mut rng = StdRng::seed_from_u64(31);
    for f in [1usize, 2, 3, 4, 6, 12] {
        let g = generate_prime(&ring, 20, Some(f), DEFAULT_GENERATION_TRIES, &params, &mut rng)
            .unwrap();
        assert_eq!(ring.order_of(&g.rational_prime), f);
        assert_eq!(
            g.prime.norm(),
            BigInt::from(g.rational_prime.clone()).pow(f as u32)
        );
    }

    let g = generate_prime(&ring, 16, None, 1, &params, &mut rng).unwrap();
    assert_eq!(g.residue_degree, ring.order_of(&g.rational_prime));
}
