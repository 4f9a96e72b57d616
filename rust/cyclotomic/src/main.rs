//! Example driver: round-trip random products through `factor`, or print
//! random cyclotomic primes.
//!
//! Usage:
//!   cyclotomic [--mode=roundtrip|genprime] [--degree=13] [--bound=5]
//!              [--trials=100] [--seed=1] [--bits=32] [--order=F]
//!              [--json=report.json]

use std::sync::Arc;
use std::time::Instant;

use cyclotomic::{
    factor, generate_prime, CyclotomicInteger, CyclotomicRing, SearchParams,
    DEFAULT_GENERATION_TRIES,
};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    RoundTrip,
    GenPrime,
}

struct CliConfig {
    mode: Mode,
    degree: u64,
    bound: u64,
    trials: usize,
    seed: u64,
    bits: u32,
    order: Option<usize>,
    json: Option<String>,
}

fn flag<T: std::str::FromStr>(args: &[String], name: &str) -> Option<T> {
    let prefix = format!("--{}=", name);
    args.iter()
        .find(|a| a.starts_with(&prefix))
        .and_then(|a| a.strip_prefix(&prefix)?.parse::<T>().ok())
}

fn parse_args() -> CliConfig {
    let args: Vec<String> = std::env::args().collect();

    let mode = match flag::<String>(&args, "mode").as_deref() {
        Some("genprime") => Mode::GenPrime,
        _ => Mode::RoundTrip,
    };

    CliConfig {
        mode,
        degree: flag(&args, "degree").unwrap_or(13),
        bound: flag(&args, "bound").unwrap_or(5),
        trials: flag(&args, "trials").unwrap_or(100),
        seed: flag(&args, "seed").unwrap_or(1),
        bits: flag(&args, "bits").unwrap_or(32),
        order: flag(&args, "order"),
        json: flag(&args, "json"),
    }
}

#[derive(Debug, Serialize)]
struct FactorRecord {
    prime: String,
    exponent: u32,
    rational_prime: String,
    residue_degree: usize,
}

#[derive(Debug, Serialize)]
struct TrialRecord {
    trial: usize,
    product: String,
    factors: Vec<FactorRecord>,
    associate: bool,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RoundTripReport {
    degree: u64,
    bound: u64,
    seed: u64,
    trials: Vec<TrialRecord>,
    failures: usize,
    wall_seconds: f64,
}

#[derive(Debug, Serialize)]
struct GeneratedRecord {
    prime: String,
    rational_prime: String,
    residue_degree: usize,
    norm: String,
}

fn run_trial(
    ring: &Arc<CyclotomicRing>,
    bound: u64,
    seed: u64,
    trial: usize,
    params: &SearchParams,
) -> TrialRecord {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(trial as u64));
    let a = CyclotomicInteger::random_bounded(ring, bound, &mut rng);
    let b = CyclotomicInteger::random_bounded(ring, bound, &mut rng);
    let product = &a * &b;

    match factor(&product, params) {
        Ok(f) => {
            let rebuilt = f.product();
            let associate = product.is_zero() || rebuilt.is_associate(&product);
            TrialRecord {
                trial,
                product: product.to_string(),
                factors: f
                    .iter()
                    .map(|pf| FactorRecord {
                        prime: pf.prime.to_string(),
                        exponent: pf.exponent,
                        rational_prime: pf.rational_prime.to_string(),
                        residue_degree: pf.residue_degree,
                    })
                    .collect(),
                associate,
                error: None,
            }
        }
        Err(e) => TrialRecord {
            trial,
            product: product.to_string(),
            factors: Vec::new(),
            associate: false,
            error: Some(e.to_string()),
        },
    }
}

fn write_json<T: Serialize>(path: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => match std::fs::write(path, json) {
            Ok(()) => info!("report written to {}", path),
            Err(e) => error!("cannot write {}: {}", path, e),
        },
        Err(e) => error!("cannot serialize report: {}", e),
    }
}

fn round_trip(config: &CliConfig, ring: &Arc<CyclotomicRing>) -> bool {
    let params = SearchParams::default();
    let start = Instant::now();
    info!(
        "round trip: n = {}, bound = {}, {} trials, seed {}",
        config.degree, config.bound, config.trials, config.seed
    );

    let trials: Vec<TrialRecord> = (0..config.trials)
        .into_par_iter()
        .map(|t| run_trial(ring, config.bound, config.seed, t, &params))
        .collect();

    for t in &trials {
        let factors: Vec<String> = t
            .factors
            .iter()
            .map(|f| format!("{}: {}", f.prime, f.exponent))
            .collect();
        println!("{} {{{}}}", t.product, factors.join(", "));
        if let Some(e) = &t.error {
            error!("trial {}: {}", t.trial, e);
        } else if !t.associate {
            error!("trial {}: product of factors is not associate to {}", t.trial, t.product);
        }
    }

    let failures = trials.iter().filter(|t| !t.associate).count();
    let wall_seconds = start.elapsed().as_secs_f64();
    println!(
        "\n{} / {} round trips associate ({:.2}s)",
        trials.len() - failures,
        trials.len(),
        wall_seconds
    );

    if let Some(path) = &config.json {
        let report = RoundTripReport {
            degree: config.degree,
            bound: config.bound,
            seed: config.seed,
            trials,
            failures,
            wall_seconds,
        };
        write_json(path, &report);
    }
    failures == 0
}

fn gen_prime(config: &CliConfig, ring: &Arc<CyclotomicRing>) -> bool {
    let params = SearchParams::default();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut records = Vec::new();
    let mut ok = true;

    for _ in 0..config.trials {
        match generate_prime(
            ring,
            config.bits,
            config.order,
            DEFAULT_GENERATION_TRIES,
            &params,
            &mut rng,
        ) {
            Ok(g) => {
                let norm = g.prime.norm();
                println!(
                    "p = {} (f = {}): {}  norm = {}",
                    g.rational_prime, g.residue_degree, g.prime, norm
                );
                records.push(GeneratedRecord {
                    prime: g.prime.to_string(),
                    rational_prime: g.rational_prime.to_string(),
                    residue_degree: g.residue_degree,
                    norm: norm.to_string(),
                });
            }
            Err(e) => {
                error!("{}", e);
                ok = false;
                break;
            }
        }
    }

    if let Some(path) = &config.json {
        write_json(path, &records);
    }
    ok
}

fn main() {
    env_logger::init();
    let config = parse_args();

    let ring = match CyclotomicRing::new(config.degree) {
        Ok(ring) => ring,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let ok = match config.mode {
        Mode::RoundTrip => round_trip(&config, &ring),
        Mode::GenPrime => gen_prime(&config, &ring),
    };
    if !ok {
        std::process::exit(1);
    }
}
