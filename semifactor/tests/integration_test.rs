use anyhow::Result;
use semifactor::bound::sieve_bound;
use semifactor::extract::extract;
use semifactor::pool::WorkerPool;
use semifactor::sieve::generate;
use semifactor::{factor, run, FactorConfig, FactorResult, ParallelMode};
use std::num::NonZeroUsize;

const MODES: [ParallelMode; 3] = [
    ParallelMode::Sequential,
    ParallelMode::Search,
    ParallelMode::Full,
];

fn workers(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn is_prime(n: u64) -> bool {
    n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

#[test]
fn test_documented_scenarios() -> Result<()> {
    let report = factor(77, workers(4), ParallelMode::Full)?;
    assert_eq!(report.bound, 8);
    assert_eq!(report.prime_count, 4);
    assert_eq!(report.result, FactorResult::found(7, 11));

    let report = factor(15, workers(4), ParallelMode::Full)?;
    assert_eq!(report.bound, 3);
    assert_eq!(report.prime_count, 2);
    assert_eq!(report.result, FactorResult::found(3, 5));

    let report = factor(71, workers(4), ParallelMode::Full)?;
    assert_eq!(report.bound, 8);
    assert!(!report.result.found);

    let report = factor(1, workers(4), ParallelMode::Full)?;
    assert_eq!(report.bound, 0);
    assert_eq!(report.prime_count, 0);
    assert!(!report.result.found);
    Ok(())
}

#[test]
fn test_zero_has_no_factors() -> Result<()> {
    for mode in MODES {
        let report = factor(0, workers(2), mode)?;
        assert_eq!(report.bound, 0);
        assert_eq!(report.result, FactorResult::not_found());
    }
    Ok(())
}

#[test]
fn test_small_semiprimes_are_factored() -> Result<()> {
    let small_primes: Vec<u64> = (2..200).filter(|&n| is_prime(n)).collect();
    for (i, &p) in small_primes.iter().enumerate() {
        for &q in &small_primes[i..] {
            let n = p * q;
            let report = factor(n, workers(3), ParallelMode::Full)?;
            let (found_p, found_q) = report.result.pair().expect("semiprime must factor");
            assert_eq!(found_p * found_q, n);
            assert_eq!((found_p, found_q), (p, q), "factoring {}", n);
            assert!(found_p <= sieve_bound(n));
        }
    }
    Ok(())
}

#[test]
fn test_primes_are_not_factored() -> Result<()> {
    for n in (2..2_000u64).filter(|&n| is_prime(n)) {
        let report = factor(n, workers(2), ParallelMode::Search)?;
        assert!(!report.result.found, "prime {} reported as factored", n);
    }
    Ok(())
}

#[test]
fn test_squares_of_primes() -> Result<()> {
    for p in [2u64, 3, 31, 65_521, 99_991] {
        let report = factor(p * p, workers(4), ParallelMode::Full)?;
        assert_eq!(report.bound, p);
        assert_eq!(report.result.pair(), Some((p, p)));
    }
    Ok(())
}

#[test]
fn test_result_independent_of_worker_count_and_mode() -> Result<()> {
    // 104_729 * 1_299_709
    let target = 136_117_223_861u64;
    let expected = factor(target, workers(1), ParallelMode::Sequential)?.result;
    assert_eq!(expected.pair(), Some((104_729, 1_299_709)));

    for mode in MODES {
        for count in [1, 2, 4, 8] {
            let report = factor(target, workers(count), mode)?;
            assert_eq!(report.result, expected, "{} mode, {} workers", mode, count);
        }
    }
    Ok(())
}

#[test]
fn test_sieve_and_extract_are_repeatable() -> Result<()> {
    let pool = WorkerPool::new(workers(4))?;
    let first = extract(generate(200_000, &pool)?)?;
    let second = extract(generate(200_000, &pool)?)?;
    assert_eq!(first.as_slice(), second.as_slice());
    assert_eq!(first.len(), 17_984);
    Ok(())
}

#[test]
fn test_sieve_twenty_through_public_api() -> Result<()> {
    let table = generate(20, &WorkerPool::inline())?;
    let marked: Vec<u64> = (0..=20).filter(|&i| table.is_prime(i)).collect();
    assert_eq!(marked, vec![2, 3, 5, 7, 11, 13, 17, 19]);
    assert_eq!(extract(table)?.as_slice(), &[2, 3, 5, 7, 11, 13, 17, 19]);
    Ok(())
}

#[test]
fn test_run_with_config_value() -> Result<()> {
    let config = FactorConfig {
        target: Some(10_403), // 101 * 103
        thread_count: workers(2),
        mode: ParallelMode::Full,
        log_level: "warn".to_string(),
    };
    let report = run(&config)?;
    assert_eq!(report.target, 10_403);
    assert_eq!(report.workers, 2);
    assert_eq!(report.result.pair(), Some((101, 103)));
    assert!(report.stats.candidates_tested >= 1);
    Ok(())
}

#[test]
fn test_report_serializes() -> Result<()> {
    let report = factor(77, workers(2), ParallelMode::Full)?;
    let json = serde_json::to_value(&report)?;
    assert_eq!(json["target"], 77);
    assert_eq!(json["mode"], "full");
    assert_eq!(json["result"]["found"], true);
    assert_eq!(json["result"]["p"], 7);
    assert_eq!(json["result"]["q"], 11);
    Ok(())
}
