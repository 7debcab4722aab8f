use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::{debug, info};

use crate::bound::sieve_bound;
use crate::config::{FactorConfig, ParallelMode};
use crate::errors::Result;
use crate::extract::extract;
use crate::metrics::{Phase, PipelineMetrics};
use crate::pool::WorkerPool;
use crate::results::FactorReport;
use crate::search::search;
use crate::sieve::generate;

/// Factors `target` with `workers` workers in the given mode
pub fn factor(target: u64, workers: NonZeroUsize, mode: ParallelMode) -> Result<FactorReport> {
    let config = FactorConfig {
        target: Some(target),
        thread_count: workers,
        mode,
        ..FactorConfig::default()
    };
    run(&config)
}

/// Runs bound, sieve, extraction and divisor search for `config.target`.
///
/// Each phase completes before the next starts. The sieve table is consumed
/// by extraction and freed before the search begins.
pub fn run(config: &FactorConfig) -> Result<FactorReport> {
    let target = config.target();
    info!(
        "Factoring {} ({} mode, {} workers)",
        target,
        config.mode,
        config.workers()
    );

    let inline = WorkerPool::inline();
    let pool = match config.mode {
        ParallelMode::Sequential => WorkerPool::inline(),
        _ => WorkerPool::new(config.thread_count)?,
    };
    let sieve_pool = if config.mode.parallel_sieve() {
        &pool
    } else {
        &inline
    };
    let search_pool = if config.mode.parallel_search() {
        &pool
    } else {
        &inline
    };

    let metrics = PipelineMetrics::new();

    let started = Instant::now();
    let bound = sieve_bound(target);
    metrics.record_phase(Phase::Bound, started.elapsed());
    info!("Maximum lower prime is {}", bound);

    let started = Instant::now();
    let table = generate(bound, sieve_pool)?;
    metrics.record_phase(Phase::Sieve, started.elapsed());

    let started = Instant::now();
    let primes = extract(table)?;
    metrics.record_phase(Phase::Extract, started.elapsed());
    debug!("{} candidate primes", primes.len());

    let started = Instant::now();
    let result = search(target, &primes, search_pool, &metrics);
    metrics.record_phase(Phase::Search, started.elapsed());

    match result.pair() {
        Some((p, q)) => info!("Found factors {} x {} of {}", p, q, target),
        None => info!("No prime factor of {} up to {}", target, bound),
    }
    metrics.log_stats();

    Ok(FactorReport {
        target,
        bound,
        prime_count: primes.len(),
        largest_prime: primes.largest(),
        workers: search_pool.workers(),
        mode: config.mode,
        result,
        stats: metrics.snapshot(),
    })
}
