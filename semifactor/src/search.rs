use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

use crate::extract::PrimeSequence;
use crate::metrics::PipelineMetrics;
use crate::pool::WorkerPool;
use crate::results::FactorResult;

/// Write-once slot shared by the search workers.
///
/// The pair cell accepts only the first successful write. The flag is raised
/// after that write and is what the workers poll between candidates.
#[derive(Debug, Default)]
struct SharedOutcome {
    found: AtomicBool,
    pair: OnceCell<(u64, u64)>,
}

impl SharedOutcome {
    fn is_found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    fn publish(&self, p: u64, q: u64) {
        if self.pair.set((p, q)).is_ok() {
            self.found.store(true, Ordering::Release);
        }
    }

    fn into_result(self) -> FactorResult {
        match self.pair.into_inner() {
            Some((p, q)) => FactorResult::found(p, q),
            None => FactorResult::not_found(),
        }
    }
}

/// Trial-divides `target` by every prime in `primes` across the pool.
///
/// Worker `k` scans positions `k, k + W, ...` in ascending order and checks
/// the shared flag before each candidate, stopping as soon as any worker has
/// published a divisor. A check already in progress finishes first. If no
/// prime divides `target` the result has `found == false`.
pub fn search(
    target: u64,
    primes: &PrimeSequence,
    pool: &WorkerPool,
    metrics: &PipelineMetrics,
) -> FactorResult {
    let outcome = SharedOutcome::default();
    scan(target, primes.as_slice(), pool, metrics, &outcome);
    outcome.into_result()
}

fn scan(
    target: u64,
    candidates: &[u64],
    pool: &WorkerPool,
    metrics: &PipelineMetrics,
    outcome: &SharedOutcome,
) {
    let workers = pool.workers();
    debug!(
        "Searching {} candidates for a divisor of {} on {} workers",
        candidates.len(),
        target,
        workers
    );

    pool.fork_join(|k| {
        let mut tested = 0u64;
        for &p in candidates.iter().skip(k).step_by(workers) {
            if outcome.is_found() {
                metrics.record_cancellation();
                break;
            }
            tested += 1;
            if target % p == 0 {
                trace!("Worker {} found divisor {}", k, p);
                outcome.publish(p, target / p);
                break;
            }
        }
        metrics.record_candidates(tested);
    });
}
