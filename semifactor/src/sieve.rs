use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

use crate::errors::{FactorError, Result};
use crate::pool::{residue_class, WorkerPool};

/// Primality table for `0..=bound`, produced by [`generate`].
///
/// Entry `i` is true iff `i` is prime; entries 0 and 1 are always false.
/// The cells are atomics because marking passes run on several workers and
/// different primes may clear the same composite slot at the same time.
/// Once [`generate`] returns, the table is only read.
#[derive(Debug)]
pub struct SieveTable {
    cells: Vec<AtomicBool>,
}

impl SieveTable {
    /// Largest index covered by the table
    pub fn bound(&self) -> u64 {
        self.cells.len() as u64 - 1
    }

    /// Number of entries, `bound + 1`
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `i` is marked prime; indices past the bound are not
    pub fn is_prime(&self, i: u64) -> bool {
        usize::try_from(i)
            .ok()
            .and_then(|i| self.cells.get(i))
            .is_some_and(|cell| cell.load(Ordering::Relaxed))
    }

    /// Primality flags in index order
    pub fn flags(&self) -> impl Iterator<Item = bool> + '_ {
        self.cells.iter().map(|cell| cell.load(Ordering::Relaxed))
    }
}

/// Runs the Sieve of Eratosthenes over `0..=bound`.
///
/// The outer loop over seeds is sequential: a seed is only tested after every
/// smaller prime has been fully applied. Table initialization and each
/// marking pass for a fixed seed are split across `pool`'s workers by residue
/// class. Pass [`WorkerPool::inline`] for a fully sequential sieve.
pub fn generate(bound: u64, pool: &WorkerPool) -> Result<SieveTable> {
    let len = usize::try_from(bound)
        .ok()
        .and_then(|b| b.checked_add(1))
        .ok_or_else(|| FactorError::allocation_failure("sieve table", bound.saturating_add(1)))?;

    let mut cells: Vec<AtomicBool> = Vec::new();
    cells
        .try_reserve_exact(len)
        .map_err(|_| FactorError::allocation_failure("sieve table", len as u64))?;
    cells.resize_with(len, || AtomicBool::new(false));
    debug!("Allocated sieve table with {} entries", len);

    let workers = pool.workers();
    let table = &cells;

    // 0 and 1 stay false, everything else starts as a candidate
    pool.fork_join(|k| {
        for i in residue_class(k, workers, len) {
            table[i].store(i >= 2, Ordering::Relaxed);
        }
    });

    let limit = len - 1;
    let mut seed = 2usize;
    while seed <= limit / seed {
        if table[seed].load(Ordering::Relaxed) {
            mark_multiples(table, seed, limit, pool);
        }
        seed += 1;
    }

    Ok(SieveTable { cells })
}

/// Clears `seed * j` for `j = seed, seed + 1, ...` while the product stays
/// within `limit`. Multiples with a smaller cofactor were cleared by earlier
/// seeds. Worker `k` takes the multipliers `seed + k, seed + k + W, ...`, so
/// no two workers write the same slot within one pass.
fn mark_multiples(table: &[AtomicBool], seed: usize, limit: usize, pool: &WorkerPool) {
    let max_multiplier = limit / seed;
    let span = max_multiplier - seed + 1;
    let workers = pool.workers();
    trace!("Marking {} multiples of {}", span, seed);

    pool.fork_join(|k| {
        for offset in residue_class(k, workers, span) {
            table[seed * (seed + offset)].store(false, Ordering::Relaxed);
        }
    });
}
