use serde::Serialize;

use crate::config::ParallelMode;
use crate::metrics::PipelineStats;

/// Outcome of the divisor search.
///
/// When `found` is true, `p * q` equals the target and `p` is the divisor
/// that was located in the prime sequence. When it is false both factors
/// are zero; this covers prime targets and targets below 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FactorResult {
    pub found: bool,
    pub p: u64,
    pub q: u64,
}

impl FactorResult {
    pub fn found(p: u64, q: u64) -> Self {
        Self { found: true, p, q }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    /// The factor pair, if one was found
    pub fn pair(&self) -> Option<(u64, u64)> {
        self.found.then_some((self.p, self.q))
    }
}

/// Everything a run produced, handed back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct FactorReport {
    pub target: u64,
    pub bound: u64,
    pub prime_count: usize,
    pub largest_prime: Option<u64>,
    pub workers: usize,
    pub mode: ParallelMode,
    pub result: FactorResult,
    pub stats: PipelineStats,
}

impl FactorReport {
    pub fn is_found(&self) -> bool {
        self.result.found
    }
}
