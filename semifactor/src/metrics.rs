use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Pipeline phases that are timed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bound,
    Sieve,
    Extract,
    Search,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Bound => "bound",
            Phase::Sieve => "sieve",
            Phase::Extract => "extract",
            Phase::Search => "search",
        }
    }
}

/// Tracks per-phase timings and search progress
#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    // Phase durations in nanoseconds
    bound_nanos: Arc<AtomicU64>,
    sieve_nanos: Arc<AtomicU64>,
    extract_nanos: Arc<AtomicU64>,
    search_nanos: Arc<AtomicU64>,

    // Search metrics
    candidates_tested: Arc<AtomicU64>,
    workers_cancelled: Arc<AtomicU64>,
}

impl PipelineMetrics {
    /// Creates a new PipelineMetrics instance
    pub fn new() -> Self {
        Self {
            bound_nanos: Arc::new(AtomicU64::new(0)),
            sieve_nanos: Arc::new(AtomicU64::new(0)),
            extract_nanos: Arc::new(AtomicU64::new(0)),
            search_nanos: Arc::new(AtomicU64::new(0)),
            candidates_tested: Arc::new(AtomicU64::new(0)),
            workers_cancelled: Arc::new(AtomicU64::new(0)),
        }
    }

    fn slot(&self, phase: Phase) -> &AtomicU64 {
        match phase {
            Phase::Bound => &self.bound_nanos,
            Phase::Sieve => &self.sieve_nanos,
            Phase::Extract => &self.extract_nanos,
            Phase::Search => &self.search_nanos,
        }
    }

    /// Records how long a phase took
    pub fn record_phase(&self, phase: Phase, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.slot(phase).store(nanos, Ordering::Relaxed);
        debug!(
            "Phase {} done in {}",
            phase.name(),
            humantime::format_duration(elapsed)
        );
    }

    /// Records that a worker finished testing `count` candidates
    pub fn record_candidates(&self, count: u64) {
        self.candidates_tested.fetch_add(count, Ordering::Relaxed);
    }

    /// Records that a worker stopped early after seeing the found flag
    pub fn record_cancellation(&self) {
        self.workers_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the current statistics
    pub fn snapshot(&self) -> PipelineStats {
        let load = |slot: &AtomicU64| Duration::from_nanos(slot.load(Ordering::Relaxed));
        PipelineStats {
            bound_time: load(&*self.bound_nanos),
            sieve_time: load(&*self.sieve_nanos),
            extract_time: load(&*self.extract_nanos),
            search_time: load(&*self.search_nanos),
            candidates_tested: self.candidates_tested.load(Ordering::Relaxed),
            workers_cancelled: self.workers_cancelled.load(Ordering::Relaxed),
        }
    }

    /// Logs the current statistics
    pub fn log_stats(&self) {
        let stats = self.snapshot();
        info!(
            "Pipeline stats:\n\
             Bound: {}\n\
             Sieve: {}\n\
             Extract: {}\n\
             Search: {}\n\
             Candidates tested: {}\n\
             Workers cancelled early: {}",
            humantime::format_duration(stats.bound_time),
            humantime::format_duration(stats.sieve_time),
            humantime::format_duration(stats.extract_time),
            humantime::format_duration(stats.search_time),
            stats.candidates_tested,
            stats.workers_cancelled
        );
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub bound_time: Duration,
    pub sieve_time: Duration,
    pub extract_time: Duration,
    pub search_time: Duration,
    pub candidates_tested: u64,
    pub workers_cancelled: u64,
}

impl PipelineStats {
    /// Sum of all phase durations
    pub fn total_time(&self) -> Duration {
        self.bound_time + self.sieve_time + self.extract_time + self.search_time
    }

    pub fn phase_time(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Bound => self.bound_time,
            Phase::Sieve => self.sieve_time,
            Phase::Extract => self.extract_time,
            Phase::Search => self.search_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_timing() {
        let metrics = PipelineMetrics::new();

        metrics.record_phase(Phase::Sieve, Duration::from_millis(30));
        metrics.record_phase(Phase::Search, Duration::from_millis(12));
        let stats = metrics.snapshot();
        assert_eq!(stats.sieve_time, Duration::from_millis(30));
        assert_eq!(stats.search_time, Duration::from_millis(12));
        assert_eq!(stats.bound_time, Duration::ZERO);
        assert_eq!(stats.total_time(), Duration::from_millis(42));
        assert_eq!(stats.phase_time(Phase::Sieve), Duration::from_millis(30));
    }

    #[test]
    fn test_candidate_counting_across_clones() {
        let metrics = PipelineMetrics::new();
        let shared = metrics.clone();

        metrics.record_candidates(10);
        shared.record_candidates(5);
        shared.record_cancellation();

        let stats = metrics.snapshot();
        assert_eq!(stats.candidates_tested, 15);
        assert_eq!(stats.workers_cancelled, 1);
    }
}
