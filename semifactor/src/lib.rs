pub mod bound;
pub mod config;
pub mod errors;
pub mod extract;
pub mod metrics;
pub mod pipeline;
pub mod pool;
pub mod results;
pub mod search;
pub mod sieve;

pub use crate::config::{FactorConfig, ParallelMode};
pub use errors::{FactorError, Result};
pub use extract::PrimeSequence;
pub use pipeline::{factor, run};
pub use results::{FactorReport, FactorResult};
pub use sieve::SieveTable;
