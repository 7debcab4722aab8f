use serde::Serialize;
use std::ops::Deref;
use tracing::debug;

use crate::errors::{FactorError, Result};
use crate::sieve::SieveTable;

/// Ascending, duplicate-free primes taken from a [`SieveTable`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrimeSequence {
    primes: Vec<u64>,
}

impl PrimeSequence {
    pub fn as_slice(&self) -> &[u64] {
        &self.primes
    }

    /// Largest prime in the sequence
    pub fn largest(&self) -> Option<u64> {
        self.primes.last().copied()
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.primes
    }
}

impl Deref for PrimeSequence {
    type Target = [u64];

    fn deref(&self) -> &[u64] {
        &self.primes
    }
}

impl<'a> IntoIterator for &'a PrimeSequence {
    type Item = &'a u64;
    type IntoIter = std::slice::Iter<'a, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.primes.iter()
    }
}

/// Compacts a finished table into its primes and drops the table.
///
/// The first pass counts the primes so the output is reserved once at its
/// exact size; the second pass copies them in ascending order.
pub fn extract(table: SieveTable) -> Result<PrimeSequence> {
    let count = table.flags().skip(2).filter(|&prime| prime).count();

    let mut primes = Vec::new();
    primes
        .try_reserve_exact(count)
        .map_err(|_| FactorError::allocation_failure("prime sequence", count as u64))?;

    primes.extend(
        table
            .flags()
            .enumerate()
            .skip(2)
            .filter(|&(_, prime)| prime)
            .map(|(i, _)| i as u64),
    );
    debug_assert_eq!(primes.len(), count);
    debug!(
        "Extracted {} primes up to {}, releasing sieve table",
        count,
        table.bound()
    );

    Ok(PrimeSequence { primes })
}
