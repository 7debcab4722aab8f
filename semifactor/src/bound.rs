use tracing::trace;

/// Computes the sieve bound `floor(sqrt(n))`.
///
/// The floating-point root is only a starting estimate. An `f64` carries 53
/// bits of mantissa, so for large `n` the estimate can land one or more steps
/// away from the true root, and a root that comes out one too small would drop
/// the smaller factor of a prime square from the candidate set. The estimate
/// is corrected until `b * b <= n < (b + 1) * (b + 1)`.
///
/// `0` and `1` have no prime divisors and map to a bound of `0`, which yields
/// an empty prime sequence.
pub fn sieve_bound(n: u64) -> u64 {
    if n < 2 {
        return 0;
    }

    let mut root = (n as f64).sqrt() as u64;

    // Step down while root^2 overshoots (includes the overflow case)
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    // Step up while (root+1)^2 still fits under n
    while (root + 1).checked_mul(root + 1).is_some_and(|sq| sq <= n) {
        root += 1;
    }

    trace!("sieve bound for {} is {}", n, root);
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_floor_sqrt(n: u64, b: u64) -> bool {
        let b = b as u128;
        let n = n as u128;
        b * b <= n && n < (b + 1) * (b + 1)
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(sieve_bound(0), 0);
        assert_eq!(sieve_bound(1), 0);
        assert_eq!(sieve_bound(2), 1);
        assert_eq!(sieve_bound(3), 1);
        assert_eq!(sieve_bound(4), 2);
    }

    #[test]
    fn test_small_values() {
        assert_eq!(sieve_bound(15), 3);
        assert_eq!(sieve_bound(71), 8);
        assert_eq!(sieve_bound(77), 8);
        assert_eq!(sieve_bound(80), 8);
        assert_eq!(sieve_bound(81), 9);
    }

    #[test]
    fn test_perfect_squares_of_primes() {
        for p in [2u64, 3, 65_521, 4_294_967_291] {
            assert_eq!(sieve_bound(p * p), p, "bound for {}^2", p);
            assert_eq!(sieve_bound(p * p - 1), p - 1, "bound for {}^2 - 1", p);
        }
    }

    #[test]
    fn test_near_square_boundaries() {
        // Near the u64 ceiling and the f64 mantissa limit
        let samples = [
            u64::MAX,
            u64::MAX - 1,
            (1u64 << 52) + 1,
            9_007_199_254_740_993,
            18_446_744_030_759_878_681, // 4294967291^2
            18_446_744_030_759_878_680,
        ];
        for n in samples {
            assert!(is_floor_sqrt(n, sieve_bound(n)), "bound for {}", n);
        }
    }

    #[test]
    fn test_exhaustive_small_range() {
        for n in 2..20_000u64 {
            assert!(is_floor_sqrt(n, sieve_bound(n)), "bound for {}", n);
        }
    }
}
