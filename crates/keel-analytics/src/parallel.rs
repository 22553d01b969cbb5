//! Parallel processing utilities.
//!
//! Provides conditional parallel iteration based on configuration
//! and collection size. Uses rayon when the `parallel` feature is enabled.

use crate::config::ComputeConfig;

/// Maps a function over items, conditionally using parallel iteration.
///
/// Uses parallel iteration when:
/// - The `parallel` feature is enabled
/// - `config.parallel` is true
/// - The collection size reaches `config.parallel_threshold`
///
/// Output order always matches input order.
///
/// # Example
///
/// ```rust
/// use keel_analytics::config::ComputeConfig;
/// use keel_analytics::parallel::maybe_parallel_map;
///
/// let squares = maybe_parallel_map(&[1.0, 2.0, 3.0], &ComputeConfig::default(), |x| x * x);
/// assert_eq!(squares, vec![1.0, 4.0, 9.0]);
/// ```
#[allow(unused_variables)]
pub fn maybe_parallel_map<T, U, F>(items: &[T], config: &ComputeConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maybe_parallel_map() {
        let config = ComputeConfig::sequential();
        let items = vec![1, 2, 3, 4, 5];
        let results: Vec<i32> = maybe_parallel_map(&items, &config, |x| x * 2);
        assert_eq!(results, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_parallel_preserves_order() {
        let config = ComputeConfig::new().with_threshold(1);
        let items: Vec<usize> = (0..1000).collect();
        let results = maybe_parallel_map(&items, &config, |i| i * 3);
        assert!(results.iter().enumerate().all(|(i, v)| *v == i * 3));
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<f64> = Vec::new();
        let results: Vec<f64> = maybe_parallel_map(&items, &ComputeConfig::default(), |x| *x);
        assert!(results.is_empty());
    }
}
