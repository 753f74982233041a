//! Source batches: validation and selection helpers.

use fixedbitset::FixedBitSet;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::BetweennessError;

/// Check that `sources` is a usable batch for a graph with `n` vertices.
///
/// # Errors
///
/// [`BetweennessError::InvalidArgument`] if the batch is empty, contains an
/// id `>= n`, or names the same vertex twice.
pub fn validate_sources(sources: &[usize], n: usize) -> Result<(), BetweennessError> {
    if sources.is_empty() {
        return Err(BetweennessError::InvalidArgument(
            "source batch is empty".into(),
        ));
    }
    let mut seen = FixedBitSet::with_capacity(n);
    for (pos, &s) in sources.iter().enumerate() {
        if s >= n {
            return Err(BetweennessError::InvalidArgument(format!(
                "source {s} at position {pos} is outside 0..{n}"
            )));
        }
        if seen.put(s) {
            return Err(BetweennessError::InvalidArgument(format!(
                "source {s} appears more than once"
            )));
        }
    }
    Ok(())
}

/// Pick `k` distinct vertices out of `0..n` uniformly at random, returned in
/// ascending order. The same seed always yields the same batch. `k` is
/// clamped to `n`.
#[must_use]
pub fn sample_sources(n: usize, k: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, n, k.min(n)).into_vec();
    picked.sort_unstable();
    picked
}

/// Every vertex as a source: exact betweenness.
#[must_use]
pub fn all_sources(n: usize) -> Vec<usize> {
    (0..n).collect()
}
