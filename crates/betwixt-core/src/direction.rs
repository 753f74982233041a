//! Push/pull choice for each multiply step.
//!
//! Pushing scatters from the entries of the current frontier and is cheap
//! while the frontier is sparse. Pulling gathers for every admissible output
//! and wins once a sizeable fraction of `sources * vertices` is active.
//! Both produce identical values; only cost differs.

use serde::Serialize;

use crate::config::{DirectionPolicy, Thresholds};

/// The kernel a step ran with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Push,
    Pull,
}

impl Direction {
    #[must_use]
    pub const fn is_pull(self) -> bool {
        matches!(self, Self::Pull)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Pull => write!(f, "pull"),
        }
    }
}

/// Forward sweep: pull when the frontier is dense, and stay in pull while
/// it remains moderately dense.
#[must_use]
pub fn forward_direction(density: f64, last_was_pull: bool, t: &Thresholds) -> Direction {
    if density > t.forward_pull_density
        || (density > t.forward_stay_pull_density && last_was_pull)
    {
        Direction::Pull
    } else {
        Direction::Push
    }
}

/// Backward sweep: pull when `W` is dense and larger than the level it
/// propagates into, measured by `ratio = nnz(W) / nnz(S[i-1])`.
#[must_use]
pub fn backward_direction(density: f64, ratio: f64, t: &Thresholds) -> Direction {
    if (density > t.backward_pull_density && ratio > t.backward_pull_ratio)
        || (density > t.backward_sparse_pull_density && ratio > t.backward_sparse_pull_ratio)
    {
        Direction::Pull
    } else {
        Direction::Push
    }
}

impl DirectionPolicy {
    /// Apply the policy on top of the heuristic's suggestion.
    #[must_use]
    pub const fn resolve(self, adaptive: Direction) -> Direction {
        match self {
            Self::Adaptive => adaptive,
            Self::PushOnly => Direction::Push,
            Self::PullOnly => Direction::Pull,
        }
    }
}

/// `nnz / (rows * cols)`, zero for an empty shape.
pub(crate) fn density(nvals: usize, rows: usize, cols: usize) -> f64 {
    let cells = rows as f64 * cols as f64;
    if cells > 0.0 { nvals as f64 / cells } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_switches_and_sticks() {
        let t = Thresholds::default();
        assert_eq!(forward_direction(0.05, false, &t), Direction::Push);
        assert_eq!(forward_direction(0.11, false, &t), Direction::Pull);
        assert_eq!(forward_direction(0.08, false, &t), Direction::Push);
        assert_eq!(forward_direction(0.08, true, &t), Direction::Pull);
        assert_eq!(forward_direction(0.06, true, &t), Direction::Push);
    }

    #[test]
    fn backward_needs_density_and_ratio() {
        let t = Thresholds::default();
        assert_eq!(backward_direction(0.5, 0.9, &t), Direction::Push);
        assert_eq!(backward_direction(0.5, 1.5, &t), Direction::Pull);
        assert_eq!(backward_direction(0.05, 5.0, &t), Direction::Push);
        assert_eq!(backward_direction(0.05, 11.0, &t), Direction::Pull);
        assert_eq!(backward_direction(0.005, 100.0, &t), Direction::Push);
    }

    #[test]
    fn policy_overrides_heuristic() {
        assert_eq!(DirectionPolicy::Adaptive.resolve(Direction::Pull), Direction::Pull);
        assert_eq!(DirectionPolicy::PushOnly.resolve(Direction::Pull), Direction::Push);
        assert_eq!(DirectionPolicy::PullOnly.resolve(Direction::Push), Direction::Pull);
    }

    #[test]
    fn density_of_empty_shape_is_zero() {
        assert!(density(0, 0, 5).abs() < f64::EPSILON);
        assert!((density(5, 2, 5) - 0.5).abs() < f64::EPSILON);
    }
}
