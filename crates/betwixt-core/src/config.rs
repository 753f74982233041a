//! Engine configuration.
//!
//! Every field has a default, so an empty TOML table deserializes to
//! [`BetweennessConfig::default`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BetweennessError;

/// Which multiply kernel each step may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectionPolicy {
    /// Decide per step from frontier density (the normal mode).
    #[default]
    Adaptive,
    /// Always push.
    PushOnly,
    /// Always pull.
    PullOnly,
}

impl fmt::Display for DirectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adaptive => write!(f, "adaptive"),
            Self::PushOnly => write!(f, "push-only"),
            Self::PullOnly => write!(f, "pull-only"),
        }
    }
}

impl FromStr for DirectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "adaptive" => Ok(Self::Adaptive),
            "push" | "push-only" => Ok(Self::PushOnly),
            "pull" | "pull-only" => Ok(Self::PullOnly),
            other => Err(format!(
                "unknown direction policy '{other}' (expected adaptive, push or pull)"
            )),
        }
    }
}

/// Density cut-offs of the adaptive direction heuristic.
///
/// Densities are `nnz / (sources * vertices)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Forward: pull once the frontier is denser than this.
    pub forward_pull_density: f64,
    /// Forward: keep pulling while the frontier stays denser than this.
    pub forward_stay_pull_density: f64,
    /// Backward: pull when `W` is denser than this...
    pub backward_pull_density: f64,
    /// ...and `nnz(W) / nnz(S[i-1])` exceeds this.
    pub backward_pull_ratio: f64,
    /// Backward: also pull when `W` is denser than this...
    pub backward_sparse_pull_density: f64,
    /// ...and the ratio exceeds this.
    pub backward_sparse_pull_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            forward_pull_density: 0.10,
            forward_stay_pull_density: 0.06,
            backward_pull_density: 0.10,
            backward_pull_ratio: 1.0,
            backward_sparse_pull_density: 0.01,
            backward_sparse_pull_ratio: 10.0,
        }
    }
}

/// Everything a [`Betweenness`](crate::Betweenness) run can be tuned with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BetweennessConfig {
    pub direction: DirectionPolicy,
    pub thresholds: Thresholds,
    /// Worker threads for the bulk kernels. `None` uses the global rayon
    /// pool.
    pub threads: Option<usize>,
}

impl BetweennessConfig {
    /// Reject values no run could use.
    ///
    /// # Errors
    ///
    /// [`BetweennessError::InvalidArgument`] for a zero thread count or a
    /// negative or non-finite threshold.
    pub fn validate(&self) -> Result<(), BetweennessError> {
        if self.threads == Some(0) {
            return Err(BetweennessError::InvalidArgument(
                "threads must be at least 1".into(),
            ));
        }
        let t = &self.thresholds;
        for (name, value) in [
            ("forward_pull_density", t.forward_pull_density),
            ("forward_stay_pull_density", t.forward_stay_pull_density),
            ("backward_pull_density", t.backward_pull_density),
            ("backward_pull_ratio", t.backward_pull_ratio),
            ("backward_sparse_pull_density", t.backward_sparse_pull_density),
            ("backward_sparse_pull_ratio", t.backward_sparse_pull_ratio),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BetweennessError::InvalidArgument(format!(
                    "threshold {name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
