//! Backward sweep: dependency accumulation from the deepest level up.
//!
//! `bc_update(r, v)` starts at 1 for every cell and ends as
//! `1 + delta(sources[r], v)`, where `delta` is the Brandes dependency of
//! the source on `v`. Column sums minus the batch size are the centrality
//! contributions of the batch.

use betwixt_algebra::{
    AlgebraError, BinaryOp, Descriptor, Mask, Matrix, Monoid, Representation, Semiring,
    ewise_mult, ewise_mult_accum, mxm, reduce_columns,
};
use tracing::{debug, instrument};

use crate::config::BetweennessConfig;
use crate::direction::{Direction, backward_direction, density};
use crate::error::{BetweennessError, EngineContext};
use crate::frontier::{Levels, StepStats};

/// Result of [`backward_sweep`].
#[derive(Debug, Clone)]
pub struct BackwardSweep {
    /// Per-vertex centrality contributed by this batch.
    pub centrality: Vec<f64>,
    pub steps: Vec<StepStats>,
}

/// Fold the dependencies recorded by the forward sweep into per-vertex
/// scores.
///
/// `levels` is consumed: each level is only needed once on the way up.
///
/// # Errors
///
/// [`BetweennessError::OutOfMemory`] if `bc_update` or the result vector
/// cannot be allocated, [`BetweennessError::EngineFailure`] if an algebra
/// call rejects its operands.
#[instrument(skip_all, fields(ns = paths.nrows(), n = paths.ncols(), depth = levels.depth()))]
pub fn backward_sweep(
    a: &Matrix<bool>,
    at: &Matrix<bool>,
    paths: &Matrix<f64>,
    levels: Levels,
    config: &BetweennessConfig,
) -> Result<BackwardSweep, BetweennessError> {
    let (ns, n) = (paths.nrows(), paths.ncols());
    let mut bc_update = Matrix::full(ns, n, 1.0).during("allocate bc_update")?;
    let mut steps = Vec::new();

    for i in (1..levels.depth()).rev() {
        let w = dependency_ratio(&bc_update, paths, &levels[i])?;

        let prev = &levels[i - 1];
        let w_size = w.nvals();
        let ratio = w_size as f64 / prev.nvals().max(1) as f64;
        let w_density = density(w_size, ns, n);
        let direction = config.direction.resolve(backward_direction(
            w_density,
            ratio,
            &config.thresholds,
        ));

        // W<S[i-1]> = W * A'
        let w = match direction {
            Direction::Pull => mxm(
                Some(Mask::structural(prev)),
                Semiring::PLUS_FIRST,
                &w,
                a,
                Descriptor::new()
                    .with_transposed_second()
                    .with_output(Representation::Bitmap),
            ),
            Direction::Push => mxm(
                Some(Mask::structural(prev)),
                Semiring::PLUS_FIRST,
                &w,
                at,
                Descriptor::new(),
            ),
        }
        .during("dependency propagation")?;

        // bc_update += W .* paths
        ewise_mult_accum(&mut bc_update, BinaryOp::Plus, BinaryOp::Times, &w, paths)
            .during("accumulate dependencies")?;

        debug!(depth = i, %direction, density = w_density, ratio, nvals = w.nvals(), "backward step");
        steps.push(StepStats {
            depth: i,
            direction,
            nvals: w.nvals(),
        });
    }
    drop(levels);

    let mut centrality = Vec::new();
    centrality
        .try_reserve_exact(n)
        .map_err(|_| BetweennessError::OutOfMemory {
            step: "allocate centrality",
            source: AlgebraError::OutOfMemory {
                bytes: n.saturating_mul(std::mem::size_of::<f64>()),
            },
        })?;
    centrality.resize(n, -(ns as f64));
    reduce_columns(&mut centrality, Some(BinaryOp::Plus), Monoid::Plus, &bc_update)
        .during("reduce centrality")?;

    Ok(BackwardSweep { centrality, steps })
}

/// `W<level> = bc_update ./ paths`: per-path share of the dependency for
/// each vertex on `level`.
fn dependency_ratio(
    bc_update: &Matrix<f64>,
    paths: &Matrix<f64>,
    level: &Matrix<bool>,
) -> Result<Matrix<f64>, BetweennessError> {
    ewise_mult(
        Some(Mask::structural(level)),
        BinaryOp::Div,
        bc_update,
        paths,
        Descriptor::new(),
    )
    .during("dependency ratio")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontier::forward_sweep;
    use crate::graph::{Graph, GraphKind};

    #[test]
    fn ratio_is_restricted_to_level() {
        let bc = Matrix::full(1, 4, 3.0).expect("full");
        let paths =
            Matrix::from_triplets(1, 4, [(0, 0, 1.0), (0, 1, 1.0), (0, 2, 2.0), (0, 3, 4.0)])
                .expect("paths");
        let level = Matrix::from_triplets(1, 4, [(0, 2, true), (0, 3, true)]).expect("level");
        let w = dependency_ratio(&bc, &paths, &level).expect("ratio");
        assert_eq!(w.entries().collect::<Vec<_>>(), vec![(0, 2, 1.5), (0, 3, 0.75)]);
    }

    #[test]
    fn diamond_middle_vertices_split_dependency() {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3: from source 0, vertices 1 and 2 each
        // carry half of the single dependency on 3.
        let mut g = Graph::from_edges(4, [(0, 1), (0, 2), (1, 3), (2, 3)], GraphKind::Directed)
            .expect("build");
        g.cache_transpose().expect("transpose");
        let config = BetweennessConfig::default();
        let at = g.transpose_pattern().expect("transpose");
        let fw = forward_sweep(g.adjacency_pattern(), at, &[0], &config).expect("forward");
        let bw = backward_sweep(g.adjacency_pattern(), at, &fw.paths, fw.levels, &config)
            .expect("backward");
        assert_eq!(bw.centrality, vec![0.0, 0.5, 0.5, 0.0]);
        assert_eq!(bw.steps.len(), 1);
        assert_eq!(bw.steps[0].depth, 1);
    }
}
