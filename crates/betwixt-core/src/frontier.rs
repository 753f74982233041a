//! Forward sweep: batched breadth-first search from every source at once.
//!
//! Row `r` of every matrix here belongs to source `sources[r]`; column `v`
//! is a vertex. The sweep produces
//!
//! - `paths(r, v)`: the number of shortest paths from `sources[r]` to `v`,
//!   including the source itself with count 1, and
//! - `levels[d]`: the pattern of vertices at distance `d + 1` from each
//!   source.

use std::ops::Index;

use betwixt_algebra::{
    BinaryOp, Descriptor, Mask, Matrix, Representation, Semiring, accumulate, mxm, pattern_of,
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::BetweennessConfig;
use crate::direction::{Direction, density, forward_direction};
use crate::error::{BetweennessError, EngineContext};

/// What one multiply step did, for reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepStats {
    /// Sweep depth the step started from.
    pub depth: usize,
    pub direction: Direction,
    /// Entries in the step's result.
    pub nvals: usize,
}

/// Per-depth frontier patterns, `ns x n` each.
///
/// Index `d` holds the vertices first reached at distance `d + 1`. The
/// sources themselves (distance 0) are not recorded.
#[derive(Debug, Clone, Default)]
pub struct Levels {
    patterns: Vec<Matrix<bool>>,
}

impl Levels {
    /// Number of recorded levels, i.e. the largest finite distance from any
    /// source.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn get(&self, depth: usize) -> Option<&Matrix<bool>> {
        self.patterns.get(depth)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Matrix<bool>> {
        self.patterns.iter()
    }
}

impl Index<usize> for Levels {
    type Output = Matrix<bool>;

    fn index(&self, depth: usize) -> &Matrix<bool> {
        &self.patterns[depth]
    }
}

/// Result of [`forward_sweep`].
#[derive(Debug, Clone)]
pub struct ForwardSweep {
    pub paths: Matrix<f64>,
    pub levels: Levels,
    pub steps: Vec<StepStats>,
}

/// Expand all sources level by level until no source reaches anything new.
///
/// `a` is the adjacency pattern and `at` its transpose (the same matrix for
/// symmetric graphs). Sources must already be validated.
///
/// # Errors
///
/// [`BetweennessError::OutOfMemory`] if a call-scoped matrix cannot be
/// allocated, [`BetweennessError::EngineFailure`] if an algebra call rejects
/// its operands.
#[instrument(skip_all, fields(ns = sources.len(), n = a.nrows()))]
pub fn forward_sweep(
    a: &Matrix<bool>,
    at: &Matrix<bool>,
    sources: &[usize],
    config: &BetweennessConfig,
) -> Result<ForwardSweep, BetweennessError> {
    let n = a.nrows();
    let ns = sources.len();

    let mut paths = Matrix::<f64>::new(ns, n);
    paths
        .set_representation_hint(Representation::Bitmap)
        .during("allocate paths")?;
    for (row, &s) in sources.iter().enumerate() {
        paths.set_element(row, s, 1.0).during("seed paths")?;
    }
    let seeds = Matrix::from_triplets(
        ns,
        n,
        sources.iter().enumerate().map(|(row, &s)| (row, s, 1.0)),
    )
    .during("seed frontier")?;

    // frontier<!paths> = seeds * A
    let mut frontier = mxm(
        Some(Mask::complement(&paths)),
        Semiring::PLUS_FIRST,
        &seeds,
        a,
        Descriptor::new(),
    )
    .during("initial expansion")?;
    drop(seeds);

    let mut levels = Vec::new();
    let mut steps = Vec::new();
    let mut frontier_size = frontier.nvals();
    let mut last_frontier_size = 0;
    let mut last_was_pull = false;
    let mut depth = 0;

    while frontier_size > 0 && depth < n {
        let mut level = pattern_of(&frontier).during("record level")?;
        level
            .set_representation_hint(Representation::Sparse)
            .during("record level")?;
        levels.push(level);
        accumulate(&mut paths, BinaryOp::Plus, &frontier).during("accumulate paths")?;

        let frontier_density = density(frontier_size, ns, n);
        let growing = frontier_size > last_frontier_size;
        let direction = config.direction.resolve(forward_direction(
            frontier_density,
            last_was_pull,
            &config.thresholds,
        ));

        // frontier<!paths> = frontier * A
        frontier = match direction {
            Direction::Pull => mxm(
                Some(Mask::complement(&paths)),
                Semiring::PLUS_FIRST,
                &frontier,
                at,
                Descriptor::new()
                    .with_transposed_second()
                    .with_output(Representation::Bitmap),
            ),
            Direction::Push => mxm(
                Some(Mask::complement(&paths)),
                Semiring::PLUS_FIRST,
                &frontier,
                a,
                Descriptor::new(),
            ),
        }
        .during("frontier expansion")?;

        last_frontier_size = frontier_size;
        last_was_pull = direction.is_pull();
        frontier_size = frontier.nvals();

        debug!(
            depth,
            %direction,
            density = frontier_density,
            growing,
            next = frontier_size,
            "forward step"
        );
        steps.push(StepStats {
            depth,
            direction,
            nvals: frontier_size,
        });
        depth += 1;
    }

    Ok(ForwardSweep {
        paths,
        levels: Levels { patterns: levels },
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DirectionPolicy;
    use crate::graph::{Graph, GraphKind};

    fn sweep(g: &Graph, sources: &[usize], direction: DirectionPolicy) -> ForwardSweep {
        let config = BetweennessConfig {
            direction,
            ..BetweennessConfig::default()
        };
        let at = g.transpose_pattern().expect("transpose");
        forward_sweep(g.adjacency_pattern(), at, sources, &config).expect("sweep")
    }

    /// 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3, 3 -> 4
    fn diamond_tail() -> Graph {
        let mut g = Graph::from_edges(
            5,
            [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)],
            GraphKind::Directed,
        )
        .expect("build");
        g.cache_transpose().expect("transpose");
        g
    }

    #[test]
    fn counts_shortest_paths_and_levels() {
        let g = diamond_tail();
        let fw = sweep(&g, &[0], DirectionPolicy::Adaptive);

        let counts: Vec<_> = fw.paths.row(0).collect();
        assert_eq!(
            counts,
            vec![(0, 1.0), (1, 1.0), (2, 1.0), (3, 2.0), (4, 2.0)]
        );
        assert_eq!(fw.levels.depth(), 3);
        assert_eq!(fw.levels[0].row(0).map(|(j, _)| j).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(fw.levels[1].row(0).map(|(j, _)| j).collect::<Vec<_>>(), vec![3]);
        assert_eq!(fw.levels[2].row(0).map(|(j, _)| j).collect::<Vec<_>>(), vec![4]);
        assert_eq!(fw.steps.len(), 3);
        assert_eq!(fw.steps.last().map(|s| s.nvals), Some(0));
    }

    #[test]
    fn levels_are_disjoint_per_source() {
        let g = diamond_tail();
        let fw = sweep(&g, &[0, 1, 4], DirectionPolicy::Adaptive);
        for row in 0..3 {
            let mut seen = std::collections::HashSet::new();
            for level in fw.levels.iter() {
                for (v, _) in level.row(row) {
                    assert!(seen.insert(v), "vertex {v} in two levels of row {row}");
                }
            }
        }
        // Vertex 4 reaches nothing.
        assert_eq!(fw.paths.row(2).collect::<Vec<_>>(), vec![(4, 1.0)]);
    }

    #[test]
    fn direction_policy_does_not_change_counts() {
        let g = diamond_tail();
        let push = sweep(&g, &[0, 2], DirectionPolicy::PushOnly);
        let pull = sweep(&g, &[0, 2], DirectionPolicy::PullOnly);
        assert_eq!(
            push.paths.entries().collect::<Vec<_>>(),
            pull.paths.entries().collect::<Vec<_>>()
        );
        assert!(push.steps.iter().all(|s| s.direction == Direction::Push));
        assert!(pull.steps.iter().all(|s| s.direction == Direction::Pull));
    }

    #[test]
    fn isolated_source_records_no_levels() {
        let g = Graph::from_edges(3, [(1, 2)], GraphKind::Undirected).expect("build");
        let fw = sweep(&g, &[0], DirectionPolicy::Adaptive);
        assert!(fw.levels.is_empty());
        assert!(fw.steps.is_empty());
        assert_eq!(fw.paths.nvals(), 1);
    }
}
