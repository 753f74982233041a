//! Entry points: validate, run the two sweeps, report.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument};

use crate::accumulate::backward_sweep;
use crate::config::BetweennessConfig;
use crate::error::BetweennessError;
use crate::frontier::{StepStats, forward_sweep};
use crate::graph::Graph;
use crate::sources::validate_sources;

/// Scores plus per-step statistics of one run.
#[derive(Debug, Clone, Serialize)]
pub struct CentralityReport {
    /// `scores[v]`: shortest-path pairs (source in the batch, any target)
    /// that pass through `v` as an interior vertex, weighted by the
    /// fraction of shortest paths that do.
    pub scores: Vec<f64>,
    pub sources: usize,
    /// Largest finite distance reached from any source.
    pub depth: usize,
    pub forward: Vec<StepStats>,
    pub backward: Vec<StepStats>,
    pub elapsed_ms: u128,
}

/// Configured betweenness runner.
#[derive(Debug, Clone, Default)]
pub struct Betweenness {
    config: BetweennessConfig,
}

impl Betweenness {
    #[must_use]
    pub const fn new(config: BetweennessConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &BetweennessConfig {
        &self.config
    }

    /// Compute the centrality contributed by `sources`.
    ///
    /// Passing every vertex yields exact betweenness; a sample yields an
    /// estimate. Each ordered `(source, target)` pair is counted, so on an
    /// undirected graph the exact scores are twice the unordered-pair
    /// convention.
    ///
    /// # Errors
    ///
    /// - [`BetweennessError::InvalidArgument`]: bad sources or config, or a
    ///   thread pool that cannot be built.
    /// - [`BetweennessError::InvalidGraph`]: non-square adjacency, or a
    ///   directed graph without a cached transpose.
    /// - [`BetweennessError::OutOfMemory`] / [`BetweennessError::EngineFailure`]
    ///   from the algebra engine.
    #[instrument(skip_all, fields(n = graph.vertex_count(), ns = sources.len()))]
    pub fn run(&self, graph: &Graph, sources: &[usize]) -> Result<CentralityReport, BetweennessError> {
        self.config.validate()?;

        let a = graph.adjacency_pattern();
        if a.nrows() != a.ncols() {
            return Err(BetweennessError::InvalidGraph(format!(
                "adjacency matrix must be square, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        validate_sources(sources, a.nrows())?;

        match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| {
                        BetweennessError::InvalidArgument(format!(
                            "cannot start {threads} worker threads: {e}"
                        ))
                    })?;
                pool.install(|| self.execute(graph, sources))
            }
            None => self.execute(graph, sources),
        }
    }

    fn execute(&self, graph: &Graph, sources: &[usize]) -> Result<CentralityReport, BetweennessError> {
        let a = graph.adjacency_pattern();
        let at = graph.transpose_pattern().ok_or_else(|| {
            BetweennessError::InvalidGraph(
                "directed graph has no cached transpose; call Graph::cache_transpose first".into(),
            )
        })?;

        let started = Instant::now();
        let forward = forward_sweep(a, at, sources, &self.config)?;
        let depth = forward.levels.depth();
        let backward = backward_sweep(a, at, &forward.paths, forward.levels, &self.config)?;
        let elapsed_ms = started.elapsed().as_millis();

        info!(
            depth,
            forward_steps = forward.steps.len(),
            backward_steps = backward.steps.len(),
            elapsed_ms,
            "betweenness computed"
        );

        Ok(CentralityReport {
            scores: backward.centrality,
            sources: sources.len(),
            depth,
            forward: forward.steps,
            backward: backward.steps,
            elapsed_ms,
        })
    }
}

/// Betweenness centrality contributed by `sources`, with default settings.
///
/// # Errors
///
/// See [`Betweenness::run`].
pub fn compute_betweenness_centrality(
    sources: &[usize],
    graph: &Graph,
) -> Result<Vec<f64>, BetweennessError> {
    Betweenness::default()
        .run(graph, sources)
        .map(|report| report.scores)
}
