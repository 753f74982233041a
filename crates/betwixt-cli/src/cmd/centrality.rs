//! `bwx centrality`: betweenness scores for a graph file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use betwixt_core::{
    Betweenness, BetweennessConfig, CentralityReport, DirectionPolicy, StepStats, all_sources,
    sample_sources,
};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use super::{GraphFormat, load_graph};
use crate::config::CliConfig;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_error, render_mode};

// ---------------------------------------------------------------------------
// Clap types
// ---------------------------------------------------------------------------

/// Kernel selection exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Adaptive,
    Push,
    Pull,
}

impl From<DirectionArg> for DirectionPolicy {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Adaptive => Self::Adaptive,
            DirectionArg::Push => Self::PushOnly,
            DirectionArg::Pull => Self::PullOnly,
        }
    }
}

/// Arguments for `bwx centrality`.
#[derive(Args, Debug)]
pub struct CentralityArgs {
    /// Graph file: Matrix Market (`.mtx`) or an edge list.
    pub file: PathBuf,

    /// Input format (default: from the file extension).
    #[arg(long, value_enum)]
    pub format: Option<GraphFormat>,

    /// Treat every edge as undirected.
    #[arg(long)]
    pub undirected: bool,

    /// Comma-separated source vertices (0-based).
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["sample", "all"])]
    pub sources: Option<Vec<usize>>,

    /// Estimate from K sources chosen uniformly at random.
    #[arg(long, value_name = "K", conflicts_with = "all")]
    pub sample: Option<usize>,

    /// Seed for --sample (default: `seed` from config).
    #[arg(long, requires = "sample")]
    pub seed: Option<u64>,

    /// Use every vertex as a source (exact scores; the default).
    #[arg(long)]
    pub all: bool,

    /// Push/pull kernel policy.
    #[arg(long, value_enum)]
    pub direction: Option<DirectionArg>,

    /// Worker threads for the bulk kernels.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Only print the K highest-scoring vertices.
    #[arg(long, value_name = "K")]
    pub top: Option<usize>,
}

impl CentralityArgs {
    /// Flags on top of the loaded config.
    fn engine_config(&self, base: &BetweennessConfig) -> BetweennessConfig {
        let mut config = base.clone();
        if let Some(direction) = self.direction {
            config.direction = direction.into();
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        config
    }

    fn pick_sources(&self, n: usize, default_seed: u64) -> Vec<usize> {
        if self.all {
            return all_sources(n);
        }
        if let Some(sources) = &self.sources {
            return sources.clone();
        }
        if let Some(k) = self.sample {
            return sample_sources(n, k, self.seed.unwrap_or(default_seed));
        }
        all_sources(n)
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct VertexScore {
    pub vertex: usize,
    pub score: f64,
}

/// Report payload for `bwx centrality`.
#[derive(Debug, Serialize)]
pub struct CentralityOutput {
    pub file: String,
    pub vertices: usize,
    pub sources: usize,
    pub exact: bool,
    pub depth: usize,
    pub elapsed_ms: u128,
    pub forward: Vec<StepStats>,
    pub backward: Vec<StepStats>,
    pub scores: Vec<VertexScore>,
}

impl CentralityOutput {
    fn from_report(file: &Path, report: CentralityReport, top: Option<usize>) -> Self {
        let vertices = report.scores.len();
        let mut scores: Vec<VertexScore> = report
            .scores
            .into_iter()
            .enumerate()
            .map(|(vertex, score)| VertexScore { vertex, score })
            .collect();
        if let Some(k) = top {
            scores.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.vertex.cmp(&b.vertex)));
            scores.truncate(k);
        }
        Self {
            file: file.display().to_string(),
            vertices,
            sources: report.sources,
            exact: report.sources == vertices,
            depth: report.depth,
            elapsed_ms: report.elapsed_ms,
            forward: report.forward,
            backward: report.backward,
            scores,
        }
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Execute `bwx centrality`.
pub fn run_centrality(args: &CentralityArgs, config: &CliConfig, output: OutputMode) -> Result<()> {
    let loaded = load_graph(&args.file, args.format, args.undirected)?;
    let graph = &loaded.graph;
    let sources = args.pick_sources(graph.vertex_count(), config.seed);
    let engine = Betweenness::new(args.engine_config(&config.engine));

    info!(
        file = %args.file.display(),
        vertices = graph.vertex_count(),
        sources = sources.len(),
        direction = %engine.config().direction,
        "running betweenness"
    );

    let report = match engine.run(graph, &sources) {
        Ok(report) => report,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err).context("betweenness computation failed");
        }
    };

    let payload = CentralityOutput::from_report(&args.file, report, args.top);
    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(out: &CentralityOutput, w: &mut dyn Write) -> io::Result<()> {
    for s in &out.scores {
        writeln!(w, "{}\t{}", s.vertex, s.score)?;
    }
    Ok(())
}

fn directions(steps: &[StepStats]) -> String {
    if steps.is_empty() {
        return "-".to_string();
    }
    steps
        .iter()
        .map(|s| s.direction.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_pretty(out: &CentralityOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Betweenness centrality")?;
    pretty_kv(w, "file", &out.file)?;
    pretty_kv(w, "vertices", out.vertices.to_string())?;
    let mode = if out.exact { "exact" } else { "sampled" };
    pretty_kv(w, "sources", format!("{} ({mode})", out.sources))?;
    pretty_kv(w, "depth", out.depth.to_string())?;
    pretty_kv(w, "forward", directions(&out.forward))?;
    pretty_kv(w, "backward", directions(&out.backward))?;
    pretty_kv(w, "elapsed", format!("{} ms", out.elapsed_ms))?;
    writeln!(w)?;
    writeln!(w, "{:>10}  {:>16}", "vertex", "score")?;
    pretty_rule(w)?;
    for s in &out.scores {
        writeln!(w, "{:>10}  {:>16.6}", s.vertex, s.score)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(scores: Vec<f64>) -> CentralityReport {
        CentralityReport {
            sources: scores.len(),
            scores,
            depth: 2,
            forward: Vec::new(),
            backward: Vec::new(),
            elapsed_ms: 0,
        }
    }

    #[test]
    fn top_sorts_by_score_then_vertex() {
        let out = CentralityOutput::from_report(
            Path::new("g.mtx"),
            report(vec![1.0, 4.0, 1.0, 0.0]),
            Some(3),
        );
        let order: Vec<usize> = out.scores.iter().map(|s| s.vertex).collect();
        assert_eq!(order, vec![1, 0, 2]);
        assert!(out.exact);
        assert_eq!(out.vertices, 4);
    }

    #[test]
    fn without_top_keeps_vertex_order() {
        let out = CentralityOutput::from_report(Path::new("g"), report(vec![0.0, 2.0]), None);
        let order: Vec<usize> = out.scores.iter().map(|s| s.vertex).collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn flags_override_config() {
        let args = CentralityArgs {
            file: PathBuf::from("g"),
            format: None,
            undirected: false,
            sources: None,
            sample: Some(2),
            seed: None,
            all: false,
            direction: Some(DirectionArg::Pull),
            threads: Some(3),
            top: None,
        };
        let base = BetweennessConfig {
            direction: DirectionPolicy::PushOnly,
            ..BetweennessConfig::default()
        };
        let config = args.engine_config(&base);
        assert_eq!(config.direction, DirectionPolicy::PullOnly);
        assert_eq!(config.threads, Some(3));
        assert_eq!(args.pick_sources(10, 5), sample_sources(10, 2, 5));
    }

    #[test]
    fn all_flag_selects_every_vertex() {
        let args = CentralityArgs {
            file: PathBuf::from("g"),
            format: None,
            undirected: false,
            sources: None,
            sample: None,
            seed: None,
            all: true,
            direction: None,
            threads: None,
            top: None,
        };
        assert_eq!(args.pick_sources(4, 7), vec![0, 1, 2, 3]);
    }
}
