pub mod centrality;
pub mod convert;
pub mod info;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use betwixt_core::io::{read_edge_list, read_matrix_market};
use betwixt_core::{Graph, GraphKind};
use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

/// On-disk graph formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    /// Matrix Market coordinate file (1-based).
    Mtx,
    /// Whitespace-separated `u v` pairs (0-based).
    Edges,
}

impl GraphFormat {
    /// `.mtx` files are Matrix Market, anything else an edge list.
    pub fn detect(path: &Path, explicit: Option<Self>) -> Self {
        explicit.unwrap_or_else(|| {
            let is_mtx = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("mtx"));
            if is_mtx { Self::Mtx } else { Self::Edges }
        })
    }
}

/// A graph read from disk plus how it was interpreted.
pub struct LoadedGraph {
    pub graph: Graph,
    pub format: GraphFormat,
}

/// Read `path` and build a graph ready for the engine (transpose cached for
/// directed, non-symmetric inputs).
///
/// Matrix Market files declared `symmetric` are undirected; `undirected`
/// forces every input to be read as undirected.
pub fn load_graph(path: &Path, format: Option<GraphFormat>, undirected: bool) -> Result<LoadedGraph> {
    let format = GraphFormat::detect(path, format);
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut graph = match format {
        GraphFormat::Mtx => {
            let mm = read_matrix_market(reader)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if undirected && !mm.symmetric {
                let n = mm.pattern.nrows();
                if mm.pattern.ncols() != n {
                    anyhow::bail!(
                        "{} is {}x{}; a graph needs a square matrix",
                        path.display(),
                        n,
                        mm.pattern.ncols()
                    );
                }
                let edges: Vec<(usize, usize)> =
                    mm.pattern.entries().map(|(i, j, _)| (i, j)).collect();
                Graph::from_edges(n, edges, GraphKind::Undirected)?
            } else {
                let kind = if mm.symmetric {
                    GraphKind::Undirected
                } else {
                    GraphKind::Directed
                };
                Graph::new(mm.pattern, kind)?
            }
        }
        GraphFormat::Edges => {
            let (n, edges) = read_edge_list(reader)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let kind = if undirected {
                GraphKind::Undirected
            } else {
                GraphKind::Directed
            };
            Graph::from_edges(n, edges, kind)?
        }
    };

    let symmetric = graph.cache_symmetry()?;
    graph.cache_transpose()?;
    debug!(
        path = %path.display(),
        vertices = graph.vertex_count(),
        entries = graph.edge_count(),
        symmetric,
        "loaded graph"
    );
    Ok(LoadedGraph { graph, format })
}
