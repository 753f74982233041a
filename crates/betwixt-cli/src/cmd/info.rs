//! `bwx info`: shape and structure of a graph file.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use betwixt_core::GraphKind;
use clap::Args;
use serde::Serialize;

use super::{GraphFormat, load_graph};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bwx info`.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Graph file: Matrix Market (`.mtx`) or an edge list.
    pub file: PathBuf,

    /// Input format (default: from the file extension).
    #[arg(long, value_enum)]
    pub format: Option<GraphFormat>,

    /// Treat every edge as undirected.
    #[arg(long)]
    pub undirected: bool,
}

/// Report payload for `bwx info`.
#[derive(Debug, Serialize)]
pub struct GraphInfo {
    pub file: String,
    pub format: GraphFormat,
    pub kind: GraphKind,
    pub vertices: usize,
    /// Stored adjacency entries (undirected edges count twice).
    pub entries: usize,
    pub self_loops: usize,
    pub symmetric: bool,
    pub max_out_degree: usize,
}

/// Execute `bwx info`.
pub fn run_info(args: &InfoArgs, output: OutputMode) -> Result<()> {
    let loaded = load_graph(&args.file, args.format, args.undirected)?;
    let graph = &loaded.graph;
    let a = graph.adjacency_pattern();

    let self_loops = a.entries().filter(|&(i, j, _)| i == j).count();
    let max_out_degree = (0..a.nrows()).map(|i| a.row(i).count()).max().unwrap_or(0);

    let payload = GraphInfo {
        file: args.file.display().to_string(),
        format: loaded.format,
        kind: graph.kind(),
        vertices: graph.vertex_count(),
        entries: graph.edge_count(),
        self_loops,
        symmetric: graph.pattern_symmetric().unwrap_or(false),
        max_out_degree,
    };
    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(info: &GraphInfo, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "vertices\t{}", info.vertices)?;
    writeln!(w, "entries\t{}", info.entries)?;
    writeln!(w, "self_loops\t{}", info.self_loops)?;
    writeln!(w, "symmetric\t{}", info.symmetric)?;
    writeln!(w, "max_out_degree\t{}", info.max_out_degree)
}

fn render_pretty(info: &GraphInfo, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Graph")?;
    pretty_kv(w, "file", &info.file)?;
    pretty_kv(w, "kind", info.kind.to_string())?;
    pretty_kv(w, "vertices", info.vertices.to_string())?;
    pretty_kv(w, "entries", info.entries.to_string())?;
    pretty_kv(w, "self loops", info.self_loops.to_string())?;
    pretty_kv(w, "symmetric", if info.symmetric { "yes" } else { "no" })?;
    pretty_kv(w, "max degree", info.max_out_degree.to_string())
}
