//! `bwx convert`: rewrite a graph file as Matrix Market.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use betwixt_core::io::write_matrix_market;
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::{GraphFormat, load_graph};
use crate::output::{OutputMode, pretty_kv, render_mode};

/// Arguments for `bwx convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input graph file.
    pub input: PathBuf,

    /// Output Matrix Market file.
    pub output: PathBuf,

    /// Input format (default: from the file extension).
    #[arg(long, value_enum)]
    pub format: Option<GraphFormat>,

    /// Store every edge in both orientations.
    #[arg(long)]
    pub undirected: bool,
}

#[derive(Debug, Serialize)]
pub struct ConvertOutput {
    pub input: String,
    pub output: String,
    pub vertices: usize,
    pub entries: usize,
}

/// Execute `bwx convert`.
pub fn run_convert(args: &ConvertArgs, output: OutputMode) -> Result<()> {
    let loaded = load_graph(&args.input, args.format, args.undirected)?;
    let pattern = loaded.graph.adjacency_pattern();

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    write_matrix_market(BufWriter::new(file), pattern)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), entries = pattern.nvals(), "wrote Matrix Market");

    let payload = ConvertOutput {
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        vertices: pattern.nrows(),
        entries: pattern.nvals(),
    };
    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(out: &ConvertOutput, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}\t{}\t{}", out.output, out.vertices, out.entries)
}

fn render_pretty(out: &ConvertOutput, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "Converted {} -> {}", out.input, out.output)?;
    pretty_kv(w, "vertices", out.vertices.to_string())?;
    pretty_kv(w, "entries", out.entries.to_string())
}
