#![forbid(unsafe_code)]

mod cmd;
mod config;
mod output;

use std::env;

use clap::{Parser, Subcommand};
use tracing::{debug, info_span};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "betwixt: batched betweenness centrality",
    long_about = None
)]
struct Cli {
    /// Enable debug logging for betwixt crates.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Compute betweenness centrality",
        long_about = "Compute betweenness centrality from a batch of sources. With every \
                      vertex as a source (the default) scores are exact; --sample gives an \
                      estimate. Every ordered (source, target) pair is counted.",
        after_help = "EXAMPLES:\n    # Exact scores for an undirected edge list\n    bwx centrality graph.txt --undirected\n\n    # Estimate from 64 random sources, top 10 vertices\n    bwx centrality web.mtx --sample 64 --seed 7 --top 10\n\n    # Force the pull kernel and emit JSON\n    bwx centrality web.mtx --direction pull --json"
    )]
    Centrality(cmd::centrality::CentralityArgs),

    #[command(
        about = "Describe a graph file",
        long_about = "Report vertex and entry counts, self-loops and pattern symmetry.",
        after_help = "EXAMPLES:\n    # Inspect a Matrix Market file\n    bwx info web.mtx\n\n    # Emit machine-readable output\n    bwx info web.mtx --json"
    )]
    Info(cmd::info::InfoArgs),

    #[command(
        about = "Convert a graph file to Matrix Market",
        long_about = "Read an edge list (or Matrix Market file) and write it as a \
                      `pattern general` Matrix Market file.",
        after_help = "EXAMPLES:\n    # Edge list to Matrix Market\n    bwx convert graph.txt graph.mtx\n\n    # Mirror every edge on the way\n    bwx convert graph.txt graph.mtx --undirected"
    )]
    Convert(cmd::convert::ConvertArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BETWIXT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "betwixt=debug,info"
        } else {
            "betwixt=info,warn"
        })
    });

    let format = env::var("BETWIXT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays parseable.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = env::current_dir()?;
    let config = config::load_config(&project_root)?;
    let output = output::resolve_output_mode(cli.json, config.output.as_deref());
    debug!(?output, "resolved output mode");

    match &cli.command {
        Commands::Centrality(args) => {
            let _span = info_span!("cmd.centrality").entered();
            cmd::centrality::run_centrality(args, &config, output)
        }
        Commands::Info(args) => {
            let _span = info_span!("cmd.info").entered();
            cmd::info::run_info(args, output)
        }
        Commands::Convert(args) => {
            let _span = info_span!("cmd.convert").entered();
            cmd::convert::run_convert(args, output)
        }
    }
}
