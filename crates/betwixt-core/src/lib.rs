#![forbid(unsafe_code)]
//! betwixt-core library: batched betweenness centrality.
//!
//! # Overview
//!
//! [`compute_betweenness_centrality`] runs a breadth-first search from every
//! source of a batch at once ([`frontier`]), then walks the recorded levels
//! back up to accumulate dependencies ([`accumulate`]). Each step picks a
//! push or pull multiply kernel from the current frontier density
//! ([`direction`]); the choice never changes the result.
//!
//! # Conventions
//!
//! - **Errors**: library functions return [`BetweennessError`] (or
//!   [`io::IoError`] for file handling); binaries wrap them in `anyhow`.
//! - **Logging**: `tracing` spans per sweep, `debug!` per step, `info!` per
//!   run.

pub mod accumulate;
pub mod betweenness;
pub mod config;
pub mod direction;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod io;
pub mod sources;

pub use betweenness::{Betweenness, CentralityReport, compute_betweenness_centrality};
pub use config::{BetweennessConfig, DirectionPolicy, Thresholds};
pub use direction::Direction;
pub use error::{BetweennessError, ErrorCode};
pub use frontier::{Levels, StepStats};
pub use graph::{Graph, GraphKind};
pub use sources::{all_sources, sample_sources, validate_sources};
