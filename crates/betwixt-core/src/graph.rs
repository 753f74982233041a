//! Graph handle consumed by the centrality engine.
//!
//! A [`Graph`] owns an `n x n` boolean adjacency pattern (`A(i, j)` present
//! iff there is an edge `i -> j`) plus lazily computed properties: the
//! transpose pattern and whether the pattern is symmetric. The engine only
//! reads the handle; computing properties is the caller's job so that a
//! single cached transpose serves many centrality calls.

use betwixt_algebra::{Matrix, is_pattern_symmetric, transpose};
use petgraph::EdgeType;
use petgraph::graph::IndexType;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BetweennessError, EngineContext};

/// How edges are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    /// `A(i, j)` is the edge `i -> j`; reversing it needs the transpose.
    Directed,
    /// Every stored edge is stored in both orientations, so `A' == A`.
    Undirected,
}

impl std::fmt::Display for GraphKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directed => write!(f, "directed"),
            Self::Undirected => write!(f, "undirected"),
        }
    }
}

/// Adjacency pattern plus cached structural properties.
#[derive(Debug, Clone)]
pub struct Graph {
    kind: GraphKind,
    adjacency: Matrix<bool>,
    transpose: Option<Matrix<bool>>,
    symmetric: Option<bool>,
}

impl Graph {
    /// Wrap an adjacency pattern.
    ///
    /// An undirected graph answers transpose requests with its own
    /// adjacency, so its pattern is checked for symmetry here.
    ///
    /// # Errors
    ///
    /// [`BetweennessError::InvalidGraph`] if the matrix is not square, or is
    /// declared undirected without a symmetric pattern.
    /// [`BetweennessError::OutOfMemory`] if the symmetry check cannot reserve
    /// its transpose.
    pub fn new(adjacency: Matrix<bool>, kind: GraphKind) -> Result<Self, BetweennessError> {
        if adjacency.nrows() != adjacency.ncols() {
            return Err(BetweennessError::InvalidGraph(format!(
                "adjacency matrix must be square, got {}x{}",
                adjacency.nrows(),
                adjacency.ncols()
            )));
        }
        let symmetric = match kind {
            GraphKind::Directed => None,
            GraphKind::Undirected => {
                if !is_pattern_symmetric(&adjacency).during("check symmetry")? {
                    return Err(BetweennessError::InvalidGraph(
                        "undirected graph needs a symmetric adjacency pattern".into(),
                    ));
                }
                Some(true)
            }
        };
        Ok(Self::from_parts(adjacency, kind, symmetric))
    }

    const fn from_parts(adjacency: Matrix<bool>, kind: GraphKind, symmetric: Option<bool>) -> Self {
        Self {
            kind,
            adjacency,
            transpose: None,
            symmetric,
        }
    }

    /// Build a graph on vertices `0..n` from an edge list.
    ///
    /// Undirected graphs store each edge in both orientations. Repeated
    /// edges collapse to one.
    ///
    /// # Errors
    ///
    /// [`BetweennessError::InvalidGraph`] if an endpoint is `>= n`,
    /// [`BetweennessError::OutOfMemory`] if the pattern cannot be stored.
    pub fn from_edges(
        n: usize,
        edges: impl IntoIterator<Item = (usize, usize)>,
        kind: GraphKind,
    ) -> Result<Self, BetweennessError> {
        let mut cells = Vec::new();
        for (u, v) in edges {
            if u >= n || v >= n {
                return Err(BetweennessError::InvalidGraph(format!(
                    "edge ({u}, {v}) references a vertex outside 0..{n}"
                )));
            }
            cells.push((u, v, true));
            if kind == GraphKind::Undirected && u != v {
                cells.push((v, u, true));
            }
        }
        let adjacency = Matrix::from_triplets(n, n, cells).during("build adjacency")?;
        // Mirrored above, so an undirected pattern is symmetric already.
        let symmetric = (kind == GraphKind::Undirected).then_some(true);
        Ok(Self::from_parts(adjacency, kind, symmetric))
    }

    /// Convert a `petgraph` graph. Node indices become vertex ids and the
    /// graph's own directedness picks the [`GraphKind`].
    ///
    /// # Errors
    ///
    /// [`BetweennessError::OutOfMemory`] if the pattern cannot be stored.
    pub fn from_petgraph<N, E, Ty: EdgeType, Ix: IndexType>(
        graph: &petgraph::Graph<N, E, Ty, Ix>,
    ) -> Result<Self, BetweennessError> {
        let kind = if graph.is_directed() {
            GraphKind::Directed
        } else {
            GraphKind::Undirected
        };
        Self::from_edges(
            graph.node_count(),
            graph
                .edge_references()
                .map(|e| (e.source().index(), e.target().index())),
            kind,
        )
    }

    #[must_use]
    pub const fn kind(&self) -> GraphKind {
        self.kind
    }

    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.adjacency.nrows()
    }

    /// Stored adjacency entries. An undirected edge counts twice, a
    /// self-loop once.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.nvals()
    }

    #[must_use]
    pub const fn adjacency_pattern(&self) -> &Matrix<bool> {
        &self.adjacency
    }

    /// The pattern of `A'`, if it is available without further work.
    ///
    /// Undirected graphs and graphs whose cached symmetry flag is set answer
    /// with the adjacency itself; directed graphs need
    /// [`cache_transpose`](Self::cache_transpose) first.
    #[must_use]
    pub fn transpose_pattern(&self) -> Option<&Matrix<bool>> {
        if self.kind == GraphKind::Undirected || self.symmetric == Some(true) {
            Some(&self.adjacency)
        } else {
            self.transpose.as_ref()
        }
    }

    /// Cached symmetry flag, `None` until [`cache_symmetry`](Self::cache_symmetry) runs.
    #[must_use]
    pub const fn pattern_symmetric(&self) -> Option<bool> {
        self.symmetric
    }

    /// Compute and cache the transpose pattern. No-op when
    /// [`transpose_pattern`](Self::transpose_pattern) already has an answer.
    ///
    /// # Errors
    ///
    /// [`BetweennessError::OutOfMemory`] if the transpose cannot be stored.
    pub fn cache_transpose(&mut self) -> Result<(), BetweennessError> {
        if self.transpose_pattern().is_some() {
            return Ok(());
        }
        let at = transpose(&self.adjacency).during("cache transpose")?;
        debug!(n = self.vertex_count(), nvals = at.nvals(), "cached transpose");
        self.transpose = Some(at);
        Ok(())
    }

    /// Compute and cache whether the adjacency pattern equals its transpose.
    ///
    /// # Errors
    ///
    /// [`BetweennessError::OutOfMemory`] if the check needs workspace that
    /// cannot be reserved.
    pub fn cache_symmetry(&mut self) -> Result<bool, BetweennessError> {
        if let Some(flag) = self.symmetric {
            return Ok(flag);
        }
        let flag = match self.kind {
            GraphKind::Undirected => true,
            GraphKind::Directed => {
                is_pattern_symmetric(&self.adjacency).during("cache symmetry")?
            }
        };
        self.symmetric = Some(flag);
        Ok(flag)
    }
}
