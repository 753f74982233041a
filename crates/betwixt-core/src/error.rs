use std::fmt;

use betwixt_algebra::AlgebraError;

/// Errors surfaced by a centrality computation.
///
/// Every failure aborts the call; no partial result is returned.
#[derive(Debug, thiserror::Error)]
pub enum BetweennessError {
    /// Malformed caller input: empty, out-of-range or duplicate sources, or
    /// an unusable configuration value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The graph cannot be used: non-square adjacency, or a directed graph
    /// whose transpose was never cached.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// An allocation for a call-scoped matrix failed.
    #[error("out of memory during {step}: {source}")]
    OutOfMemory {
        step: &'static str,
        #[source]
        source: AlgebraError,
    },

    /// A bulk algebra operation rejected its inputs.
    #[error("sparse engine failure during {step}: {source}")]
    EngineFailure {
        step: &'static str,
        #[source]
        source: AlgebraError,
    },
}

impl BetweennessError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::InvalidGraph(_) => ErrorCode::InvalidGraph,
            Self::OutOfMemory { .. } => ErrorCode::OutOfMemory,
            Self::EngineFailure { .. } => ErrorCode::EngineFailure,
        }
    }
}

/// Tag an algebra result with the step that produced it.
pub(crate) trait EngineContext<T> {
    fn during(self, step: &'static str) -> Result<T, BetweennessError>;
}

impl<T> EngineContext<T> for Result<T, AlgebraError> {
    fn during(self, step: &'static str) -> Result<T, BetweennessError> {
        self.map_err(|source| match source {
            AlgebraError::OutOfMemory { .. } => BetweennessError::OutOfMemory { step, source },
            _ => BetweennessError::EngineFailure { step, source },
        })
    }
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidArgument,
    InvalidGraph,
    OutOfMemory,
    EngineFailure,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidArgument => "E1001",
            Self::InvalidGraph => "E2001",
            Self::OutOfMemory => "E5001",
            Self::EngineFailure => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidArgument => "Invalid argument",
            Self::InvalidGraph => "Invalid graph",
            Self::OutOfMemory => "Out of memory",
            Self::EngineFailure => "Sparse engine failure",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument => {
                Some("Pass a non-empty list of distinct vertex ids below the vertex count.")
            }
            Self::InvalidGraph => {
                Some("Use a square adjacency matrix and cache the transpose of directed graphs.")
            }
            Self::OutOfMemory => Some("Use fewer sources per batch; memory grows with sources x vertices."),
            Self::EngineFailure => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
