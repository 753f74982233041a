/// Errors returned by matrix construction and bulk operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgebraError {
    /// A fallible reservation failed (or the requested size overflowed).
    #[error("out of memory: could not allocate {bytes} bytes")]
    OutOfMemory { bytes: usize },

    /// Operand shapes are incompatible for the requested operation.
    #[error("dimension mismatch in {op}: {detail}")]
    DimensionMismatch { op: &'static str, detail: String },

    /// An element index lies outside the matrix.
    #[error("index ({row}, {col}) out of bounds for a {nrows}x{ncols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },
}

impl AlgebraError {
    pub(crate) fn mismatch(op: &'static str, detail: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            op,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_operation() {
        let err = AlgebraError::mismatch("mxm", "a is 2x3, b is 4x4");
        assert_eq!(
            err.to_string(),
            "dimension mismatch in mxm: a is 2x3, b is 4x4"
        );
    }
}
