//! Masks, descriptors and pattern-level operations.

use fixedbitset::FixedBitSet;

use crate::alloc::{try_copy, try_filled};
use crate::error::AlgebraError;
use crate::matrix::{Matrix, Representation};
use crate::scalar::Scalar;

// ---------------------------------------------------------------------------
// Mask
// ---------------------------------------------------------------------------

/// The matrix a [`Mask`] reads its structure from.
#[derive(Debug, Clone, Copy)]
pub enum MaskSource<'a> {
    Values(&'a Matrix<f64>),
    Pattern(&'a Matrix<bool>),
}

impl<'a> From<&'a Matrix<f64>> for MaskSource<'a> {
    fn from(m: &'a Matrix<f64>) -> Self {
        Self::Values(m)
    }
}

impl<'a> From<&'a Matrix<bool>> for MaskSource<'a> {
    fn from(m: &'a Matrix<bool>) -> Self {
        Self::Pattern(m)
    }
}

impl MaskSource<'_> {
    fn shape(&self) -> (usize, usize) {
        match self {
            Self::Values(m) => (m.nrows(), m.ncols()),
            Self::Pattern(m) => (m.nrows(), m.ncols()),
        }
    }

    fn for_each_col(&self, row: usize, mut f: impl FnMut(usize)) {
        match self {
            Self::Values(m) => m.row(row).for_each(|(j, _)| f(j)),
            Self::Pattern(m) => m.row(row).for_each(|(j, _)| f(j)),
        }
    }
}

/// A structural write mask: only the presence of entries matters, never
/// their values.
///
/// A plain mask admits positions present in the source; a complemented one
/// admits positions absent from it.
#[derive(Debug, Clone, Copy)]
pub struct Mask<'a> {
    source: MaskSource<'a>,
    complement: bool,
}

impl<'a> Mask<'a> {
    pub fn structural(source: impl Into<MaskSource<'a>>) -> Self {
        Self {
            source: source.into(),
            complement: false,
        }
    }

    pub fn complement(source: impl Into<MaskSource<'a>>) -> Self {
        Self {
            source: source.into(),
            complement: true,
        }
    }

    #[must_use]
    pub const fn is_complemented(&self) -> bool {
        self.complement
    }

    pub(crate) fn check_shape(
        &self,
        op: &'static str,
        nrows: usize,
        ncols: usize,
    ) -> Result<(), AlgebraError> {
        let (mr, mc) = self.source.shape();
        if (mr, mc) == (nrows, ncols) {
            Ok(())
        } else {
            Err(AlgebraError::mismatch(
                op,
                format!("mask is {mr}x{mc}, result is {nrows}x{ncols}"),
            ))
        }
    }

    /// Load the structure of `row` into `bits` (cleared first).
    pub(crate) fn load_row(&self, row: usize, bits: &mut FixedBitSet) {
        bits.clear();
        self.source.for_each_col(row, |j| bits.insert(j));
    }

    /// Columns of `row` present in the source, ascending.
    pub(crate) fn source_cols(&self, row: usize, out: &mut Vec<usize>) {
        out.clear();
        self.source.for_each_col(row, |j| out.push(j));
    }

    /// Whether column `j` is writable given the row loaded into `bits`.
    #[inline]
    pub(crate) fn allows(&self, bits: &FixedBitSet, j: usize) -> bool {
        bits.contains(j) != self.complement
    }
}

pub(crate) fn check_mask(
    mask: Option<&Mask<'_>>,
    op: &'static str,
    nrows: usize,
    ncols: usize,
) -> Result<(), AlgebraError> {
    mask.map_or(Ok(()), |m| m.check_shape(op, nrows, ncols))
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Per-call modifiers for bulk operations.
///
/// `transpose_second` reads the second operand transposed. For [`mxm`]
/// this also selects the dot-product kernel, so it doubles as the pull
/// direction switch. `output` picks the layout of the result.
///
/// [`mxm`]: crate::mxm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Descriptor {
    pub transpose_second: bool,
    pub output: Representation,
}

impl Descriptor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            transpose_second: false,
            output: Representation::Sparse,
        }
    }

    #[must_use]
    pub const fn with_transposed_second(mut self) -> Self {
        self.transpose_second = true;
        self
    }

    #[must_use]
    pub const fn with_output(mut self, output: Representation) -> Self {
        self.output = output;
        self
    }
}

// ---------------------------------------------------------------------------
// Pattern operations
// ---------------------------------------------------------------------------

/// The structural footprint of `a`: `true` wherever `a` has an entry.
///
/// # Errors
///
/// [`AlgebraError::OutOfMemory`] if the result cannot be reserved.
pub fn pattern_of<T: Scalar>(a: &Matrix<T>) -> Result<Matrix<bool>, AlgebraError> {
    a.map(|_| true)
}

/// `a'` in sparse layout.
///
/// # Errors
///
/// [`AlgebraError::OutOfMemory`] if the result cannot be reserved.
pub fn transpose<T: Scalar>(a: &Matrix<T>) -> Result<Matrix<T>, AlgebraError> {
    let (nrows, ncols) = (a.nrows(), a.ncols());
    let nnz = a.nvals();

    let mut row_ptr = try_filled(ncols + 1, 0usize)?;
    for (_, j, _) in a.entries() {
        row_ptr[j + 1] += 1;
    }
    for j in 0..ncols {
        row_ptr[j + 1] += row_ptr[j];
    }

    let mut next = try_copy(&row_ptr)?;
    let mut col_idx = try_filled(nnz, 0usize)?;
    let mut values = try_filled(nnz, T::default())?;
    // Row-major input keeps the new column indices ascending per row.
    for (i, j, v) in a.entries() {
        let k = next[j];
        col_idx[k] = i;
        values[k] = v;
        next[j] += 1;
    }

    Ok(Matrix::from_csr(ncols, nrows, row_ptr, col_idx, values))
}

/// Whether `a` is square and its pattern equals the pattern of `a'`.
///
/// # Errors
///
/// [`AlgebraError::OutOfMemory`] if the transpose cannot be built.
pub fn is_pattern_symmetric<T: Scalar>(a: &Matrix<T>) -> Result<bool, AlgebraError> {
    if a.nrows() != a.ncols() {
        return Ok(false);
    }
    let at = transpose(a)?;
    Ok((0..a.nrows()).all(|i| {
        a.row(i)
            .map(|(j, _)| j)
            .eq(at.row(i).map(|(j, _)| j))
    }))
}
