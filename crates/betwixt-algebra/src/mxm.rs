//! Masked matrix multiply.
//!
//! # Kernels
//!
//! - **Push** (`transpose_second = false`): row-wise saxpy. For each row `i`
//!   of `a`, scatter `a(i, k) * b(k, :)` into a dense accumulator. Cost is
//!   driven by the entries of `a`, so it suits sparse left operands.
//! - **Pull** (`transpose_second = true`): `b` is stored transposed, i.e.
//!   row `j` of `b` holds column `j` of the effective operand. For each row
//!   `i`, every admissible output column `j` gathers the dot product of
//!   `a(i, :)` with `b(j, :)`. Cost is driven by the candidate outputs, so it
//!   suits dense left operands and tight masks.
//!
//! Both kernels fold contributions for one output entry in ascending order
//! of the shared index, starting from the first product. Given the same
//! operands they therefore agree bit for bit; the choice is purely about
//! cost.

use fixedbitset::FixedBitSet;
use tracing::trace;

use crate::alloc::{try_bitset, try_filled, try_with_capacity};
use crate::error::AlgebraError;
use crate::matrix::{Matrix, RowBuf, par_rows};
use crate::operator::Semiring;
use crate::scalar::Scalar;
use crate::structure::{Descriptor, Mask, check_mask};

/// `C<mask> = A * op(B)` with replace semantics: the result holds exactly the
/// computed entries that the mask admits.
///
/// `op(B)` is `B` normally and `B'` when `desc.transpose_second` is set.
///
/// # Errors
///
/// [`AlgebraError::DimensionMismatch`] when the operands or mask do not
/// conform, [`AlgebraError::OutOfMemory`] when the result cannot be stored.
pub fn mxm<A: Scalar, B: Scalar>(
    mask: Option<Mask<'_>>,
    semiring: Semiring,
    a: &Matrix<A>,
    b: &Matrix<B>,
    desc: Descriptor,
) -> Result<Matrix<f64>, AlgebraError> {
    let (inner, ncols) = if desc.transpose_second {
        (b.ncols(), b.nrows())
    } else {
        (b.nrows(), b.ncols())
    };
    if a.ncols() != inner {
        return Err(AlgebraError::mismatch(
            "mxm",
            format!(
                "a is {}x{}, op(b) is {}x{}",
                a.nrows(),
                a.ncols(),
                inner,
                ncols
            ),
        ));
    }
    let nrows = a.nrows();
    check_mask(mask.as_ref(), "mxm", nrows, ncols)?;

    trace!(
        nrows,
        ncols,
        a_nvals = a.nvals(),
        b_nvals = b.nvals(),
        pull = desc.transpose_second,
        "mxm"
    );

    let rows = if desc.transpose_second {
        par_rows(
            nrows,
            || PullScratch::new(inner, ncols),
            |scratch, i| pull_row(scratch, mask.as_ref(), semiring, a, b, i),
        )?
    } else {
        par_rows(
            nrows,
            || PushScratch::new(ncols),
            |scratch, i| push_row(scratch, mask.as_ref(), semiring, a, b, i),
        )?
    };

    Matrix::from_rows(nrows, ncols, rows, desc.output)
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

struct PushScratch {
    acc: Vec<f64>,
    seen: FixedBitSet,
    touched: Vec<usize>,
    mask: FixedBitSet,
}

impl PushScratch {
    fn new(ncols: usize) -> Result<Self, AlgebraError> {
        Ok(Self {
            acc: try_filled(ncols, 0.0)?,
            seen: try_bitset(ncols)?,
            // At most one entry per output column.
            touched: try_with_capacity(ncols)?,
            mask: try_bitset(ncols)?,
        })
    }
}

fn push_row<A: Scalar, B: Scalar>(
    s: &mut PushScratch,
    mask: Option<&Mask<'_>>,
    semiring: Semiring,
    a: &Matrix<A>,
    b: &Matrix<B>,
    i: usize,
) -> Result<RowBuf<f64>, AlgebraError> {
    if let Some(m) = mask {
        m.load_row(i, &mut s.mask);
    }
    s.touched.clear();

    for (k, a_ik) in a.row(i) {
        let x = a_ik.to_f64();
        for (j, b_kj) in b.row(k) {
            if mask.is_some_and(|m| !m.allows(&s.mask, j)) {
                continue;
            }
            let t = semiring.multiply.apply(x, b_kj.to_f64());
            if s.seen.put(j) {
                s.acc[j] = semiring.add.combine(s.acc[j], t);
            } else {
                s.acc[j] = t;
                s.touched.push(j);
            }
        }
    }

    s.touched.sort_unstable();
    let mut out = RowBuf::with_capacity(s.touched.len())?;
    for &j in &s.touched {
        out.push(j, s.acc[j])?;
        s.seen.set(j, false);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Pull
// ---------------------------------------------------------------------------

struct PullScratch {
    a_val: Vec<f64>,
    a_seen: FixedBitSet,
    a_cols: Vec<usize>,
    mask: FixedBitSet,
    candidates: Vec<usize>,
    ncols: usize,
}

impl PullScratch {
    fn new(inner: usize, ncols: usize) -> Result<Self, AlgebraError> {
        Ok(Self {
            a_val: try_filled(inner, 0.0)?,
            a_seen: try_bitset(inner)?,
            a_cols: try_with_capacity(inner)?,
            mask: try_bitset(ncols)?,
            candidates: try_with_capacity(ncols)?,
            ncols,
        })
    }
}

fn pull_row<A: Scalar, B: Scalar>(
    s: &mut PullScratch,
    mask: Option<&Mask<'_>>,
    semiring: Semiring,
    a: &Matrix<A>,
    bt: &Matrix<B>,
    i: usize,
) -> Result<RowBuf<f64>, AlgebraError> {
    // Scatter a(i, :) so each dot product can probe it in O(1).
    s.a_cols.clear();
    for (k, v) in a.row(i) {
        s.a_val[k] = v.to_f64();
        s.a_seen.insert(k);
        s.a_cols.push(k);
    }

    let mut out = RowBuf::default();
    if !s.a_cols.is_empty() {
        // A plain mask enumerates its own columns; otherwise every column is a
        // candidate and the (complemented) mask filters.
        match mask {
            Some(m) if !m.is_complemented() => m.source_cols(i, &mut s.candidates),
            Some(m) => {
                m.load_row(i, &mut s.mask);
                s.candidates.clear();
                s.candidates
                    .extend((0..s.ncols).filter(|&j| m.allows(&s.mask, j)));
            }
            None => {
                s.candidates.clear();
                s.candidates.extend(0..s.ncols);
            }
        }

        for &j in &s.candidates {
            let mut acc: Option<f64> = None;
            for (k, b_jk) in bt.row(j) {
                if !s.a_seen.contains(k) {
                    continue;
                }
                let t = semiring.multiply.apply(s.a_val[k], b_jk.to_f64());
                acc = Some(acc.map_or(t, |prev| semiring.add.combine(prev, t)));
            }
            if let Some(v) = acc {
                out.push(j, v)?;
            }
        }
    }

    for &k in &s.a_cols {
        s.a_seen.set(k, false);
    }
    Ok(out)
}
