//! Element-wise combination of same-shaped matrices.

use fixedbitset::FixedBitSet;

use crate::alloc::{try_bitset, try_filled, try_with_capacity};
use crate::error::AlgebraError;
use crate::matrix::{Matrix, RowBuf, par_rows};
use crate::operator::BinaryOp;
use crate::scalar::Scalar;
use crate::structure::{Descriptor, Mask, check_mask};

fn check_same_shape<A: Scalar, B: Scalar>(
    op: &'static str,
    a: &Matrix<A>,
    b: &Matrix<B>,
) -> Result<(), AlgebraError> {
    if (a.nrows(), a.ncols()) == (b.nrows(), b.ncols()) {
        Ok(())
    } else {
        Err(AlgebraError::mismatch(
            op,
            format!(
                "{}x{} vs {}x{}",
                a.nrows(),
                a.ncols(),
                b.nrows(),
                b.ncols()
            ),
        ))
    }
}

struct Scratch {
    b_val: Vec<f64>,
    b_seen: FixedBitSet,
    b_cols: Vec<usize>,
    mask: FixedBitSet,
    candidates: Vec<usize>,
}

impl Scratch {
    fn new(ncols: usize) -> Result<Self, AlgebraError> {
        Ok(Self {
            b_val: try_filled(ncols, 0.0)?,
            b_seen: try_bitset(ncols)?,
            b_cols: try_with_capacity(ncols)?,
            mask: try_bitset(ncols)?,
            candidates: try_with_capacity(ncols)?,
        })
    }
}

/// `C<mask> = A .op B` over the intersection of the two patterns, with
/// replace semantics.
///
/// # Errors
///
/// [`AlgebraError::DimensionMismatch`] when shapes differ,
/// [`AlgebraError::OutOfMemory`] when the result cannot be stored.
pub fn ewise_mult<A: Scalar, B: Scalar>(
    mask: Option<Mask<'_>>,
    op: BinaryOp,
    a: &Matrix<A>,
    b: &Matrix<B>,
    desc: Descriptor,
) -> Result<Matrix<f64>, AlgebraError> {
    check_same_shape("ewise_mult", a, b)?;
    let (nrows, ncols) = (a.nrows(), a.ncols());
    check_mask(mask.as_ref(), "ewise_mult", nrows, ncols)?;

    let rows = par_rows(
        nrows,
        || Scratch::new(ncols),
        |s, i| mult_row(s, mask.as_ref(), op, a, b, i),
    )?;

    Matrix::from_rows(nrows, ncols, rows, desc.output)
}

fn mult_row<A: Scalar, B: Scalar>(
    s: &mut Scratch,
    mask: Option<&Mask<'_>>,
    op: BinaryOp,
    a: &Matrix<A>,
    b: &Matrix<B>,
    i: usize,
) -> Result<RowBuf<f64>, AlgebraError> {
    let mut out = RowBuf::default();

    // A plain mask is usually far sparser than the operands: probe only its
    // positions.
    if let Some(m) = mask.filter(|m| !m.is_complemented()) {
        m.source_cols(i, &mut s.candidates);
        for &j in &s.candidates {
            if let (Some(x), Some(y)) = (a.get(i, j), b.get(i, j)) {
                out.push(j, op.apply(x.to_f64(), y.to_f64()))?;
            }
        }
        return Ok(out);
    }

    if let Some(m) = mask {
        m.load_row(i, &mut s.mask);
    }
    s.b_cols.clear();
    for (j, y) in b.row(i) {
        s.b_val[j] = y.to_f64();
        s.b_seen.insert(j);
        s.b_cols.push(j);
    }
    for (j, x) in a.row(i) {
        if s.b_seen.contains(j) && mask.is_none_or(|m| m.allows(&s.mask, j)) {
            out.push(j, op.apply(x.to_f64(), s.b_val[j]))?;
        }
    }
    for &j in &s.b_cols {
        s.b_seen.set(j, false);
    }
    Ok(out)
}

/// `dest += A .op B`: the intersection of `a` and `b` is computed with `op`
/// and folded into `dest` with `accum` (union of patterns).
///
/// # Errors
///
/// [`AlgebraError::DimensionMismatch`] when shapes differ,
/// [`AlgebraError::OutOfMemory`] when intermediate storage cannot be
/// reserved.
pub fn ewise_mult_accum<A: Scalar, B: Scalar>(
    dest: &mut Matrix<f64>,
    accum: BinaryOp,
    op: BinaryOp,
    a: &Matrix<A>,
    b: &Matrix<B>,
) -> Result<(), AlgebraError> {
    check_same_shape("ewise_mult_accum", dest, a)?;
    let t = ewise_mult(None, op, a, b, Descriptor::new())?;
    dest.accumulate_from(accum, &t)
}

/// `dest = dest accum src` over the union of patterns; entries only in
/// `src` are copied.
///
/// # Errors
///
/// [`AlgebraError::DimensionMismatch`] when shapes differ,
/// [`AlgebraError::OutOfMemory`] when a sparse destination must grow.
pub fn accumulate<T: Scalar>(
    dest: &mut Matrix<f64>,
    accum: BinaryOp,
    src: &Matrix<T>,
) -> Result<(), AlgebraError> {
    check_same_shape("accumulate", dest, src)?;
    dest.accumulate_from(accum, src)
}
