use crate::alloc::{try_bitset, try_filled};
use crate::error::AlgebraError;
use crate::matrix::Matrix;
use crate::operator::{BinaryOp, Monoid};
use crate::scalar::Scalar;

/// Reduce each column of `a` with `monoid` and fold the result into `dest`.
///
/// With `accum = None` the column result overwrites `dest[j]`; otherwise
/// `dest[j] = accum(dest[j], result)`. Columns without entries leave
/// `dest[j]` untouched. Rows are folded in ascending order so the result is
/// reproducible.
///
/// # Errors
///
/// [`AlgebraError::DimensionMismatch`] if `dest.len() != a.ncols()`,
/// [`AlgebraError::OutOfMemory`] if workspace cannot be reserved.
pub fn reduce_columns<T: Scalar>(
    dest: &mut [f64],
    accum: Option<BinaryOp>,
    monoid: Monoid,
    a: &Matrix<T>,
) -> Result<(), AlgebraError> {
    if dest.len() != a.ncols() {
        return Err(AlgebraError::mismatch(
            "reduce_columns",
            format!("vector has {} entries, matrix has {} columns", dest.len(), a.ncols()),
        ));
    }

    let mut partial = try_filled(a.ncols(), monoid.identity())?;
    let mut seen = try_bitset(a.ncols())?;
    for (_, j, v) in a.entries() {
        partial[j] = monoid.combine(partial[j], v.to_f64());
        seen.insert(j);
    }

    for j in seen.ones() {
        let current = dest[j];
        dest[j] = accum.map_or(partial[j], |op| op.apply(current, partial[j]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_sums_accumulate_onto_offset() {
        let a = Matrix::from_triplets(2, 3, [(0, 0, 1.0), (1, 0, 2.0), (1, 2, 5.0)])
            .expect("build");
        let mut c = vec![-2.0; 3];
        reduce_columns(&mut c, Some(BinaryOp::Plus), Monoid::Plus, &a).expect("reduce");
        assert_eq!(c, vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn overwrite_and_max() {
        let a = Matrix::from_triplets(2, 2, [(0, 1, 1.0), (1, 1, 9.0)]).expect("build");
        let mut c = vec![7.0, 7.0];
        reduce_columns(&mut c, None, Monoid::Max, &a).expect("reduce");
        assert_eq!(c, vec![7.0, 9.0]);
    }

    #[test]
    fn length_mismatch_is_reported() {
        let a = Matrix::<f64>::new(2, 2);
        let mut c = vec![0.0; 3];
        assert!(reduce_columns(&mut c, None, Monoid::Plus, &a).is_err());
    }
}
