//! Matrix storage: CSR, bitmap and full layouts behind one type.
//!
//! # Representations
//!
//! - **Sparse**: compressed sparse rows, column indices sorted within a row.
//!   Memory is `O(nrows + nnz)`.
//! - **Bitmap**: a dense `nrows * ncols` value array plus a presence bitset.
//!   Constant-time lookup, which is what a matrix read every step and used as
//!   a mask wants.
//! - **Full**: a dense value array with every entry present. Requesting
//!   `Full` for a matrix with holes yields `Bitmap` instead.
//!
//! The representation never changes the value of any operation, only its
//! cost.

use fixedbitset::FixedBitSet;
use rayon::prelude::*;

use crate::alloc::{
    dense_len, try_bitset, try_clone_bitset, try_collect, try_copy, try_filled, try_insert,
    try_push, try_with_capacity,
};
use crate::error::AlgebraError;
use crate::operator::BinaryOp;
use crate::scalar::Scalar;

/// Storage layout of a [`Matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Representation {
    #[default]
    Sparse,
    Bitmap,
    Full,
}

/// A rectangular matrix whose entries are either present (with a value) or
/// absent.
#[derive(Debug, Clone)]
pub struct Matrix<T> {
    nrows: usize,
    ncols: usize,
    storage: Storage<T>,
}

#[derive(Debug, Clone)]
enum Storage<T> {
    Sparse {
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    },
    Bitmap {
        present: FixedBitSet,
        values: Vec<T>,
        nvals: usize,
    },
    Full {
        values: Vec<T>,
    },
}

/// One row produced by a kernel, columns ascending.
#[derive(Debug, Clone)]
pub(crate) struct RowBuf<T> {
    pub cols: Vec<usize>,
    pub vals: Vec<T>,
}

impl<T> Default for RowBuf<T> {
    fn default() -> Self {
        Self {
            cols: Vec::new(),
            vals: Vec::new(),
        }
    }
}

impl<T> RowBuf<T> {
    pub fn with_capacity(cap: usize) -> Result<Self, AlgebraError> {
        Ok(Self {
            cols: try_with_capacity(cap)?,
            vals: try_with_capacity(cap)?,
        })
    }

    pub fn push(&mut self, col: usize, val: T) -> Result<(), AlgebraError> {
        try_push(&mut self.cols, col)?;
        try_push(&mut self.vals, val)
    }

    pub fn len(&self) -> usize {
        self.cols.len()
    }
}

/// Run `row` for every row index in parallel, one `init` scratch per worker.
///
/// The first error from `init` or `row` is returned.
pub(crate) fn par_rows<T, S>(
    nrows: usize,
    init: impl Fn() -> Result<S, AlgebraError> + Sync + Send,
    row: impl Fn(&mut S, usize) -> Result<RowBuf<T>, AlgebraError> + Sync + Send,
) -> Result<Vec<RowBuf<T>>, AlgebraError>
where
    T: Clone + Send,
{
    let mut rows = try_filled(nrows, RowBuf::default())?;
    rows.par_iter_mut()
        .enumerate()
        .try_for_each_init(init, |scratch, (i, out)| -> Result<(), AlgebraError> {
            let scratch = match scratch {
                Ok(scratch) => scratch,
                Err(e) => return Err(e.clone()),
            };
            *out = row(scratch, i)?;
            Ok(())
        })?;
    Ok(rows)
}

/// Iterator over the present entries of one row, as `(column, value)` in
/// ascending column order.
#[derive(Debug, Clone)]
pub enum Row<'a, T> {
    Sparse {
        cols: std::slice::Iter<'a, usize>,
        vals: std::slice::Iter<'a, T>,
    },
    Bitmap {
        present: &'a FixedBitSet,
        vals: &'a [T],
        base: usize,
        next: usize,
    },
    Full {
        vals: std::iter::Enumerate<std::slice::Iter<'a, T>>,
    },
}

impl<T: Copy> Iterator for Row<'_, T> {
    type Item = (usize, T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Sparse { cols, vals } => Some((*cols.next()?, *vals.next()?)),
            Self::Bitmap {
                present,
                vals,
                base,
                next,
            } => {
                while *next < vals.len() {
                    let j = *next;
                    *next += 1;
                    if present.contains(*base + j) {
                        return Some((j, vals[j]));
                    }
                }
                None
            }
            Self::Full { vals } => vals.next().map(|(j, v)| (j, *v)),
        }
    }
}

impl<T: Scalar> Matrix<T> {
    /// An empty (no entries) sparse matrix.
    #[must_use]
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            storage: Storage::Sparse {
                row_ptr: vec![0; nrows + 1],
                col_idx: Vec::new(),
                values: Vec::new(),
            },
        }
    }

    /// A full matrix with every entry equal to `value`.
    ///
    /// # Errors
    ///
    /// [`AlgebraError::OutOfMemory`] if the dense array cannot be reserved.
    pub fn full(nrows: usize, ncols: usize, value: T) -> Result<Self, AlgebraError> {
        let len = dense_len(nrows, ncols)?;
        Ok(Self {
            nrows,
            ncols,
            storage: Storage::Full {
                values: try_filled(len, value)?,
            },
        })
    }

    /// Build a sparse matrix from `(row, col, value)` triplets.
    ///
    /// Triplets may arrive in any order. When the same position appears more
    /// than once the last value wins.
    ///
    /// # Errors
    ///
    /// [`AlgebraError::IndexOutOfBounds`] for a triplet outside the shape,
    /// [`AlgebraError::OutOfMemory`] if storage cannot be reserved.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, T)>,
    ) -> Result<Self, AlgebraError> {
        let mut entries: Vec<(usize, usize, usize, T)> = try_collect(
            triplets
                .into_iter()
                .enumerate()
                .map(|(seq, (i, j, v))| (i, j, seq, v)),
        )?;
        if let Some(&(row, col, ..)) = entries.iter().find(|(i, j, ..)| *i >= nrows || *j >= ncols)
        {
            return Err(AlgebraError::IndexOutOfBounds {
                row,
                col,
                nrows,
                ncols,
            });
        }

        // The arrival index breaks ties, so the in-place unstable sort still
        // leaves duplicates in insertion order.
        entries.sort_unstable_by_key(|&(i, j, seq, _)| (i, j, seq));
        let mut deduped: Vec<(usize, usize, T)> = try_with_capacity(entries.len())?;
        for (i, j, _, v) in entries {
            match deduped.last_mut() {
                Some(last) if last.0 == i && last.1 == j => last.2 = v,
                _ => deduped.push((i, j, v)),
            }
        }

        let nvals = deduped.len();
        let storage = collect_storage(
            nrows,
            ncols,
            nvals,
            deduped.into_iter(),
            Representation::Sparse,
        )?;
        Ok(Self {
            nrows,
            ncols,
            storage,
        })
    }

    /// Assemble a matrix from per-row kernel output.
    pub(crate) fn from_rows(
        nrows: usize,
        ncols: usize,
        rows: Vec<RowBuf<T>>,
        repr: Representation,
    ) -> Result<Self, AlgebraError> {
        debug_assert_eq!(rows.len(), nrows);
        let nvals = rows.iter().map(RowBuf::len).sum();
        let entries = rows.into_iter().enumerate().flat_map(|(i, row)| {
            row.cols
                .into_iter()
                .zip(row.vals)
                .map(move |(j, v)| (i, j, v))
        });
        let storage = collect_storage(nrows, ncols, nvals, entries, repr)?;
        Ok(Self {
            nrows,
            ncols,
            storage,
        })
    }

    /// Wrap already-built CSR arrays. Columns must be sorted within rows.
    pub(crate) fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        debug_assert_eq!(row_ptr.len(), nrows + 1);
        debug_assert_eq!(col_idx.len(), values.len());
        Self {
            nrows,
            ncols,
            storage: Storage::Sparse {
                row_ptr,
                col_idx,
                values,
            },
        }
    }

    #[must_use]
    pub const fn nrows(&self) -> usize {
        self.nrows
    }

    #[must_use]
    pub const fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of structurally present entries.
    #[must_use]
    pub fn nvals(&self) -> usize {
        match &self.storage {
            Storage::Sparse { col_idx, .. } => col_idx.len(),
            Storage::Bitmap { nvals, .. } => *nvals,
            Storage::Full { values } => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nvals() == 0
    }

    #[must_use]
    pub const fn representation(&self) -> Representation {
        match self.storage {
            Storage::Sparse { .. } => Representation::Sparse,
            Storage::Bitmap { .. } => Representation::Bitmap,
            Storage::Full { .. } => Representation::Full,
        }
    }

    /// The value at `(row, col)`, or `None` if absent or out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        match &self.storage {
            Storage::Sparse {
                row_ptr,
                col_idx,
                values,
            } => {
                let (start, end) = (row_ptr[row], row_ptr[row + 1]);
                col_idx[start..end]
                    .binary_search(&col)
                    .ok()
                    .map(|k| values[start + k])
            }
            Storage::Bitmap {
                present, values, ..
            } => {
                let k = row * self.ncols + col;
                present.contains(k).then(|| values[k])
            }
            Storage::Full { values } => Some(values[row * self.ncols + col]),
        }
    }

    /// Insert or overwrite a single entry.
    ///
    /// Inserting into a sparse matrix shifts the tail of the storage, so this
    /// is meant for seeding a handful of entries, not bulk construction.
    ///
    /// # Errors
    ///
    /// [`AlgebraError::IndexOutOfBounds`] when `(row, col)` is outside the
    /// shape.
    pub fn set_element(&mut self, row: usize, col: usize, value: T) -> Result<(), AlgebraError> {
        if row >= self.nrows || col >= self.ncols {
            return Err(AlgebraError::IndexOutOfBounds {
                row,
                col,
                nrows: self.nrows,
                ncols: self.ncols,
            });
        }
        let ncols = self.ncols;
        match &mut self.storage {
            Storage::Sparse {
                row_ptr,
                col_idx,
                values,
            } => {
                let (start, end) = (row_ptr[row], row_ptr[row + 1]);
                match col_idx[start..end].binary_search(&col) {
                    Ok(k) => values[start + k] = value,
                    Err(k) => {
                        try_insert(col_idx, start + k, col)?;
                        try_insert(values, start + k, value)?;
                        for ptr in &mut row_ptr[row + 1..] {
                            *ptr += 1;
                        }
                    }
                }
            }
            Storage::Bitmap {
                present,
                values,
                nvals,
            } => {
                let k = row * ncols + col;
                if !present.put(k) {
                    *nvals += 1;
                }
                values[k] = value;
            }
            Storage::Full { values } => values[row * ncols + col] = value,
        }
        Ok(())
    }

    /// Iterate the present entries of `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()`.
    #[must_use]
    pub fn row(&self, row: usize) -> Row<'_, T> {
        assert!(row < self.nrows, "row {row} out of range ({})", self.nrows);
        match &self.storage {
            Storage::Sparse {
                row_ptr,
                col_idx,
                values,
            } => {
                let (start, end) = (row_ptr[row], row_ptr[row + 1]);
                Row::Sparse {
                    cols: col_idx[start..end].iter(),
                    vals: values[start..end].iter(),
                }
            }
            Storage::Bitmap {
                present, values, ..
            } => {
                let base = row * self.ncols;
                Row::Bitmap {
                    present,
                    vals: &values[base..base + self.ncols],
                    base,
                    next: 0,
                }
            }
            Storage::Full { values } => {
                let base = row * self.ncols;
                Row::Full {
                    vals: values[base..base + self.ncols].iter().enumerate(),
                }
            }
        }
    }

    /// Iterate every present entry in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.nrows).flat_map(move |i| self.row(i).map(move |(j, v)| (i, j, v)))
    }

    /// Re-store the matrix in the requested layout.
    ///
    /// `Full` is honoured only when every entry is present; otherwise the
    /// matrix becomes `Bitmap`. Values are unchanged.
    ///
    /// # Errors
    ///
    /// [`AlgebraError::OutOfMemory`] if the new layout cannot be reserved.
    pub fn set_representation_hint(&mut self, hint: Representation) -> Result<(), AlgebraError> {
        if hint == self.representation() {
            return Ok(());
        }
        let storage = collect_storage(self.nrows, self.ncols, self.nvals(), self.entries(), hint)?;
        self.storage = storage;
        Ok(())
    }

    /// Apply `f` to every present value, keeping the pattern and layout.
    pub(crate) fn map<U: Scalar>(&self, f: impl Fn(T) -> U) -> Result<Matrix<U>, AlgebraError> {
        let storage = match &self.storage {
            Storage::Sparse {
                row_ptr,
                col_idx,
                values,
            } => {
                let mut mapped = try_with_capacity(values.len())?;
                mapped.extend(values.iter().map(|&v| f(v)));
                Storage::Sparse {
                    row_ptr: try_copy(row_ptr)?,
                    col_idx: try_copy(col_idx)?,
                    values: mapped,
                }
            }
            Storage::Bitmap {
                present,
                values,
                nvals,
            } => {
                let mut mapped = try_with_capacity(values.len())?;
                mapped.extend(values.iter().enumerate().map(|(k, &v)| {
                    if present.contains(k) { f(v) } else { U::default() }
                }));
                Storage::Bitmap {
                    present: try_clone_bitset(present)?,
                    values: mapped,
                    nvals: *nvals,
                }
            }
            Storage::Full { values } => {
                let mut mapped = try_with_capacity(values.len())?;
                mapped.extend(values.iter().map(|&v| f(v)));
                Storage::Full { values: mapped }
            }
        };
        Ok(Matrix {
            nrows: self.nrows,
            ncols: self.ncols,
            storage,
        })
    }
}

impl Matrix<f64> {
    /// `self(i, j) = accum(self(i, j), src(i, j))` where both are present,
    /// `src(i, j)` where only `src` is. Layout of `self` is preserved.
    pub(crate) fn accumulate_from<U: Scalar>(
        &mut self,
        accum: BinaryOp,
        src: &Matrix<U>,
    ) -> Result<(), AlgebraError> {
        let ncols = self.ncols;
        if self.representation() == Representation::Sparse {
            let this = &*self;
            let rows = par_rows(
                this.nrows,
                || Ok(()),
                |_, i| merge_row(this.row(i), src.row(i), accum),
            )?;
            *self = Self::from_rows(self.nrows, ncols, rows, Representation::Sparse)?;
            return Ok(());
        }
        match &mut self.storage {
            Storage::Full { values } => {
                if ncols == 0 {
                    return Ok(());
                }
                values
                    .par_chunks_mut(ncols)
                    .enumerate()
                    .for_each(|(i, row)| {
                        for (j, v) in src.row(i) {
                            row[j] = accum.apply(row[j], v.to_f64());
                        }
                    });
            }
            Storage::Bitmap {
                present,
                values,
                nvals,
            } => {
                for (i, j, v) in src.entries() {
                    let k = i * ncols + j;
                    if present.put(k) {
                        values[k] = accum.apply(values[k], v.to_f64());
                    } else {
                        values[k] = v.to_f64();
                        *nvals += 1;
                    }
                }
            }
            // Merged above.
            Storage::Sparse { .. } => {}
        }
        Ok(())
    }
}

fn merge_row<U: Scalar>(
    mut left: Row<'_, f64>,
    mut right: Row<'_, U>,
    accum: BinaryOp,
) -> Result<RowBuf<f64>, AlgebraError> {
    let mut out = RowBuf::default();
    let mut l = left.next();
    let mut r = right.next();
    loop {
        match (l, r) {
            (Some((lj, lv)), Some((rj, rv))) => {
                if lj < rj {
                    out.push(lj, lv)?;
                    l = left.next();
                } else if rj < lj {
                    out.push(rj, rv.to_f64())?;
                    r = right.next();
                } else {
                    out.push(lj, accum.apply(lv, rv.to_f64()))?;
                    l = left.next();
                    r = right.next();
                }
            }
            (Some((lj, lv)), None) => {
                out.push(lj, lv)?;
                l = left.next();
            }
            (None, Some((rj, rv))) => {
                out.push(rj, rv.to_f64())?;
                r = right.next();
            }
            (None, None) => return Ok(out),
        }
    }
}

/// Lay out row-major sorted entries in the requested representation.
fn collect_storage<T: Scalar>(
    nrows: usize,
    ncols: usize,
    nvals: usize,
    entries: impl Iterator<Item = (usize, usize, T)>,
    repr: Representation,
) -> Result<Storage<T>, AlgebraError> {
    match repr {
        Representation::Sparse => {
            let mut row_ptr = try_filled(nrows.saturating_add(1), 0usize)?;
            let mut col_idx = try_with_capacity(nvals)?;
            let mut values = try_with_capacity(nvals)?;
            for (i, j, v) in entries {
                row_ptr[i + 1] += 1;
                col_idx.push(j);
                values.push(v);
            }
            for i in 0..nrows {
                row_ptr[i + 1] += row_ptr[i];
            }
            Ok(Storage::Sparse {
                row_ptr,
                col_idx,
                values,
            })
        }
        Representation::Full if Some(nvals) == nrows.checked_mul(ncols) => {
            let mut values = try_with_capacity(nvals)?;
            values.extend(entries.map(|(_, _, v)| v));
            Ok(Storage::Full { values })
        }
        Representation::Bitmap | Representation::Full => {
            let len = dense_len(nrows, ncols)?;
            let mut values = try_filled(len, T::default())?;
            let mut present = try_bitset(len)?;
            let mut count = 0;
            for (i, j, v) in entries {
                let k = i * ncols + j;
                present.insert(k);
                values[k] = v;
                count += 1;
            }
            Ok(Storage::Bitmap {
                present,
                values,
                nvals: count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix<f64> {
        Matrix::from_triplets(3, 4, [(2, 1, 5.0), (0, 3, 1.0), (0, 0, 2.0), (1, 2, 3.0)])
            .expect("build")
    }

    #[test]
    fn triplets_are_sorted_and_queryable() {
        let m = sample();
        assert_eq!(m.nvals(), 4);
        assert_eq!(m.representation(), Representation::Sparse);
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(0, 2.0), (3, 1.0)]);
        assert_eq!(m.get(2, 1), Some(5.0));
        assert_eq!(m.get(2, 2), None);
        assert_eq!(m.get(9, 9), None);
    }

    #[test]
    fn duplicate_triplets_keep_last_value() {
        let m = Matrix::from_triplets(2, 2, [(0, 1, 1.0), (0, 1, 7.0)]).expect("build");
        assert_eq!(m.nvals(), 1);
        assert_eq!(m.get(0, 1), Some(7.0));
    }

    #[test]
    fn out_of_range_triplet_is_rejected() {
        let err = Matrix::from_triplets(2, 2, [(0, 2, 1.0)]).expect_err("must fail");
        assert!(matches!(err, AlgebraError::IndexOutOfBounds { col: 2, .. }));
    }

    #[test]
    fn representation_round_trip_preserves_entries() {
        let mut m = sample();
        let before: Vec<_> = m.entries().collect();
        for repr in [
            Representation::Bitmap,
            Representation::Full,
            Representation::Sparse,
        ] {
            m.set_representation_hint(repr).expect("convert");
            assert_eq!(m.entries().collect::<Vec<_>>(), before, "{repr:?}");
        }
    }

    #[test]
    fn full_hint_with_holes_falls_back_to_bitmap() {
        let mut m = sample();
        m.set_representation_hint(Representation::Full).expect("convert");
        assert_eq!(m.representation(), Representation::Bitmap);

        let mut dense = Matrix::full(2, 2, 1.0).expect("full");
        dense.set_representation_hint(Representation::Sparse).expect("convert");
        dense.set_representation_hint(Representation::Full).expect("convert");
        assert_eq!(dense.representation(), Representation::Full);
        assert_eq!(dense.nvals(), 4);
    }

    #[test]
    fn set_element_in_every_layout() {
        for repr in [Representation::Sparse, Representation::Bitmap] {
            let mut m = Matrix::<f64>::new(2, 3);
            m.set_representation_hint(repr).expect("convert");
            m.set_element(1, 2, 4.0).expect("set");
            m.set_element(1, 0, 1.0).expect("set");
            m.set_element(1, 2, 6.0).expect("overwrite");
            assert_eq!(m.nvals(), 2, "{repr:?}");
            assert_eq!(m.row(1).collect::<Vec<_>>(), vec![(0, 1.0), (2, 6.0)]);
            assert!(m.set_element(2, 0, 1.0).is_err());
        }
    }

    #[test]
    fn accumulate_unions_and_combines() {
        let src = Matrix::from_triplets(3, 4, [(0, 0, 10.0), (1, 1, 1.0)]).expect("build");
        for repr in [Representation::Sparse, Representation::Bitmap] {
            let mut dest = sample();
            dest.set_representation_hint(repr).expect("convert");
            dest.accumulate_from(BinaryOp::Plus, &src).expect("accumulate");
            assert_eq!(dest.get(0, 0), Some(12.0), "{repr:?}");
            assert_eq!(dest.get(1, 1), Some(1.0), "{repr:?}");
            assert_eq!(dest.nvals(), 5, "{repr:?}");
        }

        let mut full = Matrix::full(3, 4, 1.0).expect("full");
        full.accumulate_from(BinaryOp::Plus, &src).expect("accumulate");
        assert_eq!(full.get(0, 0), Some(11.0));
        assert_eq!(full.get(2, 3), Some(1.0));
        assert_eq!(full.representation(), Representation::Full);
    }

    #[test]
    fn map_keeps_pattern() {
        let mut m = sample();
        m.set_representation_hint(Representation::Bitmap).expect("convert");
        let p = m.map(|_| true).expect("map");
        assert_eq!(p.representation(), Representation::Bitmap);
        assert_eq!(p.nvals(), 4);
        assert_eq!(p.get(1, 2), Some(true));
        assert_eq!(p.get(1, 1), None);
    }

    #[test]
    fn oversized_bitmap_hint_is_out_of_memory() {
        let mut m = Matrix::<f64>::new(2, 1 << 61);
        let err = m
            .set_representation_hint(Representation::Bitmap)
            .expect_err("must fail");
        assert!(matches!(err, AlgebraError::OutOfMemory { .. }));
        assert_eq!(m.representation(), Representation::Sparse);
    }

    #[test]
    fn wide_sparse_matrix_needs_no_dense_storage() {
        // nrows * ncols overflows, but CSR only needs the rows and entries.
        let m = Matrix::from_triplets(2, usize::MAX, [(0, 5, 1.0), (1, usize::MAX - 1, 2.0)])
            .expect("build");
        assert_eq!(m.nvals(), 2);
        assert_eq!(m.get(1, usize::MAX - 1), Some(2.0));

        let p = m.map(|_| true).expect("map");
        assert_eq!(p.get(0, 5), Some(true));

        let mut dense = m;
        let err = dense
            .set_representation_hint(Representation::Bitmap)
            .expect_err("must fail");
        assert!(matches!(err, AlgebraError::OutOfMemory { .. }));
    }
}
