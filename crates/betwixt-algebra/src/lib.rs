#![forbid(unsafe_code)]
//! betwixt-algebra: sparse matrix algebra primitives.
//!
//! # Overview
//!
//! A small GraphBLAS-flavoured engine: rectangular matrices stored as CSR
//! (`Sparse`), dense-with-presence-bitset (`Bitmap`) or dense (`Full`), and
//! the handful of bulk operations the betweenness engine is written
//! against:
//!
//! - [`mxm`]: masked matrix multiply over a [`Semiring`], with a push
//!   (row-wise saxpy) and a pull (masked dot product) kernel selected by the
//!   [`Descriptor`].
//! - [`ewise_mult`] / [`ewise_mult_accum`] / [`accumulate`]: position-wise
//!   combination of same-shaped matrices.
//! - [`reduce_columns`]: column reduction into a dense vector.
//! - [`pattern_of`], [`transpose`], [`is_pattern_symmetric`].
//!
//! # Conventions
//!
//! - **Errors**: every fallible operation returns [`AlgebraError`]. Storage
//!   proportional to `nrows * ncols` or `nnz` is reserved fallibly so that
//!   allocation failure surfaces as [`AlgebraError::OutOfMemory`].
//! - **Parallelism**: rows are processed with `rayon`. The arithmetic order
//!   inside a row is fixed, so results do not depend on the thread count.
//! - **Logging**: `tracing` at `trace!` level only; callers own the spans.

mod alloc;
mod error;
mod ewise;
mod matrix;
mod mxm;
mod operator;
mod reduce;
mod scalar;
mod structure;

pub use error::AlgebraError;
pub use ewise::{accumulate, ewise_mult, ewise_mult_accum};
pub use matrix::{Matrix, Representation, Row};
pub use mxm::mxm;
pub use operator::{BinaryOp, Monoid, Semiring};
pub use reduce::reduce_columns;
pub use scalar::Scalar;
pub use structure::{Descriptor, Mask, MaskSource, is_pattern_symmetric, pattern_of, transpose};
