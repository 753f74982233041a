//! Fallible allocation helpers.
//!
//! Every buffer sized by `nrows * ncols`, `nnz` or a row width goes through
//! these so that an allocation failure comes back as
//! [`AlgebraError::OutOfMemory`] instead of aborting the process.

use fixedbitset::FixedBitSet;

use crate::error::AlgebraError;

/// Bits per `FixedBitSet` block.
const BLOCK_BITS: usize = u32::BITS as usize;

fn out_of_memory<T>(len: usize) -> AlgebraError {
    AlgebraError::OutOfMemory {
        bytes: len.saturating_mul(std::mem::size_of::<T>()),
    }
}

/// Reserve a vector of exactly `len` copies of `fill`.
pub(crate) fn try_filled<T: Clone>(len: usize, fill: T) -> Result<Vec<T>, AlgebraError> {
    let mut v = try_with_capacity(len)?;
    v.resize(len, fill);
    Ok(v)
}

/// Reserve an empty vector with room for `cap` elements.
pub(crate) fn try_with_capacity<T>(cap: usize) -> Result<Vec<T>, AlgebraError> {
    let mut v = Vec::new();
    v.try_reserve_exact(cap).map_err(|_| out_of_memory::<T>(cap))?;
    Ok(v)
}

/// Copy a slice into a freshly reserved vector.
pub(crate) fn try_copy<T: Clone>(src: &[T]) -> Result<Vec<T>, AlgebraError> {
    let mut v = try_with_capacity(src.len())?;
    v.extend_from_slice(src);
    Ok(v)
}

/// `v.push(item)`, growing fallibly when full.
pub(crate) fn try_push<T>(v: &mut Vec<T>, item: T) -> Result<(), AlgebraError> {
    if v.len() == v.capacity() {
        v.try_reserve(1)
            .map_err(|_| out_of_memory::<T>(v.len().saturating_add(1)))?;
    }
    v.push(item);
    Ok(())
}

/// `v.insert(index, item)`, growing fallibly when full.
pub(crate) fn try_insert<T>(v: &mut Vec<T>, index: usize, item: T) -> Result<(), AlgebraError> {
    if v.len() == v.capacity() {
        v.try_reserve(1)
            .map_err(|_| out_of_memory::<T>(v.len().saturating_add(1)))?;
    }
    v.insert(index, item);
    Ok(())
}

/// Collect an iterator, growing fallibly.
pub(crate) fn try_collect<T>(items: impl IntoIterator<Item = T>) -> Result<Vec<T>, AlgebraError> {
    let items = items.into_iter();
    let mut v = try_with_capacity(items.size_hint().0)?;
    for item in items {
        try_push(&mut v, item)?;
    }
    Ok(v)
}

/// An all-clear bitset of `bits` bits.
pub(crate) fn try_bitset(bits: usize) -> Result<FixedBitSet, AlgebraError> {
    let blocks = try_filled(bits.div_ceil(BLOCK_BITS), 0u32)?;
    Ok(FixedBitSet::with_capacity_and_blocks(bits, blocks))
}

/// A copy of `bits`.
pub(crate) fn try_clone_bitset(bits: &FixedBitSet) -> Result<FixedBitSet, AlgebraError> {
    let blocks = try_copy(bits.as_slice())?;
    Ok(FixedBitSet::with_capacity_and_blocks(bits.len(), blocks))
}

/// `nrows * ncols`, treating overflow as an allocation failure.
pub(crate) fn dense_len(nrows: usize, ncols: usize) -> Result<usize, AlgebraError> {
    nrows
        .checked_mul(ncols)
        .ok_or(AlgebraError::OutOfMemory { bytes: usize::MAX })
}
