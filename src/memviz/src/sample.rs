//! Sample vectors and delta tracking
//!
//! A sample holds one widened cell per sampled byte. The driver keeps two:
//! the snapshot being filled and the last distinct value seen at each index.

use crate::error::{MemvizError, Result};

use rayon::prelude::*;

/// Cells compared per rayon task
const DELTA_CHUNK: usize = 64 * 1024;

/// Fixed-length buffer of widened byte values
#[derive(Debug, Clone, PartialEq)]
pub struct SampleVector {
    cells: Vec<f32>,
}

impl SampleVector {
    /// Allocate `len` zeroed cells, reporting allocation failure instead of aborting
    pub fn zeroed(len: usize) -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|source| MemvizError::BufferAllocation {
                bytes: len.saturating_mul(std::mem::size_of::<f32>()),
                source,
            })?;
        cells.resize(len, 0.0);
        Ok(Self { cells })
    }

    /// Allocate a copy of `other`
    pub fn try_clone(other: &SampleVector) -> Result<Self> {
        let mut copy = Self::zeroed(other.len())?;
        copy.cells.copy_from_slice(&other.cells);
        Ok(copy)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.cells
    }
}

/// Allocate the byte landing zone used by the reader
pub fn scratch_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|source| MemvizError::BufferAllocation { bytes: len, source })?;
    buffer.resize(len, 0);
    Ok(buffer)
}

/// Count cells where `current` differs from `previous`, copying each changed
/// value into `previous`.
///
/// Chunks of the index range are compared on separate rayon workers; each
/// worker only writes its own slice of `previous`. Only the common prefix of
/// the two slices is compared.
pub fn detect_and_commit(current: &[f32], previous: &mut [f32]) -> usize {
    let len = current.len().min(previous.len());

    previous[..len]
        .par_chunks_mut(DELTA_CHUNK)
        .zip(current[..len].par_chunks(DELTA_CHUNK))
        .map(|(prev, cur)| {
            let mut changed = 0;
            for (p, &c) in prev.iter_mut().zip(cur) {
                if *p != c {
                    *p = c;
                    changed += 1;
                }
            }
            changed
        })
        .sum()
}
