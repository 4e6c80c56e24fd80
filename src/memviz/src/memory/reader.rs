//! Remote Reader
//!
//! Fills a fixed-size sample from a sequence of memory areas. Areas are read
//! one at a time through a reused scratch buffer because they are scattered
//! across the target's address space while the sample is contiguous.

use super::{MemoryArea, MemorySource};
use crate::error::{MemvizError, Result};

use rayon::prelude::*;
use tracing::trace;

/// Outcome of a successful sample fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSummary {
    /// Bytes copied from the target; cells past this are zero
    pub collected: usize,
    /// Areas that contributed bytes
    pub areas_read: usize,
}

/// Fill `sample` with widened bytes from `areas`, in order.
///
/// Each area contributes `min(area.length, remaining budget)` bytes through a
/// single read. Areas after the budget is spent are never touched. A short
/// read fails the whole fill. Any cells left over are zeroed.
pub fn read_sample<S: MemorySource + ?Sized>(
    source: &S,
    areas: &[MemoryArea],
    sample: &mut [f32],
    scratch: &mut [u8],
) -> Result<ReadSummary> {
    let budget = sample.len();
    if scratch.len() < budget {
        return Err(MemvizError::InvalidConfig(format!(
            "scratch buffer holds {} bytes but the sample needs {}",
            scratch.len(),
            budget
        )));
    }

    let mut collected = 0;
    let mut areas_read = 0;

    for area in areas {
        if collected >= budget {
            break;
        }

        let bytes = area.length.min(budget - collected);
        if bytes == 0 {
            continue;
        }

        let landing = &mut scratch[..bytes];
        let read = source.read_into(area.start, landing)?;
        if read != bytes {
            return Err(MemvizError::ShortRead {
                address: area.start,
                requested: bytes,
                read,
            });
        }

        sample[collected..collected + bytes]
            .par_iter_mut()
            .zip(landing.par_iter())
            .for_each(|(cell, &byte)| *cell = f32::from(byte));

        trace!(start = area.start, bytes, "copied area");
        collected += bytes;
        areas_read += 1;
    }

    sample[collected..].fill(0.0);

    if collected == 0 {
        return Err(MemvizError::NothingCollected);
    }

    Ok(ReadSummary {
        collected,
        areas_read,
    })
}
