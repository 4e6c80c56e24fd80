//! Memory Source Trait
//!
//! Seam between the sampling pipeline and wherever the bytes come from.

use super::MemoryArea;
use crate::error::Result;

/// Something that can enumerate candidate areas and copy bytes out of them
pub trait MemorySource: Send + Sync {
    /// Process id the source reads from
    fn pid(&self) -> u32;

    /// Enumerate the current candidate areas, in address order
    fn regions(&self) -> Result<Vec<MemoryArea>>;

    /// Copy up to `buf.len()` bytes starting at `address`, returning how many were copied
    fn read_into(&self, address: usize, buf: &mut [u8]) -> Result<usize>;
}
