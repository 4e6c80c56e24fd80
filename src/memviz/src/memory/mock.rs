//! Mock Memory Source
//!
//! A synthetic address space for exercising the sampling pipeline without a
//! live process.

use super::{AreaKind, MemoryArea, MemorySource};
use crate::error::{MemvizError, Result};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

struct Segment {
    area: MemoryArea,
    data: Vec<u8>,
}

/// A mock memory source with interior mutability so tests can change memory
/// between cycles
#[derive(Default)]
pub struct MockMemorySource {
    segments: Mutex<Vec<Segment>>,
    short_reads: AtomicBool,
    unavailable: AtomicBool,
    reads: AtomicUsize,
}

impl MockMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a readable and writable area backed by `data`
    pub fn with_area(self, start: usize, data: Vec<u8>, kind: AreaKind) -> Self {
        let area = MemoryArea::new(start, start + data.len(), "rw-p", kind)
            .expect("mock area range");
        self.segments.lock().unwrap().push(Segment { area, data });
        self
    }

    /// Overwrite one byte of the synthetic address space
    pub fn poke(&self, address: usize, value: u8) {
        let mut segments = self.segments.lock().unwrap();
        let segment = segments
            .iter_mut()
            .find(|s| address >= s.area.start && address < s.area.end)
            .expect("poke outside mock areas");
        segment.data[address - segment.area.start] = value;
    }

    /// Make every read return half of what was asked
    pub fn set_short_reads(&self, enabled: bool) {
        self.short_reads.store(enabled, Ordering::SeqCst);
    }

    /// Make region enumeration fail as if the process vanished
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `read_into` calls so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl MemorySource for MockMemorySource {
    fn pid(&self) -> u32 {
        4242
    }

    fn regions(&self) -> Result<Vec<MemoryArea>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MemvizError::MapsUnavailable {
                pid: self.pid(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }

        let areas: Vec<MemoryArea> = self
            .segments
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.area.clone())
            .collect();

        if areas.is_empty() {
            return Err(MemvizError::NoRegions { pid: self.pid() });
        }
        Ok(areas)
    }

    fn read_into(&self, address: usize, buf: &mut [u8]) -> Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let segments = self.segments.lock().unwrap();
        let segment = segments
            .iter()
            .find(|s| address >= s.area.start && address < s.area.end)
            .ok_or(MemvizError::ReadFailed {
                address,
                len: buf.len(),
                source: nix::errno::Errno::EFAULT,
            })?;

        let offset = address - segment.area.start;
        let mut count = buf.len().min(segment.data.len() - offset);
        if self.short_reads.load(Ordering::SeqCst) {
            count /= 2;
        }

        buf[..count].copy_from_slice(&segment.data[offset..offset + count]);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_read_into() {
        let source =
            MockMemorySource::new().with_area(0x1000, vec![0x41, 0x42, 0x43, 0x44], AreaKind::Heap);

        let mut buf = [0u8; 4];
        assert_eq!(source.read_into(0x1000, &mut buf).unwrap(), 4);
        assert_eq!(buf, [0x41, 0x42, 0x43, 0x44]);

        let mut partial = [0u8; 2];
        assert_eq!(source.read_into(0x1001, &mut partial).unwrap(), 2);
        assert_eq!(partial, [0x42, 0x43]);
    }

    #[test]
    fn test_mock_source_read_past_end_is_short() {
        let source = MockMemorySource::new().with_area(0x1000, vec![1, 2, 3, 4], AreaKind::Heap);
        let mut buf = [0u8; 10];
        assert_eq!(source.read_into(0x1002, &mut buf).unwrap(), 2);
    }

    #[test]
    fn test_mock_source_unmapped_read_fails() {
        let source = MockMemorySource::new().with_area(0x1000, vec![0; 4], AreaKind::Heap);
        let mut buf = [0u8; 4];
        assert!(source.read_into(0x500, &mut buf).is_err());
    }

    #[test]
    fn test_mock_source_poke_and_flags() {
        let source = MockMemorySource::new().with_area(0x1000, vec![0; 8], AreaKind::Stack);
        source.poke(0x1003, 0xAA);

        let mut buf = [0u8; 8];
        source.read_into(0x1000, &mut buf).unwrap();
        assert_eq!(buf[3], 0xAA);

        source.set_short_reads(true);
        assert_eq!(source.read_into(0x1000, &mut buf).unwrap(), 4);
        assert_eq!(source.read_count(), 2);

        source.set_unavailable(true);
        assert!(source.regions().is_err());
    }
}
