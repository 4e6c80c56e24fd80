//! Memory Area Types
//!
//! Candidate byte ranges selected from /proc/pid/maps.

use std::fmt;

/// What tagged a mapping as worth sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    Heap,
    Stack,
    Anonymous,
}

/// A writable memory range of the target process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryArea {
    pub start: usize,
    pub end: usize,
    pub length: usize,
    pub perms: String,
    pub kind: AreaKind,
}

impl MemoryArea {
    /// Build an area, rejecting ranges whose end precedes their start
    pub fn new(start: usize, end: usize, perms: impl Into<String>, kind: AreaKind) -> Option<Self> {
        let length = end.checked_sub(start)?;
        Some(Self {
            start,
            end,
            length,
            perms: perms.into(),
            kind,
        })
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    pub fn is_writable(&self) -> bool {
        self.perms.chars().nth(1) == Some('w')
    }
}

impl fmt::Display for MemoryArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}-{:x} length: {}", self.start, self.end, self.length)
    }
}

/// Sum of the lengths of every area
pub fn total_length(areas: &[MemoryArea]) -> u64 {
    areas.iter().map(|a| a.length as u64).sum()
}
