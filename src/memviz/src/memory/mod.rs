//! Process memory access
//!
//! This module provides functionality to:
//! - Locate the heap, stack and anonymous areas of a process
//! - Copy bytes out of another process's address space
//! - Fill a fixed-size sample from those areas
//!
//! ## Module Structure
//!
//! - `area` - Candidate memory ranges
//! - `maps` - /proc/pid/maps parsing (region locator)
//! - `source` - Memory source abstraction
//! - `process` - Live process source and PID resolution
//! - `reader` - Budgeted per-area copy into the sample

mod area;
pub mod maps;
#[cfg(test)]
mod mock;
mod process;
pub mod reader;
mod source;

pub use area::{total_length, AreaKind, MemoryArea};
#[cfg(test)]
pub use mock::MockMemorySource;
pub use process::{find_process_by_name, get_tgid, resolve_pid, TargetProcess};
pub use reader::{read_sample, ReadSummary};
pub use source::MemorySource;
