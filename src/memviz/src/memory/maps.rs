//! Region Locator
//!
//! Parses /proc/pid/maps into the heap, stack and anonymous areas that are
//! both readable and writable.

use super::area::{AreaKind, MemoryArea};
use crate::error::{MemvizError, Result};

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::debug;

/// Fields in a maps line before the optional pathname
const FIELDS_BEFORE_PATH: usize = 5;

/// Locate the candidate areas of a live process, in the order the kernel lists them
pub fn locate(pid: u32) -> Result<Vec<MemoryArea>> {
    let maps_path = format!("/proc/{}/maps", pid);
    let file =
        File::open(&maps_path).map_err(|source| MemvizError::MapsUnavailable { pid, source })?;

    let areas = parse_maps(BufReader::new(file))
        .map_err(|source| MemvizError::MapsUnavailable { pid, source })?;

    if areas.is_empty() {
        return Err(MemvizError::NoRegions { pid });
    }

    debug!(pid, count = areas.len(), "located memory areas");
    Ok(areas)
}

/// Parse maps text, keeping only qualifying lines.
///
/// Lines with an unparsable or inverted address range are skipped. Pathnames
/// are not required to be UTF-8.
pub fn parse_maps<R: BufRead>(reader: R) -> io::Result<Vec<MemoryArea>> {
    let mut areas = Vec::new();

    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        if let Some(area) = parse_line(&line) {
            areas.push(area);
        }
    }

    Ok(areas)
}

/// Parse a single maps line into an area if it qualifies
pub fn parse_line(line: &str) -> Option<MemoryArea> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let range = parts.first()?;
    let perms = parts.get(1)?;

    let kind = classify(line, parts.len())?;

    let (start, end) = range.split_once('-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;

    MemoryArea::new(start, end, *perms, kind)
        .filter(|area| area.is_readable() && area.is_writable())
}

fn classify(line: &str, field_count: usize) -> Option<AreaKind> {
    if line.contains("[heap]") {
        Some(AreaKind::Heap)
    } else if line.contains("[stack") {
        // Older kernels tag thread stacks as [stack:<tid>]
        Some(AreaKind::Stack)
    } else if line.contains("[ anon ]") || field_count == FIELDS_BEFORE_PATH {
        Some(AreaKind::Anonymous)
    } else {
        None
    }
}
