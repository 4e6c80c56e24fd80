//! Live Process Memory Source
//!
//! Reads a running process with `process_vm_readv` and resolves which
//! process to attach to.

use super::{maps, MemoryArea, MemorySource};
use crate::error::{MemvizError, Result};

use nix::sys::uio::{process_vm_readv, RemoteIoVec};
use nix::unistd::Pid;
use std::io::IoSliceMut;
use sysinfo::System;
use tracing::{debug, info};

/// A process whose memory is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetProcess {
    pub pid: u32,
}

impl TargetProcess {
    pub fn new(pid: u32) -> Self {
        Self { pid }
    }
}

impl MemorySource for TargetProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn regions(&self) -> Result<Vec<MemoryArea>> {
        maps::locate(self.pid)
    }

    fn read_into(&self, address: usize, buf: &mut [u8]) -> Result<usize> {
        let len = buf.len();
        if len == 0 {
            return Ok(0);
        }

        let remote = [RemoteIoVec { base: address, len }];
        let mut local = [IoSliceMut::new(buf)];

        process_vm_readv(Pid::from_raw(self.pid as i32), &mut local, &remote).map_err(|source| {
            MemvizError::ReadFailed {
                address,
                len,
                source,
            }
        })
    }
}

/// Resolve the PID given on the command line.
///
/// Missing or non-positive values select the current process. Thread ids are
/// mapped to their thread group.
pub fn resolve_pid(requested: Option<i32>) -> u32 {
    let pid = match requested {
        Some(pid) if pid > 0 => pid as u32,
        _ => std::process::id(),
    };

    match get_tgid(pid) {
        Some(tgid) if tgid != pid => {
            debug!(tid = pid, tgid, "using thread group leader");
            tgid
        }
        _ => pid,
    }
}

/// Find a running process by name, preferring the one with the most resident memory
pub fn find_process_by_name(name: &str) -> Result<u32> {
    let mut system = System::new_all();
    system.refresh_all();

    let own_pid = std::process::id();
    let needle = name.to_lowercase();
    let mut candidates: Vec<(u32, u64)> = Vec::new();

    for process in system.processes().values() {
        let pid = process.pid().as_u32();
        if pid == own_pid {
            continue;
        }

        let process_name = process.name().to_string_lossy().to_lowercase();
        if process_name == needle || process_name.starts_with(&needle) {
            let tgid = get_tgid(pid).unwrap_or(pid);
            candidates.push((tgid, process.memory()));
        }
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    candidates.dedup_by(|a, b| a.0 == b.0);

    match candidates.first() {
        Some(&(pid, memory)) => {
            info!(pid, memory_mb = memory / 1_000_000, "found process '{}'", name);
            Ok(pid)
        }
        None => Err(MemvizError::ProcessNotFound(name.to_string())),
    }
}

/// Get the thread group ID (main process) for a given PID/TID
pub fn get_tgid(pid: u32) -> Option<u32> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    for line in status.lines() {
        if let Some(value) = line.strip_prefix("Tgid:") {
            return value.trim().parse().ok();
        }
    }
    None
}
