//! Error types for memviz

use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemvizError {
    #[error("cannot open memory mappings of pid {pid}")]
    MapsUnavailable {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("pid {pid} has no readable and writable heap, stack or anonymous mappings")]
    NoRegions { pid: u32 },

    #[error("reading {len} bytes at {address:#x} failed")]
    ReadFailed {
        address: usize,
        len: usize,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("short read at {address:#x}: requested {requested} bytes, got {read}")]
    ShortRead {
        address: usize,
        requested: usize,
        read: usize,
    },

    #[error("no bytes were collected from any memory area")]
    NothingCollected,

    #[error("cannot allocate {bytes} byte sampling buffer")]
    BufferAllocation {
        bytes: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("initial snapshot of pid {pid} failed")]
    InitialSnapshot {
        pid: u32,
        #[source]
        source: Box<MemvizError>,
    },

    #[error("no running process named '{0}'")]
    ProcessNotFound(String),

    #[error("failed to read config from {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MemvizError {
    /// Errors that abort startup with exit status -1.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            MemvizError::MapsUnavailable { .. }
                | MemvizError::NoRegions { .. }
                | MemvizError::BufferAllocation { .. }
                | MemvizError::InitialSnapshot { .. }
        )
    }

    /// The message followed by each underlying cause, colon separated
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            report.push_str(": ");
            report.push_str(&err.to_string());
            cause = err.source();
        }
        report
    }
}

pub type Result<T> = std::result::Result<T, MemvizError>;
