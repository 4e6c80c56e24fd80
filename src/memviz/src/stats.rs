//! Per-cycle throughput statistics

use std::fmt;
use std::time::Duration;

const MIB: f64 = 1024.0 * 1024.0;

/// Counters gathered over one sampling cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStats {
    /// Cells that differed from the previous snapshot
    pub changed: usize,
    /// Size of the sample in cells
    pub sampled: usize,
    /// Bytes mapped across this cycle's areas
    pub mapped_bytes: u64,
    /// Wall-clock duration of the cycle
    pub elapsed: Duration,
}

impl CycleStats {
    pub fn percent_changed(&self) -> f64 {
        if self.sampled == 0 {
            return 0.0;
        }
        100.0 * self.changed as f64 / self.sampled as f64
    }

    /// Cycles per second if every cycle took as long as this one
    pub fn cycles_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            1.0 / secs
        } else {
            f64::INFINITY
        }
    }

    pub fn mapped_mib(&self) -> f64 {
        self.mapped_bytes as f64 / MIB
    }
}

impl fmt::Display for CycleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} changes ({:.2}%). [process mem: {:.2} MB] [sampling Hz: {:.2}]",
            self.changed,
            self.sampled,
            self.percent_changed(),
            self.mapped_mib(),
            self.cycles_per_second()
        )
    }
}
