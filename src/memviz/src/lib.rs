//! # memviz
//!
//! Live change tracking for the writable memory of a running process.
//!
//! This library provides functionality to:
//! - Locate heap, stack and anonymous mappings from /proc/pid/maps
//! - Copy a fixed-size sample of those mappings out of another process
//! - Count the bytes that changed since the previous sample
//! - Paint each sample as a grayscale pixel grid
//!
//! ## Example
//!
//! ```no_run
//! use memviz::{MemorySource, Sampler, SamplerConfig, TargetProcess};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let process = TargetProcess::new(1234);
//! let areas = process.regions()?;
//!
//! let config = SamplerConfig::new().with_max_cycles(10);
//! let mut sampler = Sampler::start(process, config, &areas)?;
//! sampler.run(&mut std::io::stdout())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod memory;
pub mod sample;
pub mod stats;

pub use config::{Config, SamplerConfig, DEFAULT_BUDGET};
pub use display::{render_sample, DisplaySink};
pub use driver::{CycleOutcome, Sampler, SamplerState};
pub use error::{MemvizError, Result};
pub use memory::{MemoryArea, MemorySource, TargetProcess};
pub use sample::{detect_and_commit, SampleVector};
pub use stats::CycleStats;
