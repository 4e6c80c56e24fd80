//! CLI argument definitions for memviz

use clap::Parser;
use memviz::SamplerConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "memviz")]
#[command(about = "Watch a process's heap, stack and anonymous memory change", long_about = None)]
pub struct Cli {
    /// Process ID to sample (defaults to memviz itself)
    #[arg(allow_negative_numbers = true)]
    pub pid: Option<i32>,

    /// Show the sampled memory in a window
    #[arg(long)]
    pub gui: bool,

    /// Sample the process with this name instead of a PID
    #[arg(short, long, conflicts_with = "pid")]
    pub name: Option<String>,

    /// Bytes to sample per cycle
    #[arg(short, long)]
    pub budget: Option<usize>,

    /// Stop after this many cycles
    #[arg(short, long)]
    pub cycles: Option<u64>,

    /// Minimum time between cycles in milliseconds
    #[arg(long = "interval-ms")]
    pub interval_ms: Option<u64>,

    /// Config file to use instead of the default location
    #[arg(long, env = "MEMVIZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Let explicit flags win over file settings
    pub fn apply_overrides(&self, config: &mut SamplerConfig) {
        if let Some(budget) = self.budget {
            config.budget = budget;
        }
        if self.gui {
            config.gui = true;
        }
        if let Some(cycles) = self.cycles {
            config.max_cycles = Some(cycles);
        }
        if let Some(ms) = self.interval_ms {
            config.min_cycle_interval = (ms > 0).then(|| Duration::from_millis(ms));
        }
    }

    /// Default tracing filter for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "memviz=warn",
            1 => "memviz=info",
            _ => "memviz=debug",
        }
    }
}
