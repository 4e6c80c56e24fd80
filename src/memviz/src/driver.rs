//! Sampling Driver
//!
//! Runs the locate → read → diff → render → report cycle until a key press
//! (or a configured cycle limit) stops it. Failures inside a cycle are reported
//! and retried on the next cycle; only the first snapshot is allowed to fail
//! startup.

use crate::config::SamplerConfig;
use crate::display::{render_sample, DisplaySink};
use crate::error::{MemvizError, Result};
use crate::memory::{read_sample, total_length, MemoryArea, MemorySource};
use crate::sample::{detect_and_commit, scratch_buffer, SampleVector};
use crate::stats::CycleStats;

use std::io::{self, Write};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Running,
    Stopped,
}

/// What a single cycle did
#[derive(Debug)]
pub enum CycleOutcome {
    /// A key press was seen; nothing was sampled
    Stopped,
    /// Locating or reading failed; the last good snapshot is kept
    Skipped(MemvizError),
    /// A snapshot was taken and compared
    Sampled(CycleStats),
}

/// Owns the sample buffers and drives the cycle against a memory source
pub struct Sampler<S: MemorySource> {
    source: S,
    config: SamplerConfig,
    sink: Option<Box<dyn DisplaySink>>,
    current: SampleVector,
    previous: SampleVector,
    scratch: Vec<u8>,
    state: SamplerState,
    cycles: u64,
}

impl<S: MemorySource> Sampler<S> {
    /// Allocate the sampling buffers and take the first snapshot from `areas`.
    ///
    /// Fails if the buffers cannot be allocated or the first read collects
    /// nothing usable.
    pub fn start(source: S, config: SamplerConfig, areas: &[MemoryArea]) -> Result<Self> {
        config.validate()?;

        let mut scratch = scratch_buffer(config.budget)?;
        let mut current = SampleVector::zeroed(config.budget)?;

        let summary = read_sample(&source, areas, current.as_mut_slice(), &mut scratch).map_err(
            |err| MemvizError::InitialSnapshot {
                pid: source.pid(),
                source: Box::new(err),
            },
        )?;
        info!(
            pid = source.pid(),
            collected = summary.collected,
            areas = summary.areas_read,
            "initial snapshot taken"
        );

        let previous = SampleVector::try_clone(&current)?;

        Ok(Self {
            source,
            config,
            sink: None,
            current,
            previous,
            scratch,
            state: SamplerState::Running,
            cycles: 0,
        })
    }

    /// Render each cycle to `sink` and stop when it reports a key press
    pub fn attach_sink(&mut self, sink: Box<dyn DisplaySink>) {
        self.sink = Some(sink);
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cycles started so far, not counting the initial snapshot
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn current(&self) -> &[f32] {
        self.current.as_slice()
    }

    pub fn previous(&self) -> &[f32] {
        self.previous.as_slice()
    }

    /// Run one cycle, writing a statistics line to `out` if anything changed
    /// or a diagnostic line if the cycle failed
    pub fn cycle<W: Write>(&mut self, out: &mut W) -> io::Result<CycleOutcome> {
        if self.state == SamplerState::Stopped {
            return Ok(CycleOutcome::Stopped);
        }

        let started = Instant::now();

        if self.sink.as_ref().is_some_and(|sink| sink.poll_key_pressed()) {
            debug!("key pressed, stopping");
            self.state = SamplerState::Stopped;
            return Ok(CycleOutcome::Stopped);
        }

        self.cycles += 1;

        let areas = match self.source.regions() {
            Ok(areas) => areas,
            Err(err) => return self.skip(out, started, "Refreshing memory areas", err),
        };

        if let Err(err) = read_sample(
            &self.source,
            &areas,
            self.current.as_mut_slice(),
            &mut self.scratch,
        ) {
            return self.skip(out, started, "Reading process memory", err);
        }

        let changed = detect_and_commit(self.current.as_slice(), self.previous.as_mut_slice());

        if let Some(sink) = &self.sink {
            render_sample(sink.as_ref(), self.current.as_slice());
        }

        let stats = CycleStats {
            changed,
            sampled: self.current.len(),
            mapped_bytes: total_length(&areas),
            elapsed: started.elapsed(),
        };

        if changed > 0 {
            writeln!(out, "{}", stats)?;
            out.flush()?;
        }

        self.throttle(started);
        Ok(CycleOutcome::Sampled(stats))
    }

    /// Cycle until stopped, then close the sink. Returns the number of cycles run.
    pub fn run<W: Write>(&mut self, out: &mut W) -> io::Result<u64> {
        while self.state == SamplerState::Running {
            if self
                .config
                .max_cycles
                .is_some_and(|limit| self.cycles >= limit)
            {
                debug!(cycles = self.cycles, "cycle limit reached");
                self.state = SamplerState::Stopped;
                break;
            }
            self.cycle(out)?;
        }

        if let Some(sink) = &self.sink {
            sink.close();
        }
        Ok(self.cycles)
    }

    /// Report a failed cycle and keep the last good snapshot
    fn skip<W: Write>(
        &self,
        out: &mut W,
        started: Instant,
        step: &str,
        err: MemvizError,
    ) -> io::Result<CycleOutcome> {
        let report = err.report();
        warn!(error = %report, "{} failed, keeping last snapshot", step);
        writeln!(out, "{} failed: {}", step, report)?;
        out.flush()?;

        self.throttle(started);
        Ok(CycleOutcome::Skipped(err))
    }

    fn throttle(&self, started: Instant) {
        if let Some(interval) = self.config.min_cycle_interval {
            if let Some(remaining) = interval.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }
}
