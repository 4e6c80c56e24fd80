mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use memviz::memory::{self, total_length};
use memviz::{Config, MemorySource, MemvizError, Sampler, TargetProcess};
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

/// Exit status for startup failures the sampler cannot recover from
const EXIT_STARTUP_FATAL: i32 = -1;
const EXIT_FAILURE: i32 = 1;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(&cli) {
        println!("ERROR: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    let fatal = err.chain().any(|cause| {
        cause
            .downcast_ref::<MemvizError>()
            .is_some_and(MemvizError::is_startup_fatal)
    });
    if fatal {
        EXIT_STARTUP_FATAL
    } else {
        EXIT_FAILURE
    }
}

fn run(cli: &Cli) -> Result<()> {
    println!("Memory Visualizer");

    let file_config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let pid = match &cli.name {
        Some(name) => memory::find_process_by_name(name)?,
        None => memory::resolve_pid(cli.pid),
    };

    let mut config = file_config.sampler_config();
    cli.apply_overrides(&mut config);
    config.validate()?;

    let process = TargetProcess::new(pid);
    let areas = process
        .regions()
        .with_context(|| format!("Cannot get pid {} memory mappings", pid))?;

    for area in &areas {
        println!("Memory Area: {}", area);
    }

    let mapped = total_length(&areas) as f64;
    println!(
        "Sampling {:.2} MB per cycle from {:.2} MB mapped ({:.2}% coverage)",
        config.budget as f64 / (1024.0 * 1024.0),
        mapped / (1024.0 * 1024.0),
        100.0 * mapped.min(config.budget as f64) / mapped.max(1.0)
    );
    std::io::stdout().flush()?;

    let gui = config.gui;
    let mut sampler =
        Sampler::start(process, config, &areas).context("Cannot read process memory")?;

    if gui {
        attach_window(&mut sampler, pid);
    }

    let mut stdout = std::io::stdout().lock();
    let cycles = sampler.run(&mut stdout)?;
    info!(cycles, "sampling stopped");

    Ok(())
}

#[cfg(feature = "gui")]
fn attach_window<S: MemorySource>(sampler: &mut Sampler<S>, pid: u32) {
    use memviz::display::WindowSink;
    use memviz::DisplaySink;

    let window = WindowSink::new(format!("PID {} memory visualization.", pid));
    if window.open() {
        sampler.attach_sink(Box::new(window));
    } else {
        warn!("could not open window, continuing headless");
    }
}

#[cfg(not(feature = "gui"))]
fn attach_window<S: MemorySource>(_sampler: &mut Sampler<S>, _pid: u32) {
    warn!("built without the gui feature, continuing headless");
}
