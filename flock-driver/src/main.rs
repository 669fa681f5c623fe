use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use flock_driver::{load_settings, run, Args, RunOptions};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Flock driver starting...");

    let mut settings = load_settings(args.config.as_deref())?;
    args.apply(&mut settings);
    log::debug!("Effective settings: {:?}", settings);

    let options = RunOptions {
        realtime: args.realtime,
        log_every: args.log_every,
    };

    let mut sink: Option<Box<dyn Write>> = match args.frames.as_deref() {
        Some(path) if path.as_os_str() == "-" => Some(Box::new(BufWriter::new(io::stdout().lock()))),
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create frames file {}", path.display()))?;
            log::info!("Writing frames to {}", path.display());
            Some(Box::new(BufWriter::new(file)))
        }
        None => None,
    };

    let summary = run(&settings, &options, sink.as_deref_mut()).context("Simulation error")?;

    log::info!(
        "Finished {} ticks ({} frames): centroid ({:.1}, {:.1}), mean speed {:.2}, polarization {:.3}",
        summary.ticks,
        summary.frames_written,
        summary.centroid.x,
        summary.centroid.y,
        summary.mean_speed,
        summary.polarization
    );

    Ok(())
}
