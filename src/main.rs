//! Sensor signal simulator
//!
//! Ticks the simulation in real time, keeps an SVG plot of the latest window
//! up to date and optionally streams each value to a serial port.
//!
//! Usage: sigsim [--config sigsim.yaml] [--waveform Square] [--serial-port /dev/pts/3] ...

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use sigsim::config::{Config, ConfigOverrides};
use sigsim::generator::parse_coefficients;
use sigsim::plot::PlotSink;
use sigsim::simulation::{run, RunLimits};
use sigsim::transport::{open_serial, SampleSink};
use sigsim::Simulation;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

/// Live waveform simulator with SNR-controlled noise
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file (created with defaults if missing)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Waveform: Sine, Square, Sawtooth, Triangle or Custom
    #[arg(short, long)]
    waveform: Option<String>,

    /// Frequency in Hz
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Amplitude in volts
    #[arg(short, long)]
    amplitude: Option<f64>,

    /// Sample rate in Hz
    #[arg(short, long)]
    sample_rate: Option<f64>,

    /// Noise: "Gaussian White", "Pink Noise", "Brownian" or "None"
    #[arg(short, long)]
    noise: Option<String>,

    /// Signal-to-noise ratio in dB
    #[arg(long)]
    snr: Option<f64>,

    /// Cosine coefficients for Custom, comma separated (e.g. "0, 0, 0")
    #[arg(long)]
    cosine: Option<String>,

    /// Sine coefficients for Custom, comma separated (e.g. "1, 0.33, 0.2")
    #[arg(long)]
    sine: Option<String>,

    /// Serial device to stream values to (e.g. /dev/pts/2 or COM3)
    #[arg(long)]
    serial_port: Option<String>,

    /// Serial baud rate (9600, 115200, 230400 or 921600)
    #[arg(short, long)]
    baud: Option<u32>,

    /// Stop after this many samples (runs until Ctrl-C otherwise)
    #[arg(long)]
    samples: Option<u64>,

    /// SVG file for the plot window
    #[arg(short, long)]
    plot: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Result<ConfigOverrides> {
        let cosine_coeffs = self
            .cosine
            .as_deref()
            .map(|text| parse_coefficients("cosine", text))
            .transpose()
            .context("Invalid --cosine coefficients")?;
        let sine_coeffs = self
            .sine
            .as_deref()
            .map(|text| parse_coefficients("sine", text))
            .transpose()
            .context("Invalid --sine coefficients")?;

        Ok(ConfigOverrides {
            waveform: self.waveform.clone(),
            frequency: self.frequency,
            amplitude: self.amplitude,
            sample_rate: self.sample_rate,
            cosine_coeffs,
            sine_coeffs,
            noise: self.noise.clone(),
            snr_db: self.snr,
            serial_port: self.serial_port.clone(),
            baud_rate: self.baud,
            plot_output: self.plot.clone(),
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_args(&args.overrides()?);
    config.validate()?;

    let sim_config = config.simulation_config();
    let title = format!(
        "{} {} Hz, {} V, {} noise @ {} dB",
        sim_config.waveform.kind.name(),
        sim_config.waveform.frequency_hz,
        sim_config.waveform.amplitude,
        sim_config.noise.kind.name(),
        sim_config.noise.snr_db
    );
    info!("{}", title);

    let mut sim = Simulation::new(sim_config);

    let limits = RunLimits {
        max_samples: args.samples,
        ..Default::default()
    };
    let stop = limits.stop.clone();
    ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))
        .context("Failed to install Ctrl-C handler")?;

    let mut plot = PlotSink::new(
        &config.plot.output,
        &title,
        config.plot.window,
        config.plot.refresh_every,
    );

    // A port that fails to open is reported, the simulation runs without it
    let mut serial = if config.serial.enabled {
        match open_serial(&config.serial.port, config.serial.baud_rate) {
            Ok(streamer) => Some(streamer),
            Err(e) => {
                error!("Failed to connect to {}: {}", config.serial.port, e);
                None
            }
        }
    } else {
        None
    };

    let produced = {
        let mut sinks: Vec<&mut dyn SampleSink> = Vec::new();
        sinks.push(&mut plot);
        if let Some(streamer) = serial.as_mut() {
            sinks.push(streamer);
        }
        run(&mut sim, &mut sinks, &limits)?
    };

    plot.flush()
        .with_context(|| format!("Failed to write plot to {:?}", plot.path()))?;

    println!("Generated {} samples", produced);
    println!("Plot: {}", plot.path().display());
    if let Some(streamer) = &serial {
        println!(
            "Serial: {} lines sent, {} dropped",
            streamer.sent(),
            streamer.dropped()
        );
    }

    Ok(())
}
