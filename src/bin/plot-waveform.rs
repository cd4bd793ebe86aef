//! Offline plot of a waveform
//!
//! Generates a fixed number of samples as fast as possible (no timer) and
//! writes them to an SVG file, reporting the largest jump between samples.

use anyhow::{Context, Result};
use clap::Parser;
use sigsim::config::{Config, ConfigOverrides};
use sigsim::generator::{parse_coefficients, Sample, SignalGenerator};
use sigsim::noise::NoiseInjector;
use sigsim::plot::render_svg;
use sigsim::Simulation;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Render N samples of a waveform to SVG", long_about = None)]
struct Args {
    /// Output file path (.svg)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Waveform: Sine, Square, Sawtooth, Triangle or Custom
    #[arg(short, long, default_value = "Sine")]
    waveform: String,

    /// Frequency in Hz
    #[arg(short, long, default_value_t = 10.0)]
    frequency: f64,

    /// Amplitude in volts
    #[arg(short, long, default_value_t = 1.0)]
    amplitude: f64,

    /// Sample rate in Hz
    #[arg(short, long, default_value_t = 1000.0)]
    sample_rate: f64,

    /// Noise: "Gaussian White", "Pink Noise", "Brownian" or "None"
    #[arg(short, long, default_value = "None")]
    noise: String,

    /// Signal-to-noise ratio in dB
    #[arg(long, default_value_t = 20.0)]
    snr: f64,

    /// Cosine coefficients for Custom
    #[arg(long, default_value = "0, 0, 0")]
    cosine: String,

    /// Sine coefficients for Custom
    #[arg(long, default_value = "1, 0.33, 0.2")]
    sine: String,

    /// Number of samples to render
    #[arg(long, default_value_t = 1000)]
    samples: usize,

    /// Seed for the noise source, for reproducible plots
    #[arg(long)]
    seed: Option<u64>,
}

/// Largest absolute difference between consecutive samples and its index
fn max_jump(samples: &[Sample]) -> Option<(usize, f64)> {
    samples
        .windows(2)
        .enumerate()
        .map(|(i, w)| (i + 1, (w[1].value - w[0].value).abs()))
        .fold(None, |best, (i, diff)| match best {
            Some((_, d)) if d >= diff => best,
            _ => Some((i, diff)),
        })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = Config::default();
    config.apply_args(&ConfigOverrides {
        waveform: Some(args.waveform.clone()),
        frequency: Some(args.frequency),
        amplitude: Some(args.amplitude),
        sample_rate: Some(args.sample_rate),
        cosine_coeffs: Some(parse_coefficients("cosine", &args.cosine)?),
        sine_coeffs: Some(parse_coefficients("sine", &args.sine)?),
        noise: Some(args.noise.clone()),
        snr_db: Some(args.snr),
        ..Default::default()
    });
    config.validate()?;

    let sim_config = config.simulation_config();
    let title = format!(
        "{}: f={} Hz, A={}, fs={} Hz, {} noise",
        sim_config.waveform.kind.name(),
        args.frequency,
        args.amplitude,
        args.sample_rate,
        sim_config.noise.kind.name()
    );

    println!("Waveform Plot Generator");
    println!("=======================");
    println!("  {}", title);
    println!("  Samples: {}", args.samples);
    println!();

    let injector = match args.seed {
        Some(seed) => NoiseInjector::seeded(seed),
        None => NoiseInjector::new(),
    };
    let mut sim = Simulation::with_injector(sim_config, injector);

    let mut samples = vec![Sample::default(); args.samples];
    sim.process(&mut samples)?;

    if let Some((idx, diff)) = max_jump(&samples) {
        println!(
            "  Max jump: {:.6} at sample {} (t={:.4}s)",
            diff, idx, samples[idx].t
        );
    }

    print!("  Creating plot... ");
    render_svg(&args.output, &samples, &title)
        .with_context(|| format!("Failed to write {:?}", args.output))?;
    println!("done");

    println!();
    println!("Output: {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Sample {
                t: i as f64,
                value,
            })
            .collect()
    }

    #[test]
    fn test_max_jump_finds_largest_step() {
        let (idx, diff) = max_jump(&at(&[0.0, 0.1, 0.2, -0.8, -0.7])).unwrap();
        assert_eq!(idx, 3);
        assert!((diff - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_jump_needs_two_samples() {
        assert_eq!(max_jump(&at(&[1.0])), None);
        assert_eq!(max_jump(&[]), None);
    }
}
