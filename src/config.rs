//! Configuration of the simulator
//!
//! Settings live in a YAML file organised in sections:
//! - `signal`: waveform, frequency, amplitude, sample rate, Fourier coefficients
//! - `noise`: noise type and SNR
//! - `serial`: optional streaming port
//! - `plot`: SVG output and window size
//!
//! Missing sections and fields fall back to their defaults.
//! Command line values are layered on top with [`Config::apply_args`].
//!
//! ```no_run
//! use sigsim::config::{Config, ConfigOverrides};
//!
//! let mut config = Config::from_file("sigsim.yaml").unwrap();
//! config.apply_args(&ConfigOverrides {
//!     frequency: Some(50.0),
//!     ..Default::default()
//! });
//! config.validate().unwrap();
//! let sim_config = config.simulation_config();
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::generator::fourier::{DEFAULT_COSINE_COEFFS, DEFAULT_SINE_COEFFS};
use crate::generator::{check_sample_rate, FourierParams, WaveformKind, WaveformParams};
use crate::noise::{NoiseKind, NoiseParams};
use crate::simulation::SimulationConfig;
use crate::trace::DEFAULT_WINDOW;
use crate::transport::{BAUD_RATES, DEFAULT_BAUD_RATE};

/// Waveform settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Sine, Square, Sawtooth, Triangle or Custom
    pub waveform: String,
    /// Fundamental frequency in Hz
    pub frequency: f64,
    /// Amplitude in volts, also the reference for the SNR
    pub amplitude: f64,
    /// Sample rate in Hz, sets both simulated time and the timer period
    pub sample_rate: f64,
    /// Cosine coefficients for the Custom waveform (a[0] is the DC offset)
    pub cosine_coeffs: Vec<f64>,
    /// Sine coefficients for the Custom waveform (b[0] is the fundamental)
    pub sine_coeffs: Vec<f64>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            waveform: "Sine".to_string(),
            frequency: 10.0,
            amplitude: 1.0,
            sample_rate: 1000.0,
            cosine_coeffs: DEFAULT_COSINE_COEFFS.to_vec(),
            sine_coeffs: DEFAULT_SINE_COEFFS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// "Gaussian White", "Pink Noise", "Brownian" or "None"
    pub kind: String,
    pub snr_db: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            kind: NoiseKind::GaussianWhite.name().to_string(),
            snr_db: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub enabled: bool,
    /// Device path, e.g. /dev/pts/2 or COM3
    pub port: String,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: "/dev/pts/".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// SVG file rewritten while the simulation runs
    pub output: PathBuf,
    /// Samples kept in the plot window
    pub window: usize,
    /// Samples between two refreshes of the SVG file
    pub refresh_every: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("signal.svg"),
            window: DEFAULT_WINDOW,
            refresh_every: 100,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub plot: PlotConfig,
}

/// Values given on the command line, each one replacing its config field
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub waveform: Option<String>,
    pub frequency: Option<f64>,
    pub amplitude: Option<f64>,
    pub sample_rate: Option<f64>,
    pub cosine_coeffs: Option<Vec<f64>>,
    pub sine_coeffs: Option<Vec<f64>>,
    pub noise: Option<String>,
    pub snr_db: Option<f64>,
    pub serial_port: Option<String>,
    pub baud_rate: Option<u32>,
    pub plot_output: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file
    ///
    /// A missing file is created with the default configuration.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        let config: Config = serde_yml::from_str(&contents).map_err(|err| {
            error!("Configuration deserialization error: {}", err);
            anyhow::anyhow!(
                "Failed to deserialize configuration from {}: {}",
                path.display(),
                err
            )
        })?;

        if let Err(err) = config.validate() {
            error!("Configuration validation error: {}", err);
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Check values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        check_sample_rate(self.signal.sample_rate)
            .context("signal.sample_rate must be a positive number")?;

        if !self.signal.frequency.is_finite() || !self.signal.amplitude.is_finite() {
            bail!("signal.frequency and signal.amplitude must be finite numbers");
        }
        let mut coeffs = self.signal.cosine_coeffs.iter().chain(&self.signal.sine_coeffs);
        if coeffs.any(|c| !c.is_finite()) {
            bail!("signal.cosine_coeffs and signal.sine_coeffs must be finite numbers");
        }
        if !self.noise.snr_db.is_finite() {
            bail!("noise.snr_db must be a finite number");
        }
        if !BAUD_RATES.contains(&self.serial.baud_rate) {
            bail!(
                "serial.baud_rate {} is not one of {:?}",
                self.serial.baud_rate,
                BAUD_RATES
            );
        }
        if self.plot.window == 0 {
            bail!("plot.window must be at least 1");
        }
        Ok(())
    }

    /// Override configuration values with command line arguments
    ///
    /// Giving a serial port enables streaming.
    pub fn apply_args(&mut self, args: &ConfigOverrides) {
        if let Some(waveform) = &args.waveform {
            self.signal.waveform = waveform.clone();
        }
        if let Some(frequency) = args.frequency {
            self.signal.frequency = frequency;
        }
        if let Some(amplitude) = args.amplitude {
            self.signal.amplitude = amplitude;
        }
        if let Some(sample_rate) = args.sample_rate {
            self.signal.sample_rate = sample_rate;
        }
        if let Some(coeffs) = &args.cosine_coeffs {
            self.signal.cosine_coeffs = coeffs.clone();
        }
        if let Some(coeffs) = &args.sine_coeffs {
            self.signal.sine_coeffs = coeffs.clone();
        }
        if let Some(noise) = &args.noise {
            self.noise.kind = noise.clone();
        }
        if let Some(snr_db) = args.snr_db {
            self.noise.snr_db = snr_db;
        }
        if let Some(port) = &args.serial_port {
            self.serial.port = port.clone();
            self.serial.enabled = true;
        }
        if let Some(baud_rate) = args.baud_rate {
            self.serial.baud_rate = baud_rate;
        }
        if let Some(output) = &args.plot_output {
            self.plot.output = output.clone();
        }
    }

    /// Resolve names into the typed parameters of a simulation
    pub fn simulation_config(&self) -> SimulationConfig {
        let fourier = FourierParams::new(
            self.signal.cosine_coeffs.clone(),
            self.signal.sine_coeffs.clone(),
        );

        SimulationConfig {
            waveform: WaveformParams {
                kind: WaveformKind::from_name(&self.signal.waveform, fourier),
                frequency_hz: self.signal.frequency,
                amplitude: self.signal.amplitude,
                sample_rate_hz: self.signal.sample_rate,
            },
            noise: NoiseParams {
                kind: NoiseKind::from_name(&self.noise.kind),
                snr_db: self.noise.snr_db,
            },
            window: self.plot.window,
        }
    }
}
