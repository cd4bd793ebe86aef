//! Noise injection driven by a signal-to-noise ratio
//!
//! The noise level is derived from the target amplitude, assuming the power
//! of a sinusoid of that amplitude (A²/2) regardless of the actual waveform:
//!
//! ```text
//! snr_linear  = 10^(snr_db / 10)
//! noise_power = (A² / 2) / snr_linear
//! noise_std   = sqrt(noise_power)
//! ```
//!
//! Gaussian and pink noise are memoryless. Brownian noise integrates its
//! increments in a [`BrownianState`] that lives as long as the injector.

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Scale applied to white noise to stand in for pink noise
pub const PINK_SCALE: f64 = 0.7;
/// Ratio of a Brownian increment's std to the white-noise std
pub const BROWNIAN_STEP_SCALE: f64 = 0.1;

/// Kind of noise added to the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseKind {
    GaussianWhite,
    /// White noise scaled by [`PINK_SCALE`]; uncorrelated, not a 1/f filter
    Pink,
    /// Random walk of Gaussian increments, unbounded
    Brownian,
    None,
}

impl NoiseKind {
    /// Resolve a noise name as typed by a user
    ///
    /// Accepts both short names ("gaussian", "pink", "brownian", "none") and
    /// the long labels ("Gaussian White", "Pink Noise"). Unknown names
    /// resolve to `None` with a warning.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "gaussian white" | "gaussian" | "white" => NoiseKind::GaussianWhite,
            "pink noise" | "pink" => NoiseKind::Pink,
            "brownian" | "brown" => NoiseKind::Brownian,
            "none" | "off" => NoiseKind::None,
            other => {
                warn!("Unsupported noise type '{}', no noise will be added", other);
                NoiseKind::None
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoiseKind::GaussianWhite => "Gaussian White",
            NoiseKind::Pink => "Pink Noise",
            NoiseKind::Brownian => "Brownian",
            NoiseKind::None => "None",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    pub kind: NoiseKind,
    pub snr_db: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            kind: NoiseKind::GaussianWhite,
            snr_db: 20.0,
        }
    }
}

/// Integrator of the Brownian random walk
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrownianState {
    pub accumulator: f64,
}

/// Standard deviation of the noise for a signal of `amplitude` at `snr_db`
///
/// Not clamped: very negative SNR values give very large deviations.
pub fn noise_std(amplitude: f64, snr_db: f64) -> f64 {
    let snr_linear = 10f64.powf(snr_db / 10.0);
    let signal_power = amplitude * amplitude / 2.0;
    let noise_power = signal_power / snr_linear;
    noise_power.sqrt()
}

/// Adds noise to raw samples
///
/// Generic over the random source so tests can use a seeded generator.
#[derive(Debug, Clone)]
pub struct NoiseInjector<R: Rng = StdRng> {
    rng: R,
    brownian: BrownianState,
}

impl NoiseInjector<StdRng> {
    /// Injector seeded from the operating system
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Injector with a reproducible sequence
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for NoiseInjector<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> NoiseInjector<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            brownian: BrownianState::default(),
        }
    }

    pub fn brownian(&self) -> BrownianState {
        self.brownian
    }

    /// Zero the Brownian integrator
    pub fn reset(&mut self) {
        self.brownian = BrownianState::default();
    }

    /// One draw from Normal(0, std)
    fn gaussian(&mut self, std: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        z * std
    }

    /// Return `raw` plus noise of the requested kind
    ///
    /// `amplitude` is the nominal signal amplitude used as the power
    /// reference. Only `Brownian` mutates state.
    pub fn inject(&mut self, raw: f64, amplitude: f64, params: &NoiseParams) -> f64 {
        let std = noise_std(amplitude, params.snr_db);

        let noise = match params.kind {
            NoiseKind::GaussianWhite => self.gaussian(std),
            NoiseKind::Pink => self.gaussian(std) * PINK_SCALE,
            NoiseKind::Brownian => {
                let step = self.gaussian(std * BROWNIAN_STEP_SCALE);
                self.brownian.accumulator += step;
                self.brownian.accumulator
            }
            NoiseKind::None => 0.0,
        };

        raw + noise
    }
}
