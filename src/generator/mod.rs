pub mod fourier;
pub mod waveform;

pub use fourier::{parse_coefficients, FourierParams};
pub use waveform::WaveformKind;

use crate::error::SignalError;

/// One generated point: time in seconds and signal value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub t: f64,
    pub value: f64,
}

/// Sample counter of a generator
///
/// Simulated time is derived from it (`t = sample_index / sample_rate_hz`).
/// The counter only moves through `advance` and `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneratorState {
    sample_index: u64,
}

impl GeneratorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State positioned at an arbitrary index, e.g. to resume a stream
    pub fn at(sample_index: u64) -> Self {
        Self { sample_index }
    }

    pub fn sample_index(&self) -> u64 {
        self.sample_index
    }

    /// State for the next sample
    pub fn advance(self) -> Self {
        Self {
            sample_index: self.sample_index + 1,
        }
    }

    /// State for a fresh stream starting at t = 0
    pub fn reset(self) -> Self {
        Self::default()
    }
}

/// Parameters of the waveform to synthesize
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformParams {
    pub kind: WaveformKind,
    pub frequency_hz: f64,
    pub amplitude: f64,
    /// Must be > 0, time is computed by dividing by it
    pub sample_rate_hz: f64,
}

impl Default for WaveformParams {
    fn default() -> Self {
        Self {
            kind: WaveformKind::Sine,
            frequency_hz: 10.0,
            amplitude: 1.0,
            sample_rate_hz: 1000.0,
        }
    }
}

/// Reject sample rates that would make `t` infinite or NaN
pub fn check_sample_rate(sample_rate_hz: f64) -> Result<(), SignalError> {
    if sample_rate_hz > 0.0 && sample_rate_hz.is_finite() {
        Ok(())
    } else {
        Err(SignalError::InvalidRate(sample_rate_hz))
    }
}

/// Generate the noiseless sample at `state` and return it with the advanced state
///
/// The time stamp uses the index before incrementing, so the first sample of
/// a stream is always at t = 0. On an invalid sample rate nothing is produced
/// and the caller keeps its current state.
///
/// # Example
/// ```
/// use sigsim::generator::{generate, GeneratorState, WaveformParams};
///
/// let params = WaveformParams::default();
/// let (first, state) = generate(GeneratorState::new(), &params).unwrap();
/// assert_eq!(first.t, 0.0);
/// assert_eq!(state.sample_index(), 1);
/// ```
pub fn generate(
    state: GeneratorState,
    params: &WaveformParams,
) -> Result<(Sample, GeneratorState), SignalError> {
    check_sample_rate(params.sample_rate_hz)?;

    let t = state.sample_index as f64 / params.sample_rate_hz;
    let value = params
        .kind
        .evaluate(params.frequency_hz, params.amplitude, t);

    Ok((Sample { t, value }, state.advance()))
}

/// Core trait for sample sources
///
/// Sources produce one sample per call and can be rewound to t = 0.
pub trait SignalGenerator {
    /// Produce the next sample
    fn next_sample(&mut self) -> Result<Sample, SignalError>;

    /// Fill `buffer` with consecutive samples
    ///
    /// Stops at the first error; samples written before it stay valid.
    fn process(&mut self, buffer: &mut [Sample]) -> Result<(), SignalError> {
        for slot in buffer.iter_mut() {
            *slot = self.next_sample()?;
        }
        Ok(())
    }

    /// Rewind to the start of the stream
    fn reset(&mut self);
}

/// Noiseless generator that owns its parameters and counter
#[derive(Debug, Clone)]
pub struct Oscillator {
    params: WaveformParams,
    state: GeneratorState,
}

impl Oscillator {
    pub fn new(params: WaveformParams) -> Self {
        Self {
            params,
            state: GeneratorState::new(),
        }
    }

    pub fn params(&self) -> &WaveformParams {
        &self.params
    }

    /// Replace the parameters, keeping the sample counter
    pub fn set_params(&mut self, params: WaveformParams) {
        self.params = params;
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }
}

impl SignalGenerator for Oscillator {
    fn next_sample(&mut self) -> Result<Sample, SignalError> {
        let (sample, next) = generate(self.state, &self.params)?;
        self.state = next;
        Ok(sample)
    }

    fn reset(&mut self) {
        self.state = self.state.reset();
    }
}
