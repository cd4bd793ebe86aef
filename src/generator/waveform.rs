use super::fourier::FourierParams;
use log::warn;
use std::f64::consts::PI;

/// Shape of the synthesized signal
///
/// `Silent` is the explicit fallback for waveform names this crate does not
/// know. It evaluates to 0.0 instead of failing, so a bad name degrades to a
/// flat line rather than stopping the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum WaveformKind {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    /// Fourier series built from cosine and sine coefficient lists
    Custom(FourierParams),
    /// Unsupported kind, always 0.0
    Silent,
}

impl WaveformKind {
    /// Resolve a waveform name as typed by a user
    ///
    /// Matching is case-insensitive. `"custom"` uses the given coefficients.
    /// Unknown names resolve to `Silent` with a warning.
    pub fn from_name(name: &str, fourier: FourierParams) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sine" | "sin" => WaveformKind::Sine,
            "square" => WaveformKind::Square,
            "sawtooth" | "saw" => WaveformKind::Sawtooth,
            "triangle" => WaveformKind::Triangle,
            "custom" | "fourier" => WaveformKind::Custom(fourier),
            other => {
                warn!("Unsupported waveform '{}', output will be 0.0", other);
                WaveformKind::Silent
            }
        }
    }

    /// Display name, the inverse of `from_name` for the supported kinds
    pub fn name(&self) -> &'static str {
        match self {
            WaveformKind::Sine => "Sine",
            WaveformKind::Square => "Square",
            WaveformKind::Sawtooth => "Sawtooth",
            WaveformKind::Triangle => "Triangle",
            WaveformKind::Custom(_) => "Custom",
            WaveformKind::Silent => "Silent",
        }
    }

    /// Evaluate the noiseless waveform at time `t` (seconds)
    ///
    /// Custom synthesis ignores `amplitude`; the coefficients carry the scale.
    pub fn evaluate(&self, frequency_hz: f64, amplitude: f64, t: f64) -> f64 {
        let phase = 2.0 * PI * frequency_hz * t;
        match self {
            WaveformKind::Sine => amplitude * phase.sin(),
            WaveformKind::Square => {
                if phase.sin() >= 0.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
            WaveformKind::Sawtooth => {
                let cycles = frequency_hz * t;
                2.0 * amplitude * (cycles - (0.5 + cycles).floor())
            }
            WaveformKind::Triangle => (2.0 * amplitude / PI) * phase.sin().asin(),
            WaveformKind::Custom(fourier) => fourier.synthesize(frequency_hz, t),
            WaveformKind::Silent => 0.0,
        }
    }
}
