use crate::error::SignalError;
use std::f64::consts::PI;

/// Cosine coefficients used when none are configured
pub const DEFAULT_COSINE_COEFFS: [f64; 3] = [0.0, 0.0, 0.0];
/// Sine coefficients used when none are configured (fundamental, 3rd-ish, 5th-ish)
pub const DEFAULT_SINE_COEFFS: [f64; 3] = [1.0, 0.33, 0.2];

/// Coefficients of a custom Fourier series
///
/// The two lists are sized independently:
/// - `cosine_coeffs[k]` weights `cos(2π·k·f·t)`, so `cosine_coeffs[0]` is the DC offset
/// - `sine_coeffs[k]` weights `sin(2π·(k+1)·f·t)`, so `sine_coeffs[0]` is the fundamental
///
/// A sine term at harmonic 0 is identically zero, so the sine list starts at
/// the first harmonic.
#[derive(Debug, Clone, PartialEq)]
pub struct FourierParams {
    pub cosine_coeffs: Vec<f64>,
    pub sine_coeffs: Vec<f64>,
}

impl Default for FourierParams {
    fn default() -> Self {
        Self {
            cosine_coeffs: DEFAULT_COSINE_COEFFS.to_vec(),
            sine_coeffs: DEFAULT_SINE_COEFFS.to_vec(),
        }
    }
}

impl FourierParams {
    pub fn new(cosine_coeffs: Vec<f64>, sine_coeffs: Vec<f64>) -> Self {
        Self {
            cosine_coeffs,
            sine_coeffs,
        }
    }

    /// Sum both series at time `t` for fundamental frequency `frequency_hz`
    ///
    /// raw = Σ a[k]·cos(2π·k·f·t) + Σ b[k]·sin(2π·(k+1)·f·t)
    pub fn synthesize(&self, frequency_hz: f64, t: f64) -> f64 {
        let base = 2.0 * PI * frequency_hz * t;

        let cosines: f64 = self
            .cosine_coeffs
            .iter()
            .enumerate()
            .map(|(k, a)| a * (k as f64 * base).cos())
            .sum();

        let sines: f64 = self
            .sine_coeffs
            .iter()
            .enumerate()
            .map(|(k, b)| b * ((k + 1) as f64 * base).sin())
            .sum();

        cosines + sines
    }
}

/// Parse comma-separated coefficients (e.g. "1, 0.33, 0.2")
///
/// Whitespace around each entry is ignored. Any non-numeric or non-finite
/// entry (`nan`, `inf`), or an input with no entries at all, is rejected.
pub fn parse_coefficients(field: &str, text: &str) -> Result<Vec<f64>, SignalError> {
    if text.trim().is_empty() {
        return Err(SignalError::EmptyCoefficients);
    }

    text.split(',')
        .map(str::trim)
        .map(|entry| {
            entry
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SignalError::InvalidNumericInput {
                    field: field.to_string(),
                    value: entry.to_string(),
                })
        })
        .collect()
}
