//! Error types for the signal core and its sinks

use thiserror::Error;

/// Errors raised by sample generation and the surrounding I/O
#[derive(Debug, Error)]
pub enum SignalError {
    /// Sample rate was zero, negative or not finite
    #[error("invalid sample rate: {0} Hz (must be > 0)")]
    InvalidRate(f64),

    /// A numeric field could not be parsed
    #[error("invalid numeric input for {field}: {value:?}")]
    InvalidNumericInput { field: String, value: String },

    /// A coefficient list had no entries
    #[error("coefficient list is empty")]
    EmptyCoefficients,

    /// Opening a transport failed
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Rendering the plot failed
    #[error("plot error: {0}")]
    Plot(String),
}

impl From<serialport::Error> for SignalError {
    fn from(err: serialport::Error) -> Self {
        SignalError::Transport(err.into())
    }
}
