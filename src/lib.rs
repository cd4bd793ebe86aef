//! Sensor signal simulator
//!
//! Produces a stream of synthetic waveform samples corrupted by SNR-driven
//! noise, keeps a rolling plot window, renders it to SVG and can stream the
//! values over a serial port.

pub mod config;
pub mod error;
pub mod generator;
pub mod noise;
pub mod plot;
pub mod simulation;
pub mod trace;
pub mod transport;

pub use error::SignalError;
pub use generator::{
    generate, GeneratorState, Sample, SignalGenerator, WaveformKind, WaveformParams,
};
pub use noise::{NoiseInjector, NoiseKind, NoiseParams};
pub use simulation::{Simulation, SimulationConfig};
