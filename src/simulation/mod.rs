//! Simulation context and its periodic driver
//!
//! - Simulation: one generator counter, one noise injector, one plot window
//! - Driver: timer loop that ticks the simulation and feeds sinks

pub mod driver;

pub use driver::{run, tick_interval, RunLimits};

use crate::error::SignalError;
use crate::generator::{generate, GeneratorState, Sample, SignalGenerator, WaveformParams};
use crate::noise::{NoiseInjector, NoiseParams};
use crate::trace::{TraceBuffer, DEFAULT_WINDOW};
use log::info;
use rand::rngs::StdRng;
use rand::Rng;

/// Configuration of a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub waveform: WaveformParams,
    pub noise: NoiseParams,
    /// Number of samples kept in the plot window
    pub window: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            waveform: WaveformParams::default(),
            noise: NoiseParams::default(),
            window: DEFAULT_WINDOW,
        }
    }
}

/// A single simulation context
///
/// Reset policy: [`Simulation::reset`] clears the sample counter, the
/// Brownian integrator and the plot window, and stops the simulation.
/// Stopping alone keeps all of them, so a restart continues the stream.
pub struct Simulation<R: Rng = StdRng> {
    waveform: WaveformParams,
    noise: NoiseParams,
    state: GeneratorState,
    injector: NoiseInjector<R>,
    trace: TraceBuffer,
    running: bool,
}

impl Simulation<StdRng> {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_injector(config, NoiseInjector::new())
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_injector(config: SimulationConfig, injector: NoiseInjector<R>) -> Self {
        Self {
            waveform: config.waveform,
            noise: config.noise,
            state: GeneratorState::new(),
            injector,
            trace: TraceBuffer::new(config.window),
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            info!(
                "Simulation started at sample {} ({} {} Hz, {} noise)",
                self.state.sample_index(),
                self.waveform.kind.name(),
                self.waveform.frequency_hz,
                self.noise.kind.name()
            );
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("Simulation stopped at sample {}", self.state.sample_index());
        }
        self.running = false;
    }

    /// Flip between running and stopped, returning the new running flag
    pub fn toggle(&mut self) -> bool {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
        self.running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    pub fn injector(&self) -> &NoiseInjector<R> {
        &self.injector
    }

    pub fn waveform(&self) -> &WaveformParams {
        &self.waveform
    }

    pub fn noise(&self) -> &NoiseParams {
        &self.noise
    }

    /// Change the waveform between ticks; the stream position is kept
    pub fn set_waveform(&mut self, waveform: WaveformParams) {
        self.waveform = waveform;
    }

    pub fn set_noise(&mut self, noise: NoiseParams) {
        self.noise = noise;
    }

    /// Produce one noisy sample and record it in the plot window
    ///
    /// On error nothing is recorded and no state changes.
    fn step(&mut self) -> Result<Sample, SignalError> {
        let (raw, next) = generate(self.state, &self.waveform)?;
        let value = self
            .injector
            .inject(raw.value, self.waveform.amplitude, &self.noise);

        self.state = next;
        let sample = Sample { t: raw.t, value };
        self.trace.push(sample);
        Ok(sample)
    }

    /// One timer tick
    ///
    /// Returns `Ok(None)` while stopped. A tick that fails (bad sample rate)
    /// leaves the counter, the noise state and the window untouched.
    pub fn tick(&mut self) -> Result<Option<Sample>, SignalError> {
        if !self.running {
            return Ok(None);
        }
        self.step().map(Some)
    }

    /// Clear the stream: counter, Brownian integrator and plot window
    pub fn reset(&mut self) {
        self.stop();
        self.state = self.state.reset();
        self.injector.reset();
        self.trace.clear();
        info!("Simulation reset");
    }
}

impl<R: Rng> SignalGenerator for Simulation<R> {
    /// Generate regardless of the running flag, for offline rendering
    fn next_sample(&mut self) -> Result<Sample, SignalError> {
        self.step()
    }

    fn reset(&mut self) {
        Simulation::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::WaveformKind;
    use crate::noise::NoiseKind;

    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            noise: NoiseParams {
                kind: NoiseKind::None,
                snr_db: 20.0,
            },
            ..Default::default()
        }
    }

    fn brownian_config() -> SimulationConfig {
        SimulationConfig {
            noise: NoiseParams {
                kind: NoiseKind::Brownian,
                snr_db: 0.0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_stopped_tick_produces_nothing() {
        let mut sim = Simulation::with_injector(quiet_config(), NoiseInjector::seeded(1));
        assert_eq!(sim.tick().unwrap(), None);
        assert_eq!(sim.state().sample_index(), 0);
        assert!(sim.trace().is_empty());
    }

    #[test]
    fn test_ticks_follow_sample_clock() {
        let mut sim = Simulation::with_injector(quiet_config(), NoiseInjector::seeded(1));
        sim.start();
        for i in 0..20 {
            let sample = sim.tick().unwrap().unwrap();
            assert_eq!(sample.t, i as f64 / 1000.0);
        }
        assert_eq!(sim.trace().len(), 20);
    }

    #[test]
    fn test_stop_and_resume_continues_stream() {
        let mut sim = Simulation::with_injector(brownian_config(), NoiseInjector::seeded(2));
        sim.start();
        for _ in 0..5 {
            sim.tick().unwrap();
        }
        let acc = sim.injector().brownian().accumulator;

        assert!(!sim.toggle());
        assert_eq!(sim.state().sample_index(), 5);
        assert_eq!(sim.injector().brownian().accumulator, acc);

        assert!(sim.toggle());
        let sample = sim.tick().unwrap().unwrap();
        assert_eq!(sample.t, 5.0 / 1000.0);
    }

    #[test]
    fn test_reset_clears_counter_noise_and_window() {
        let mut sim = Simulation::with_injector(brownian_config(), NoiseInjector::seeded(3));
        sim.start();
        for _ in 0..10 {
            sim.tick().unwrap();
        }
        assert_ne!(sim.injector().brownian().accumulator, 0.0);

        sim.reset();
        assert!(!sim.is_running());
        assert_eq!(sim.state().sample_index(), 0);
        assert_eq!(sim.injector().brownian().accumulator, 0.0);
        assert!(sim.trace().is_empty());

        sim.start();
        let sample = sim.tick().unwrap().unwrap();
        assert_eq!(sample.t, 0.0);
    }

    #[test]
    fn test_failed_tick_leaves_state_untouched() {
        let mut sim = Simulation::with_injector(brownian_config(), NoiseInjector::seeded(4));
        sim.start();
        sim.tick().unwrap();
        let acc = sim.injector().brownian().accumulator;

        sim.set_waveform(WaveformParams {
            sample_rate_hz: 0.0,
            ..Default::default()
        });
        assert!(matches!(sim.tick(), Err(SignalError::InvalidRate(_))));
        assert_eq!(sim.state().sample_index(), 1);
        assert_eq!(sim.injector().brownian().accumulator, acc);
        assert_eq!(sim.trace().len(), 1);

        sim.set_waveform(WaveformParams::default());
        let sample = sim.tick().unwrap().unwrap();
        assert_eq!(sample.t, 1.0 / 1000.0);
    }

    #[test]
    fn test_noiseless_square_values() {
        let config = SimulationConfig {
            waveform: WaveformParams {
                kind: WaveformKind::Square,
                amplitude: 2.5,
                ..Default::default()
            },
            ..quiet_config()
        };
        let mut sim = Simulation::with_injector(config, NoiseInjector::seeded(5));
        let mut buffer = [Sample::default(); 200];
        sim.process(&mut buffer).unwrap();
        assert!(buffer.iter().all(|s| s.value.abs() == 2.5));
        assert_eq!(sim.trace().len(), 200);
    }

    #[test]
    fn test_window_size_respected() {
        let config = SimulationConfig {
            window: 16,
            ..quiet_config()
        };
        let mut sim = Simulation::with_injector(config, NoiseInjector::seeded(6));
        let mut buffer = [Sample::default(); 40];
        sim.process(&mut buffer).unwrap();
        assert_eq!(sim.trace().len(), 16);
        assert_eq!(sim.trace().latest(), Some(&buffer[39]));
    }

    #[test]
    fn test_set_noise_between_ticks() {
        let mut sim = Simulation::with_injector(quiet_config(), NoiseInjector::seeded(7));
        sim.start();
        let clean = sim.tick().unwrap().unwrap();
        assert_eq!(clean.value, 0.0);

        sim.set_noise(NoiseParams {
            kind: NoiseKind::GaussianWhite,
            snr_db: 0.0,
        });
        assert_eq!(sim.noise().kind, NoiseKind::GaussianWhite);
        let noisy = sim.tick().unwrap().unwrap();
        let clean_value = sim.waveform().kind.evaluate(10.0, 1.0, noisy.t);
        assert_ne!(noisy.value, clean_value);
    }
}
