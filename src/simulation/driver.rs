//! Timer loop driving a simulation in real time

use super::Simulation;
use crate::error::SignalError;
use crate::generator::check_sample_rate;
use crate::transport::SampleSink;
use log::{debug, info, warn};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Shortest timer period, high sample rates are slowed down to this
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// Timer period for a sample rate: 1000/fs ms truncated, at least 1 ms
pub fn tick_interval(sample_rate_hz: f64) -> Result<Duration, SignalError> {
    check_sample_rate(sample_rate_hz)?;
    let millis = (1000.0 / sample_rate_hz).floor() as u64;
    Ok(Duration::from_millis(millis).max(MIN_TICK))
}

/// When the driver loop ends
#[derive(Debug, Clone, Default)]
pub struct RunLimits {
    /// Stop after this many samples (unbounded when `None`)
    pub max_samples: Option<u64>,
    /// Raised from outside (e.g. Ctrl-C) to end the loop
    pub stop: Arc<AtomicBool>,
}

/// Tick `sim` at its sample rate, handing every sample to each sink
///
/// The simulation is started if it is not running and left stopped on
/// return, keeping its counter and noise state. A tick that fails is
/// skipped with a warning. Returns the number of samples produced.
pub fn run<R: Rng>(
    sim: &mut Simulation<R>,
    sinks: &mut [&mut dyn SampleSink],
    limits: &RunLimits,
) -> Result<u64, SignalError> {
    let interval = tick_interval(sim.waveform().sample_rate_hz)?;
    info!("Driver ticking every {:?}", interval);

    sim.start();
    let mut produced = 0u64;
    let mut next_deadline = Instant::now();

    while !limits.stop.load(Ordering::Relaxed) {
        if let Some(max) = limits.max_samples {
            if produced >= max {
                break;
            }
        }

        match sim.tick() {
            Ok(Some(sample)) => {
                for sink in sinks.iter_mut() {
                    sink.consume(&sample);
                }
                produced += 1;
                debug!("t={:.4} value={:.4}", sample.t, sample.value);
            }
            Ok(None) => break,
            Err(e) => warn!("Skipped tick: {}", e),
        }

        next_deadline += interval;
        let now = Instant::now();
        if next_deadline > now {
            thread::sleep(next_deadline - now);
        } else {
            // Running late, do not try to catch up with a burst
            next_deadline = now;
        }
    }

    sim.stop();
    info!("Driver finished after {} samples", produced);
    Ok(produced)
}
