use sigsim::generator::{FourierParams, Sample, SignalGenerator};
use sigsim::noise::noise_std;
use sigsim::simulation::{run, RunLimits};
use sigsim::transport::{LineStreamer, SampleSink};
use sigsim::{
    generate, GeneratorState, NoiseInjector, NoiseKind, NoiseParams, Simulation,
    SimulationConfig, WaveformKind, WaveformParams,
};

fn config(kind: WaveformKind, noise: NoiseKind) -> SimulationConfig {
    SimulationConfig {
        waveform: WaveformParams {
            kind,
            frequency_hz: 10.0,
            amplitude: 1.0,
            sample_rate_hz: 1000.0,
        },
        noise: NoiseParams {
            kind: noise,
            snr_db: 20.0,
        },
        window: 1000,
    }
}

#[test]
fn test_first_sample_is_at_zero_and_clock_is_exact() {
    let params = WaveformParams {
        sample_rate_hz: 44100.0,
        ..Default::default()
    };
    let mut state = GeneratorState::new();
    for i in 0..1000u64 {
        let (sample, next) = generate(state, &params).unwrap();
        assert_eq!(sample.t, i as f64 / 44100.0);
        state = next;
    }
}

#[test]
fn test_custom_fundamental_check() {
    let kind = WaveformKind::Custom(FourierParams::new(
        vec![0.0, 0.0, 0.0],
        vec![1.0, 0.0, 0.0],
    ));
    let mut sim = Simulation::with_injector(
        config(kind, NoiseKind::None),
        NoiseInjector::seeded(0),
    );
    let mut samples = vec![Sample::default(); 26];
    sim.process(&mut samples).unwrap();

    assert_eq!(samples[0].value, 0.0);
    assert_eq!(samples[25].t, 0.025);
    assert!((samples[25].value - 1.0).abs() < 1e-12);
}

#[test]
fn test_noisy_sine_stays_near_clean_signal() {
    let mut sim = Simulation::with_injector(
        config(WaveformKind::Sine, NoiseKind::GaussianWhite),
        NoiseInjector::seeded(99),
    );
    let mut samples = vec![Sample::default(); 10_000];
    sim.process(&mut samples).unwrap();

    let residuals: Vec<f64> = samples
        .iter()
        .map(|s| s.value - WaveformKind::Sine.evaluate(10.0, 1.0, s.t))
        .collect();
    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let std = (residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();

    let expected = noise_std(1.0, 20.0);
    assert!(mean.abs() < 0.003);
    assert!((std - expected).abs() / expected < 0.05);
}

#[test]
fn test_reset_policy_clears_brownian_walk() {
    let mut sim = Simulation::with_injector(
        config(WaveformKind::Sine, NoiseKind::Brownian),
        NoiseInjector::seeded(17),
    );
    let mut first_run = vec![Sample::default(); 100];
    sim.process(&mut first_run).unwrap();

    sim.reset();
    assert_eq!(sim.state().sample_index(), 0);
    assert_eq!(sim.injector().brownian().accumulator, 0.0);

    // A fresh walk from zero: the first value is close to the clean signal
    // again, not offset by the accumulated drift
    let mut second_run = vec![Sample::default(); 1];
    sim.process(&mut second_run).unwrap();
    assert_eq!(second_run[0].t, 0.0);
    let step_std = noise_std(1.0, 20.0) * 0.1;
    assert!(second_run[0].value.abs() < 6.0 * step_std);
}

#[test]
fn test_stream_to_writer_uses_four_decimals() {
    let mut sim = Simulation::with_injector(
        config(WaveformKind::Square, NoiseKind::None),
        NoiseInjector::seeded(0),
    );
    let mut streamer = LineStreamer::new(Vec::new());
    let limits = RunLimits {
        max_samples: Some(60),
        ..Default::default()
    };
    {
        let mut sinks: [&mut dyn SampleSink; 1] = [&mut streamer];
        run(&mut sim, &mut sinks, &limits).unwrap();
    }

    let text = String::from_utf8(streamer.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 60);
    assert_eq!(lines[0], "1.0000");
    assert_eq!(lines[25], "1.0000");
    assert_eq!(lines[55], "-1.0000");
    assert!(lines.iter().all(|l| *l == "1.0000" || *l == "-1.0000"));
}
