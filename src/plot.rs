//! SVG rendering of the plot window
//!
//! The on-screen plot of an interactive front end is replaced by an SVG file
//! that is rewritten as new samples arrive.

use crate::error::SignalError;
use crate::generator::Sample;
use crate::trace::TraceBuffer;
use crate::transport::SampleSink;
use log::warn;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const PLOT_SIZE: (u32, u32) = (1200, 500);
const TRACE_COLOR: RGBColor = RGBColor(0x00, 0xa0, 0x88);

fn plot_err<E: std::fmt::Display>(e: E) -> SignalError {
    SignalError::Plot(e.to_string())
}

/// Axis range around `values`, padded by 10% so the trace does not touch the frame
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let span = hi - lo;
    if span == 0.0 {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * 0.1, hi + span * 0.1)
}

/// Draw `samples` as a line chart (time in seconds vs amplitude)
pub fn render_svg<P: AsRef<Path>>(
    path: P,
    samples: &[Sample],
    title: &str,
) -> Result<(), SignalError> {
    let root = SVGBackend::new(path.as_ref(), PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let t_start = samples.first().map(|s| s.t).unwrap_or(0.0);
    let mut t_end = samples.last().map(|s| s.t).unwrap_or(1.0);
    if t_end <= t_start {
        t_end = t_start + 1.0;
    }
    let (y_min, y_max) = padded_range(samples.iter().map(|s| s.value));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(t_start..t_end, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Amplitude (V)")
        .x_labels(10)
        .y_labels(10)
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            samples
                .iter()
                .filter(|s| s.value.is_finite())
                .map(|s| (s.t, s.value)),
            TRACE_COLOR.stroke_width(2),
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Sink keeping its own plot window and re-rendering it every `every` samples
pub struct PlotSink {
    path: PathBuf,
    title: String,
    window: TraceBuffer,
    every: usize,
    pending: usize,
}

impl PlotSink {
    pub fn new<P: Into<PathBuf>>(path: P, title: &str, window: usize, every: usize) -> Self {
        Self {
            path: path.into(),
            title: title.to_string(),
            window: TraceBuffer::new(window),
            every: every.max(1),
            pending: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the current window now
    pub fn flush(&mut self) -> Result<(), SignalError> {
        self.pending = 0;
        render_svg(&self.path, &self.window.to_vec(), &self.title)
    }
}

impl SampleSink for PlotSink {
    fn consume(&mut self, sample: &Sample) {
        self.window.push(*sample);
        self.pending += 1;
        if self.pending >= self.every {
            // A failed refresh must not interrupt the stream
            if let Err(e) = self.flush() {
                warn!("Plot refresh failed: {}", e);
            }
        }
    }
}
