//! Downstream consumers of generated samples
//!
//! Samples leave the simulator as ASCII lines, one value per line with four
//! decimals (`"0.7071\n"`). Writes never stall or abort generation: a failed
//! or timed-out write drops that line and the stream goes on.

use crate::error::SignalError;
use crate::generator::Sample;
use crate::trace::TraceBuffer;
use log::{debug, info};
use serialport::SerialPort;
use std::io::{self, Write};
use std::time::Duration;

/// Baud rates offered for serial streaming
pub const BAUD_RATES: [u32; 4] = [9600, 115200, 230400, 921600];
pub const DEFAULT_BAUD_RATE: u32 = 115200;
/// Upper bound on a single serial write
pub const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// Anything that accepts samples as they are produced
pub trait SampleSink {
    fn consume(&mut self, sample: &Sample);
}

impl SampleSink for TraceBuffer {
    fn consume(&mut self, sample: &Sample) {
        self.push(*sample);
    }
}

/// Wire format of one sample
pub fn format_sample(value: f64) -> String {
    format!("{:.4}\n", value)
}

/// Writes each sample as a text line, swallowing write failures
///
/// A write that fails after part of a line went out leaves a fragment on the
/// wire. The next line is then prefixed with `\n` so the fragment never
/// merges with a complete value.
pub struct LineStreamer<W: Write> {
    writer: W,
    sent: u64,
    dropped: u64,
    broken_line: bool,
}

impl<W: Write> LineStreamer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            sent: 0,
            dropped: 0,
            broken_line: false,
        }
    }

    /// Lines written successfully
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Lines lost to write errors or timeouts
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// `write_all` that remembers whether the wire was left mid-line
    fn write_line(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.writer.write(buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole line",
                    ))
                }
                Ok(n) => {
                    self.broken_line = buf[n - 1] != b'\n';
                    buf = &buf[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<W: Write> SampleSink for LineStreamer<W> {
    fn consume(&mut self, sample: &Sample) {
        let mut line = String::new();
        if self.broken_line {
            debug!("Terminating partial line before t={:.4}", sample.t);
            line.push('\n');
        }
        line.push_str(&format_sample(sample.value));

        match self.write_line(line.as_bytes()) {
            Ok(()) => self.sent += 1,
            Err(e) => {
                self.dropped += 1;
                debug!("Dropped sample at t={:.4}: {}", sample.t, e);
            }
        }
    }
}

/// Open a serial device for streaming
///
/// Only the opening is reported as an error; once open, write failures
/// are dropped by [`LineStreamer`].
pub fn open_serial(
    path: &str,
    baud_rate: u32,
) -> Result<LineStreamer<Box<dyn SerialPort>>, SignalError> {
    let port = serialport::new(path, baud_rate)
        .timeout(WRITE_TIMEOUT)
        .open()?;
    info!("Connected to {} at {} baud", path, baud_rate);
    Ok(LineStreamer::new(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer that fails every other call
    struct FlakyWriter {
        calls: usize,
        written: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "port busy"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Writer that accepts a few bytes, then times out once, then drains
    struct StallingWriter {
        accept_before_stall: usize,
        stalled: bool,
        written: Vec<u8>,
    }

    impl Write for StallingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.stalled {
                if self.accept_before_stall == 0 {
                    self.stalled = true;
                    return Err(io::Error::new(io::ErrorKind::TimedOut, "tx buffer full"));
                }
                let n = buf.len().min(self.accept_before_stall);
                self.accept_before_stall -= n;
                self.written.extend_from_slice(&buf[..n]);
                return Ok(n);
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_format_sample() {
        assert_eq!(format_sample(0.70710678), "0.7071\n");
        assert_eq!(format_sample(-1.0), "-1.0000\n");
        assert_eq!(format_sample(0.0), "0.0000\n");
        assert_eq!(format_sample(12.34567), "12.3457\n");
    }

    #[test]
    fn test_line_streamer_writes_lines() {
        let mut streamer = LineStreamer::new(Vec::new());
        for (i, v) in [0.5, -0.25, 1.0].iter().enumerate() {
            streamer.consume(&Sample {
                t: i as f64,
                value: *v,
            });
        }
        assert_eq!(streamer.sent(), 3);
        assert_eq!(streamer.dropped(), 0);
        assert_eq!(
            String::from_utf8(streamer.into_inner()).unwrap(),
            "0.5000\n-0.2500\n1.0000\n"
        );
    }

    #[test]
    fn test_line_streamer_swallows_errors() {
        let mut streamer = LineStreamer::new(FlakyWriter {
            calls: 0,
            written: Vec::new(),
        });
        for i in 0..4 {
            streamer.consume(&Sample {
                t: i as f64,
                value: i as f64,
            });
        }
        assert_eq!(streamer.sent(), 2);
        assert_eq!(streamer.dropped(), 2);
        assert_eq!(
            String::from_utf8(streamer.get_ref().written.clone()).unwrap(),
            "0.0000\n2.0000\n"
        );
    }

    #[test]
    fn test_partial_write_does_not_merge_lines() {
        let mut streamer = LineStreamer::new(StallingWriter {
            accept_before_stall: 3,
            stalled: false,
            written: Vec::new(),
        });
        streamer.consume(&Sample {
            t: 0.0,
            value: 0.7071,
        });
        streamer.consume(&Sample { t: 0.001, value: 0.5 });
        streamer.consume(&Sample {
            t: 0.002,
            value: -0.25,
        });

        assert_eq!(streamer.sent(), 2);
        assert_eq!(streamer.dropped(), 1);

        let wire = String::from_utf8(streamer.into_inner().written).unwrap();
        assert_eq!(wire, "0.7\n0.5000\n-0.2500\n");
        // The fragment sits on its own line, every other line is a full value
        let lines: Vec<&str> = wire.lines().collect();
        assert_eq!(lines[0], "0.7");
        for line in &lines[1..] {
            let decimals = line.split('.').nth(1).map(str::len);
            assert_eq!(decimals, Some(4), "malformed line {:?}", line);
        }
    }

    #[test]
    fn test_failure_after_full_line_needs_no_resync() {
        let mut streamer = LineStreamer::new(StallingWriter {
            accept_before_stall: 7,
            stalled: false,
            written: Vec::new(),
        });
        streamer.consume(&Sample { t: 0.0, value: 1.0 });
        streamer.consume(&Sample { t: 0.001, value: 2.0 });
        streamer.consume(&Sample { t: 0.002, value: 3.0 });

        assert_eq!(streamer.sent(), 2);
        assert_eq!(streamer.dropped(), 1);
        assert_eq!(
            String::from_utf8(streamer.into_inner().written).unwrap(),
            "1.0000\n3.0000\n"
        );
    }

    #[test]
    fn test_trace_buffer_is_a_sink() {
        let mut trace = TraceBuffer::new(2);
        let sink: &mut dyn SampleSink = &mut trace;
        sink.consume(&Sample { t: 0.0, value: 1.0 });
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_open_serial_missing_device() {
        let result = open_serial("/dev/this-port-does-not-exist", DEFAULT_BAUD_RATE);
        assert!(matches!(result, Err(SignalError::Transport(_))));
    }
}
