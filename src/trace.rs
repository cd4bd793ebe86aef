//! Rolling window of the most recent samples, as shown on the plot

use crate::generator::Sample;
use std::collections::VecDeque;

/// Number of samples kept on screen by default
pub const DEFAULT_WINDOW: usize = 1000;

/// Bounded FIFO of samples
///
/// Once full, every push evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl TraceBuffer {
    /// Create a window holding at most `capacity` samples (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Copy of the window in chronological order
    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }
}
