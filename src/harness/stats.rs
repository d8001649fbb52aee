//! Timing series statistics.
//!
//! One [`TimingSeries`] per strategy per benchmark run: an ordered sequence
//! of elapsed durations, one per full fixture pass. Mean, median, and
//! standard deviation are derived in nanoseconds; deviation is the sample
//! (n - 1) form.

use std::time::Duration;

/// Ordered timing samples for one strategy.
#[derive(Clone, Debug, Default)]
pub struct TimingSeries {
    samples: Vec<Duration>,
}

impl TimingSeries {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
        }
    }

    /// Appends one full-fixture-pass measurement.
    pub fn push(&mut self, sample: Duration) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    /// Arithmetic mean. Zero for an empty series.
    pub fn mean(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: f64 = self.samples.iter().map(|d| d.as_nanos() as f64).sum();
        Duration::from_nanos((total / self.samples.len() as f64) as u64)
    }

    /// Median; the average of the two middle samples for even counts.
    pub fn median(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut nanos: Vec<u128> = self.samples.iter().map(|d| d.as_nanos()).collect();
        nanos.sort_unstable();
        let mid = nanos.len() / 2;
        let value = if nanos.len() % 2 == 1 {
            nanos[mid]
        } else {
            (nanos[mid - 1] + nanos[mid]) / 2
        };
        Duration::from_nanos(value as u64)
    }

    /// Sample standard deviation (n - 1). Zero for fewer than two samples.
    pub fn std_dev(&self) -> Duration {
        if self.samples.len() < 2 {
            return Duration::ZERO;
        }
        let mean = self.mean().as_nanos() as f64;
        let sum_sq: f64 = self
            .samples
            .iter()
            .map(|d| {
                let diff = d.as_nanos() as f64 - mean;
                diff * diff
            })
            .sum();
        let variance = sum_sq / (self.samples.len() - 1) as f64;
        Duration::from_nanos(variance.sqrt() as u64)
    }
}
