use std::fmt;

/// Running statistics for one station.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregator {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
        }
    }

    #[inline]
    pub fn add(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// `None` until the first `add`.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Round half up to one decimal place. `-0.25` becomes `-0.2`, not `-0.3`.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mean = self.mean().unwrap_or(f64::NAN);
        write!(
            f,
            "{:.1}/{:.1}/{:.1}",
            round_tenth(self.min),
            round_tenth(mean),
            round_tenth(self.max)
        )
    }
}
