//! Distribution summaries for the univariate comparison
//!
//! Histogram, box-plot summary and the client's position in the population.
//! Values are expected finite (see `Dataset::column_values`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Equal-width bins over [min, max]; the last bin is closed on the right
    pub fn compute(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;
        let bin_width = if span > 0.0 { span / bins as f64 } else { 1.0 };

        let mut histogram = Self {
            min,
            max,
            bin_width,
            counts: vec![0; bins],
        };
        for &v in values {
            if let Some(bin) = histogram.bin_of(v) {
                histogram.counts[bin] += 1;
            }
        }
        Some(histogram)
    }

    /// Bin holding `value`, `None` outside [min, max]
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.min || value > self.max {
            return None;
        }
        let bin = ((value - self.min) / self.bin_width) as usize;
        Some(bin.min(self.counts.len() - 1))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Five-number summary plus mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Summary {
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Some(Self {
            count: sorted.len(),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Share of the population at or below `value`, in percent
pub fn percentile_rank(values: &[f64], value: f64) -> Option<f64> {
    if values.is_empty() || !value.is_finite() {
        return None;
    }
    let below = values.iter().filter(|&&v| v <= value).count();
    Some(100.0 * below as f64 / values.len() as f64)
}
