use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    pub value: f64, // signed, model output space
}

/// Local explanation of one record, contributions in contract order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionSet {
    pub base_value: f64,
    pub output: f64,
    pub contributions: Vec<FeatureContribution>,
}

impl AttributionSet {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.contributions
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
    }

    pub fn sum(&self) -> f64 {
        self.contributions.iter().map(|c| c.value).sum()
    }

    /// Local accuracy: base_value + Σ contributions ≈ output
    pub fn verify(&self, tolerance: f64) -> bool {
        (self.base_value + self.sum() - self.output).abs() <= tolerance
    }

    /// Largest |contribution| first
    pub fn top(&self, n: usize) -> Vec<FeatureContribution> {
        let mut sorted = self.contributions.clone();
        sorted.sort_by(|a, b| {
            b.value
                .abs()
                .partial_cmp(&a.value.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted.truncate(n);
        sorted
    }
}

/// Mean |contribution| per feature over a sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalAttribution {
    pub n_samples: usize,
    pub base_value: f64,
    pub importances: Vec<FeatureContribution>,
}

impl GlobalAttribution {
    pub fn top(&self, n: usize) -> Vec<FeatureContribution> {
        let mut sorted = self.importances.clone();
        sorted.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
        sorted.truncate(n);
        sorted
    }
}
