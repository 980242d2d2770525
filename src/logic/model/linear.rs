//! Linear model - raw output = bias + Σ w_j x_j
//!
//! Missing inputs take the background mean of their feature.

#[derive(Debug, Clone)]
pub struct LinearModel {
    weights: Vec<f64>,
    bias: f64,
    means: Vec<f64>,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, bias: f64, means: Vec<f64>, n_features: usize) -> Result<Self, String> {
        if weights.len() != n_features {
            return Err(format!("expected {} weights, got {}", n_features, weights.len()));
        }
        if means.len() != n_features {
            return Err(format!("expected {} feature means, got {}", n_features, means.len()));
        }
        if !bias.is_finite() || weights.iter().chain(means.iter()).any(|v| !v.is_finite()) {
            return Err("weights, bias and means must be finite".to_string());
        }
        Ok(Self { weights, bias, means })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Input value with missing (or infinite) replaced by the mean
    #[inline]
    pub fn effective(&self, j: usize, value: f64) -> f64 {
        if !value.is_finite() {
            self.means[j]
        } else {
            value
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.bias
            + self
                .weights
                .iter()
                .enumerate()
                .map(|(j, w)| w * self.effective(j, row.get(j).copied().unwrap_or(f64::NAN)))
                .sum::<f64>()
    }

    /// Output at the background means
    pub fn expected_value(&self) -> f64 {
        self.bias + self.weights.iter().zip(&self.means).map(|(w, m)| w * m).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_and_expected() {
        let model = LinearModel::new(vec![2.0, -1.0], 0.5, vec![1.0, 3.0], 2).unwrap();
        assert_eq!(model.predict(&[2.0, 1.0]), 0.5 + 4.0 - 1.0);
        assert_eq!(model.expected_value(), 0.5 + 2.0 - 3.0);
        // Missing input falls back to the mean
        assert_eq!(model.predict(&[f64::NAN, 3.0]), model.expected_value());
        assert_eq!(model.predict(&[f64::INFINITY, 3.0]), model.expected_value());
    }

    #[test]
    fn test_shape_validation() {
        assert!(LinearModel::new(vec![1.0], 0.0, vec![0.0, 0.0], 2).is_err());
        assert!(LinearModel::new(vec![1.0, 1.0], 0.0, vec![0.0], 2).is_err());
        assert!(LinearModel::new(vec![f64::INFINITY], 0.0, vec![0.0], 1).is_err());
    }
}
