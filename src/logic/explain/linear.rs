//! Linear SHAP - φ_j = w_j (x_j - mean_j), baseline = output at the means

use crate::logic::model::linear::LinearModel;
use crate::logic::model::Attribution;

pub fn linear_shap(model: &LinearModel, row: &[f64]) -> Attribution {
    let values = model
        .weights()
        .iter()
        .zip(model.means())
        .enumerate()
        .map(|(j, (w, mean))| {
            let x = model.effective(j, row.get(j).copied().unwrap_or(f64::NAN));
            w * (x - mean)
        })
        .collect();

    Attribution {
        base_value: model.expected_value(),
        output: model.predict(row),
        values,
    }
}
