//! Shapley sampler - model-agnostic attributions against a background set
//!
//! Works with any `Scorable`. A feature "absent" from a coalition takes its
//! value from a background record; the coalition value is the mean score over
//! the background.
//!
//! - up to `exact_max_features` features: every coalition is enumerated
//! - otherwise: fixed-seed random permutations, each walked feature by feature
//!
//! Both modes are additive by construction: Σ φ = output - base_value.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::ExplainError;
use crate::logic::features::{FeatureContract, FeatureValue, NormalizedRecord};
use crate::logic::model::{Attributable, Attribution, FeatureModel, ModelError, Scorable};

pub const DEFAULT_PERMUTATIONS: usize = 64;
pub const DEFAULT_SEED: u64 = 42;
pub const EXACT_MAX_FEATURES: usize = 10;
/// Upper bound for `with_exact_max_features` (2^20 coalitions)
pub const EXACT_FEATURE_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct ShapleySampler {
    background: Vec<NormalizedRecord>,
    permutations: usize,
    seed: u64,
    exact_max_features: usize,
}

impl ShapleySampler {
    pub fn new(background: Vec<NormalizedRecord>) -> Result<Self, ExplainError> {
        if background.is_empty() {
            return Err(ExplainError::EmptySample);
        }
        Ok(Self {
            background,
            permutations: DEFAULT_PERMUTATIONS,
            seed: DEFAULT_SEED,
            exact_max_features: EXACT_MAX_FEATURES,
        })
    }

    pub fn with_permutations(mut self, permutations: usize) -> Self {
        self.permutations = permutations.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Feature count at or below which coalitions are enumerated,
    /// clamped to `EXACT_FEATURE_LIMIT`
    pub fn with_exact_max_features(mut self, n: usize) -> Self {
        self.exact_max_features = n.min(EXACT_FEATURE_LIMIT);
        self
    }

    pub fn background(&self) -> &[NormalizedRecord] {
        &self.background
    }

    pub fn explain<S: Scorable + ?Sized>(
        &self,
        model: &S,
        record: &NormalizedRecord,
    ) -> Result<Attribution, ModelError> {
        let contract = model.contract();
        record.validate(contract)?;
        for bg in &self.background {
            bg.validate(contract)?;
        }

        if contract.len() <= self.exact_max_features {
            self.exact(model, contract, record)
        } else {
            self.sampled(model, contract, record)
        }
    }

    fn coalition_value<S: Scorable + ?Sized>(
        &self,
        model: &S,
        contract: &FeatureContract,
        record: &NormalizedRecord,
        mask: usize,
    ) -> Result<f64, ModelError> {
        let mut total = 0.0;
        for bg in &self.background {
            let values: Vec<FeatureValue> = (0..contract.len())
                .map(|j| {
                    if mask & (1 << j) != 0 {
                        record.values()[j].clone()
                    } else {
                        bg.values()[j].clone()
                    }
                })
                .collect();
            total += model.score(&NormalizedRecord::from_parts(contract.clone(), values))?;
        }
        Ok(total / self.background.len() as f64)
    }

    fn exact<S: Scorable + ?Sized>(
        &self,
        model: &S,
        contract: &FeatureContract,
        record: &NormalizedRecord,
    ) -> Result<Attribution, ModelError> {
        let n = contract.len();
        let full = 1usize << n;

        let coalitions = (0..full)
            .map(|mask| self.coalition_value(model, contract, record, mask))
            .collect::<Result<Vec<_>, _>>()?;

        // |S|! (n - |S| - 1)! / n!
        let weights: Vec<f64> = (0..n).map(|s| 1.0 / (n as f64 * binomial(n - 1, s))).collect();

        let mut values = vec![0.0; n];
        for (j, phi) in values.iter_mut().enumerate() {
            let bit = 1 << j;
            for mask in (0..full).filter(|m| m & bit == 0) {
                let size = mask.count_ones() as usize;
                *phi += weights[size] * (coalitions[mask | bit] - coalitions[mask]);
            }
        }

        Ok(Attribution {
            base_value: coalitions[0],
            output: coalitions[full - 1],
            values,
        })
    }

    fn sampled<S: Scorable + ?Sized>(
        &self,
        model: &S,
        contract: &FeatureContract,
        record: &NormalizedRecord,
    ) -> Result<Attribution, ModelError> {
        let n = contract.len();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..n).collect();
        let mut values = vec![0.0; n];

        let mut base_total = 0.0;
        for bg in &self.background {
            base_total += model.score(bg)?;
        }

        for _ in 0..self.permutations {
            order.shuffle(&mut rng);
            for bg in &self.background {
                let mut current = bg.values().to_vec();
                let mut previous = model.score(bg)?;
                for &j in &order {
                    current[j] = record.values()[j].clone();
                    let hybrid = NormalizedRecord::from_parts(contract.clone(), current.clone());
                    let score = model.score(&hybrid)?;
                    values[j] += score - previous;
                    previous = score;
                }
            }
        }

        let samples = (self.permutations * self.background.len()) as f64;
        values.iter_mut().for_each(|v| *v /= samples);

        Ok(Attribution {
            base_value: base_total / self.background.len() as f64,
            output: model.score(record)?,
            values,
        })
    }
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

// ============================================================================
// ADAPTER
// ============================================================================

/// Makes any `Scorable` attributable through a `ShapleySampler`
pub struct SampledExplainer<'a, S: Scorable + ?Sized> {
    model: &'a S,
    sampler: ShapleySampler,
}

impl<'a, S: Scorable + ?Sized> SampledExplainer<'a, S> {
    pub fn new(model: &'a S, sampler: ShapleySampler) -> Self {
        Self { model, sampler }
    }
}

impl<S: Scorable + ?Sized> FeatureModel for SampledExplainer<'_, S> {
    fn contract(&self) -> &FeatureContract {
        self.model.contract()
    }
}

impl<S: Scorable + ?Sized> Attributable for SampledExplainer<'_, S> {
    fn attribute(&self, record: &NormalizedRecord) -> Result<Attribution, ModelError> {
        self.sampler.explain(self.model, record)
    }
}
