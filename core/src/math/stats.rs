use crate::prelude::{SafetyError, SafetyResult};

pub struct StatsHelper;

/// Result of merging independent estimates of one quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEstimate {
    pub mean: f64,
    pub variance: f64,
}

impl WeightedEstimate {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

impl StatsHelper {
    pub fn rms(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    pub fn mean(samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }

    /// Merges `(estimate, variance)` pairs weighting each by `1 / variance^2`.
    ///
    /// The combined variance is the reciprocal of the summed weights. Note the
    /// squared variance: a textbook inverse-variance mean uses the first power.
    pub fn precision_weighted(estimates: &[(f64, f64)]) -> SafetyResult<WeightedEstimate> {
        if estimates.is_empty() {
            return Err(SafetyError::ConfigurationMismatch(
                "no estimates to combine".into(),
            ));
        }

        let mut precision = 0.0;
        let mut weighted_sum = 0.0;
        for &(estimate, variance) in estimates {
            if !estimate.is_finite() || !variance.is_finite() || variance <= 0.0 {
                return Err(SafetyError::DomainError(format!(
                    "cannot weight estimate {} with variance {}",
                    estimate, variance
                )));
            }
            let weight = 1.0 / (variance * variance);
            if !weight.is_finite() {
                return Err(SafetyError::DomainError(format!(
                    "variance {} is too small to weight",
                    variance
                )));
            }
            precision += weight;
            weighted_sum += estimate * weight;
        }

        let variance = 1.0 / precision;
        Ok(WeightedEstimate {
            mean: variance * weighted_sum,
            variance,
        })
    }
}
