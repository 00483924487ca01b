//! Drag-coefficient estimation from chronograph series.
//!
//! Each series is fitted on its own with `v(x) = v0 * exp(-0.5 * Cd * rho * A / m * x)`,
//! where `v0` is the series' measured mean at 0 m. The per-series estimates are
//! then merged with weights `1 / variance^2`.

use super::dataset::EmpiricalDataset;
use crate::math::regression::{fit_single_parameter, CurveFitOptions};
use crate::math::StatsHelper;
use crate::physics::{
    projectile_area, velocity_at_distance, DragConstant, DRAG_COEFFICIENT_SEED, FIT_AIR_DENSITY,
    PROJECTILE_DIAMETER,
};
use crate::prelude::{AirProperties, SafetyError, SafetyResult};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSettings {
    pub air: AirProperties,
    pub regression: CurveFitOptions,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            air: AirProperties::new(FIT_AIR_DENSITY, PROJECTILE_DIAMETER),
            regression: CurveFitOptions {
                initial: DRAG_COEFFICIENT_SEED,
                ..Default::default()
            },
        }
    }
}

/// What to do with series whose fit failed when merging estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Any failed series invalidates the merged estimate.
    Strict,
    /// Failed series are dropped and listed in the result.
    ExcludeFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetFit {
    pub dataset: String,
    pub drag_coefficient: f64,
    pub variance: f64,
    pub residual_sum_squares: f64,
    pub iterations: usize,
}

impl DatasetFit {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedEstimate {
    /// Precision-weighted mean Cd.
    pub drag_coefficient: f64,
    pub variance: f64,
    pub std_dev: f64,
    /// Plain average of the per-series estimates, for reference.
    pub unweighted_mean: f64,
    /// m/s, RMS of `observed - predicted` over every series and distance.
    pub model_rms_error: f64,
    pub fits: Vec<DatasetFit>,
    pub excluded: Vec<String>,
}

impl CombinedEstimate {
    pub fn drag_constant(&self, air: AirProperties) -> SafetyResult<DragConstant> {
        DragConstant::from_coefficient(self.drag_coefficient, air)
    }
}

/// Per-series outcomes, in the order the series were given.
#[derive(Debug, Clone)]
pub struct FitReport {
    pub outcomes: Vec<SafetyResult<DatasetFit>>,
}

impl FitReport {
    pub fn successes(&self) -> impl Iterator<Item = &DatasetFit> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SafetyError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }
}

/// Decay rate per metre of velocity for one unit of Cd.
fn decay_per_coefficient(mass: f64, air: AirProperties) -> f64 {
    0.5 * air.density * projectile_area(air.projectile_diameter) / mass
}

/// `v0` is pinned to the 0 m mean, so the fit needs two readings beyond the
/// muzzle before its variance says anything.
const MIN_DOWNRANGE_DISTANCES: usize = 2;

pub fn fit_dataset(dataset: &EmpiricalDataset, settings: &FitSettings) -> SafetyResult<DatasetFit> {
    let downrange = dataset
        .observations()
        .iter()
        .filter(|o| o.distance > 0.0)
        .count();
    if downrange < MIN_DOWNRANGE_DISTANCES {
        return Err(SafetyError::FitNonConvergence {
            dataset: dataset.name().to_string(),
            reason: format!(
                "{} downrange distance(s) leave the drag coefficient exactly determined, need {}",
                downrange, MIN_DOWNRANGE_DISTANCES
            ),
        });
    }

    let rate = decay_per_coefficient(dataset.mass(), settings.air);
    let v0 = dataset.muzzle_velocity();
    let model = move |x: f64, cd: f64| v0 * (-cd * rate * x).exp();
    let derivative = move |x: f64, cd: f64| -rate * x * v0 * (-cd * rate * x).exp();

    let fit = fit_single_parameter(
        &dataset.distances(),
        &dataset.mean_velocities(),
        model,
        derivative,
        settings.regression,
    )
    .map_err(|err| SafetyError::FitNonConvergence {
        dataset: dataset.name().to_string(),
        reason: err.to_string(),
    })?;

    if fit.parameter < 0.0 {
        return Err(SafetyError::FitNonConvergence {
            dataset: dataset.name().to_string(),
            reason: format!("fitted drag coefficient {} is negative", fit.parameter),
        });
    }

    if !(fit.variance.is_finite() && fit.variance > 0.0) {
        return Err(SafetyError::FitNonConvergence {
            dataset: dataset.name().to_string(),
            reason: format!("variance {} cannot be weighted", fit.variance),
        });
    }

    Ok(DatasetFit {
        dataset: dataset.name().to_string(),
        drag_coefficient: fit.parameter,
        variance: fit.variance,
        residual_sum_squares: fit.residual_sum_squares,
        iterations: fit.iterations,
    })
}

/// Velocity (m/s) the model predicts for `dataset` at `distance`.
pub fn predicted_velocity(
    dataset: &EmpiricalDataset,
    drag_coefficient: f64,
    air: AirProperties,
    distance: f64,
) -> SafetyResult<f64> {
    let drag = DragConstant::from_coefficient(drag_coefficient, air)?;
    velocity_at_distance(dataset.mass(), distance, dataset.muzzle_velocity(), drag)
}

/// RMS of the residuals pooled over every (series, distance) pair.
pub fn model_rms_error(
    datasets: &[&EmpiricalDataset],
    drag_coefficient: f64,
    air: AirProperties,
) -> SafetyResult<f64> {
    let mut residuals = Vec::new();
    for dataset in datasets {
        for observation in dataset.observations() {
            let predicted = predicted_velocity(dataset, drag_coefficient, air, observation.distance)?;
            residuals.push(observation.mean_velocity() - predicted);
        }
    }
    Ok(StatsHelper::rms(&residuals))
}

pub struct DragCoefficientEstimator {
    settings: FitSettings,
    logger: LogManager,
}

impl DragCoefficientEstimator {
    pub fn new(settings: FitSettings) -> Self {
        Self {
            settings,
            logger: LogManager::new("safetycore::estimator"),
        }
    }

    pub fn settings(&self) -> &FitSettings {
        &self.settings
    }

    /// Fits every series independently; one failure leaves the others untouched.
    pub fn fit_all(&self, datasets: &[EmpiricalDataset]) -> FitReport {
        let outcomes = datasets
            .iter()
            .map(|dataset| {
                let outcome = fit_dataset(dataset, &self.settings);
                match &outcome {
                    Ok(fit) => self.logger.detail(&format!(
                        "{}: Cd {:.5} +- {:.5} after {} iterations",
                        fit.dataset,
                        fit.drag_coefficient,
                        fit.std_dev(),
                        fit.iterations
                    )),
                    Err(err) => self.logger.caution(&err.to_string()),
                }
                outcome
            })
            .collect();
        FitReport { outcomes }
    }

    /// Merges the fits in `report`; `datasets` must be the slice it was built from.
    pub fn combine(
        &self,
        datasets: &[EmpiricalDataset],
        report: &FitReport,
        policy: FailurePolicy,
    ) -> SafetyResult<CombinedEstimate> {
        if datasets.len() != report.outcomes.len() {
            return Err(SafetyError::ConfigurationMismatch(format!(
                "{} datasets but {} fit outcomes",
                datasets.len(),
                report.outcomes.len()
            )));
        }

        let mut included = Vec::new();
        let mut fits = Vec::new();
        let mut excluded = Vec::new();
        for (dataset, outcome) in datasets.iter().zip(&report.outcomes) {
            match outcome {
                Ok(fit) => {
                    included.push(dataset);
                    fits.push(fit.clone());
                }
                Err(err) if policy == FailurePolicy::ExcludeFailed => {
                    self.logger
                        .caution(&format!("excluding dataset '{}': {}", dataset.name(), err));
                    excluded.push(dataset.name().to_string());
                }
                Err(err) => return Err(err.clone()),
            }
        }

        if fits.is_empty() {
            return Err(SafetyError::ConfigurationMismatch(
                "no successfully fitted datasets to combine".into(),
            ));
        }

        let pairs: Vec<(f64, f64)> = fits
            .iter()
            .map(|fit| (fit.drag_coefficient, fit.variance))
            .collect();
        let weighted = StatsHelper::precision_weighted(&pairs)?;
        let unweighted_mean = pairs.iter().map(|(cd, _)| cd).sum::<f64>() / pairs.len() as f64;
        let model_rms_error = model_rms_error(&included, weighted.mean, self.settings.air)?;

        self.logger.record(&format!(
            "drag coefficient {:.5} +- {:.6} from {} datasets, model RMS error {:.3} m/s",
            weighted.mean,
            weighted.std_dev(),
            fits.len(),
            model_rms_error
        ));

        Ok(CombinedEstimate {
            drag_coefficient: weighted.mean,
            variance: weighted.variance,
            std_dev: weighted.std_dev(),
            unweighted_mean,
            model_rms_error,
            fits,
            excluded,
        })
    }

    pub fn estimate(
        &self,
        datasets: &[EmpiricalDataset],
        policy: FailurePolicy,
    ) -> SafetyResult<CombinedEstimate> {
        let report = self.fit_all(datasets);
        self.combine(datasets, &report, policy)
    }
}

impl Default for DragCoefficientEstimator {
    fn default() -> Self {
        Self::new(FitSettings::default())
    }
}
