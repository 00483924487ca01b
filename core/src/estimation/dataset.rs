use crate::math::StatsHelper;
use crate::prelude::{require_non_negative, require_positive, SafetyError, SafetyResult};
use serde::{Deserialize, Serialize};

/// Repeated chronograph readings (m/s) taken at one distance (m).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub distance: f64,
    pub samples: Vec<f64>,
}

impl Observation {
    pub fn new(distance: f64, samples: Vec<f64>) -> Self {
        Self { distance, samples }
    }

    pub fn mean_velocity(&self) -> f64 {
        StatsHelper::mean(&self.samples).unwrap_or(0.0)
    }
}

/// One measurement series: a named projectile mass shot at several distances.
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmpiricalDataset {
    name: String,
    mass: f64,
    observations: Vec<Observation>,
}

impl EmpiricalDataset {
    pub fn new(name: impl Into<String>, mass: f64, observations: Vec<Observation>) -> SafetyResult<Self> {
        let name = name.into();
        require_positive(&format!("mass of dataset '{}'", name), mass)?;

        if observations.len() < 2 {
            return Err(SafetyError::InvalidDataset(format!(
                "'{}' needs observations at two or more distances, got {}",
                name,
                observations.len()
            )));
        }
        for observation in &observations {
            require_non_negative(&format!("distance in dataset '{}'", name), observation.distance)?;
            if observation.samples.is_empty() {
                return Err(SafetyError::InvalidDataset(format!(
                    "'{}' has no samples at {} m",
                    name, observation.distance
                )));
            }
            if let Some(bad) = observation.samples.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(SafetyError::InvalidDataset(format!(
                    "'{}' has an invalid velocity {} at {} m",
                    name, bad, observation.distance
                )));
            }
        }
        if !observations.iter().any(|o| o.distance == 0.0) {
            return Err(SafetyError::InvalidDataset(format!(
                "'{}' has no muzzle (0 m) observation",
                name
            )));
        }

        Ok(Self {
            name,
            mass,
            observations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// kg
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn distances(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.distance).collect()
    }

    pub fn mean_velocities(&self) -> Vec<f64> {
        self.observations.iter().map(Observation::mean_velocity).collect()
    }

    /// Mean velocity at 0 m; the fixed starting point of the decay model.
    pub fn muzzle_velocity(&self) -> f64 {
        self.observations
            .iter()
            .find(|o| o.distance == 0.0)
            .map(Observation::mean_velocity)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations() -> Vec<Observation> {
        vec![
            Observation::new(0.0, vec![120.0, 122.0, 121.0]),
            Observation::new(10.0, vec![110.0, 112.0]),
            Observation::new(20.0, vec![101.0]),
        ]
    }

    #[test]
    fn means_are_per_distance() {
        let dataset = EmpiricalDataset::new("krytac_30", 0.000_30, observations()).unwrap();
        assert_eq!(dataset.distances(), vec![0.0, 10.0, 20.0]);
        assert_eq!(dataset.mean_velocities(), vec![121.0, 111.0, 101.0]);
        assert_eq!(dataset.muzzle_velocity(), 121.0);
        assert_eq!(dataset.name(), "krytac_30");
    }

    #[test]
    fn muzzle_reading_is_required() {
        let mut obs = observations();
        obs.remove(0);
        let err = EmpiricalDataset::new("no_muzzle", 0.000_30, obs).unwrap_err();
        assert!(matches!(err, SafetyError::InvalidDataset(_)));
    }

    #[test]
    fn malformed_series_are_rejected() {
        assert!(EmpiricalDataset::new("light", 0.0, observations()).is_err());
        assert!(EmpiricalDataset::new(
            "short",
            0.000_30,
            vec![Observation::new(0.0, vec![120.0])]
        )
        .is_err());
        let mut obs = observations();
        obs[1].samples.clear();
        assert!(EmpiricalDataset::new("empty", 0.000_30, obs).is_err());
        let mut obs = observations();
        obs[2].samples.push(f64::NAN);
        assert!(EmpiricalDataset::new("nan", 0.000_30, obs).is_err());
    }
}
