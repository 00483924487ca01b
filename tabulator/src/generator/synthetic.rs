use anyhow::{bail, Context};
use rand::{rngs::StdRng, Rng, SeedableRng};
use safetycore::estimation::{EmpiricalDataset, Observation};
use safetycore::physics::{velocity_at_distance, DragConstant, FIT_AIR_DENSITY, PROJECTILE_DIAMETER};
use safetycore::AirProperties;
use serde::{Deserialize, Serialize};

/// Configuration for generating one synthetic chronograph series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub name: String,
    pub mass_g: f64,
    pub drag_coefficient: f64,
    pub muzzle_velocity: f64,
    pub distances: Vec<f64>,
    pub shots_per_distance: usize,
    /// Half-width (m/s) of the uniform noise added to each shot.
    pub noise: f64,
    pub air_density: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            name: "synthetic".into(),
            mass_g: 0.30,
            drag_coefficient: 0.47,
            muzzle_velocity: 120.0,
            distances: vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0],
            shots_per_distance: 5,
            noise: 1.0,
            air_density: FIT_AIR_DENSITY,
            seed: 0,
        }
    }
}

impl SyntheticConfig {
    fn series(name: &str, mass_g: f64, drag_coefficient: f64, muzzle_velocity: f64, seed: u64) -> Self {
        Self {
            name: name.into(),
            mass_g,
            drag_coefficient,
            muzzle_velocity,
            seed,
            ..Default::default()
        }
    }
}

pub fn build_dataset(config: &SyntheticConfig) -> anyhow::Result<EmpiricalDataset> {
    if config.shots_per_distance == 0 {
        bail!("series '{}' needs at least one shot per distance", config.name);
    }
    if !(config.noise >= 0.0) {
        bail!("series '{}' has invalid noise {}", config.name, config.noise);
    }

    let mass = config.mass_g / 1000.0;
    let air = AirProperties::new(config.air_density, PROJECTILE_DIAMETER);
    let drag = DragConstant::from_coefficient(config.drag_coefficient, air)
        .with_context(|| format!("drag constant for series '{}'", config.name))?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut observations = Vec::with_capacity(config.distances.len());
    for &distance in &config.distances {
        let ideal = velocity_at_distance(mass, distance, config.muzzle_velocity, drag)
            .with_context(|| format!("ideal velocity for series '{}'", config.name))?;
        let samples = (0..config.shots_per_distance)
            .map(|_| {
                let jitter = if config.noise > 0.0 {
                    rng.gen_range(-config.noise..config.noise)
                } else {
                    0.0
                };
                (ideal + jitter).max(0.0)
            })
            .collect();
        observations.push(Observation::new(distance, samples));
    }

    EmpiricalDataset::new(config.name.clone(), mass, observations)
        .with_context(|| format!("building synthetic series '{}'", config.name))
}

/// Five series shaped like a typical chronograph session: one heavy and
/// four lighter ammunition/replica combinations.
pub fn default_series() -> Vec<SyntheticConfig> {
    vec![
        SyntheticConfig::series("ssg24_45", 0.45, 0.45, 105.0, 1),
        SyntheticConfig::series("ssg24_30", 0.30, 0.44, 128.0, 2),
        SyntheticConfig::series("krytac_30", 0.30, 0.50, 122.0, 3),
        SyntheticConfig::series("krytac_25", 0.25, 0.47, 133.0, 4),
        SyntheticConfig::series("hk416_30", 0.30, 0.48, 118.0, 5),
    ]
}

pub fn build_default_datasets() -> anyhow::Result<Vec<EmpiricalDataset>> {
    default_series().iter().map(build_dataset).collect()
}
