use anyhow::Context;
use safetycore::estimation::{predicted_velocity, CombinedEstimate, EmpiricalDataset};
use safetycore::math::MatrixHelper;
use safetycore::tables::{BindingConstraint, EnergyTable, TableComparison, VelocityTable};
use safetycore::AirProperties;
use serde::Serialize;

pub const CURVE_POINTS: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub title: String,
    pub drag_coefficient: f64,
    pub drag_constant: f64,
    pub masses_g: Vec<f64>,
    pub distances: Vec<f64>,
    pub class_names: Vec<String>,
    pub muzzle_velocities: Vec<Vec<f64>>,
    pub muzzle_energies: Vec<Vec<f64>>,
    pub impact_energies: Vec<Vec<f64>>,
    pub binding_constraints: Option<Vec<Vec<BindingConstraint>>>,
}

impl TableSummary {
    pub fn new(
        title: &str,
        drag_coefficient: f64,
        table: &VelocityTable,
        muzzle_energies: &EnergyTable,
        impact_energies: &EnergyTable,
    ) -> Self {
        Self {
            title: title.to_string(),
            drag_coefficient,
            drag_constant: table.drag().value(),
            masses_g: table.masses().iter().map(|m| m * 1000.0).collect(),
            distances: table.distances().to_vec(),
            class_names: table.class_names().to_vec(),
            muzzle_velocities: MatrixHelper::to_rows(table.velocities().view()),
            muzzle_energies: MatrixHelper::to_rows(muzzle_energies.view()),
            impact_energies: MatrixHelper::to_rows(impact_energies.view()),
            binding_constraints: table
                .binding_constraints()
                .map(|b| b.outer_iter().map(|row| row.to_vec()).collect()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    pub against: String,
    pub velocity_diff: Vec<Vec<f64>>,
    pub muzzle_energy_diff: Vec<Vec<f64>>,
    pub impact_energy_diff: Vec<Vec<f64>>,
}

impl ComparisonSummary {
    pub fn new(against: &str, comparison: &TableComparison) -> Self {
        Self {
            against: against.to_string(),
            velocity_diff: MatrixHelper::to_rows(comparison.velocity_diff.view()),
            muzzle_energy_diff: MatrixHelper::to_rows(comparison.muzzle_energy_diff.view()),
            impact_energy_diff: MatrixHelper::to_rows(comparison.impact_energy_diff.view()),
        }
    }
}

/// Everything a run produced, as written to `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub table: TableSummary,
    pub fit: Option<CombinedEstimate>,
    pub comparison: Option<ComparisonSummary>,
}

impl RunSummary {
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serializing run summary")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePoint {
    pub dataset: String,
    pub distance: f64,
    pub predicted_velocity: f64,
}

/// Model velocity for each series at evenly spaced distances up to its farthest reading.
pub fn model_curve(
    datasets: &[EmpiricalDataset],
    drag_coefficient: f64,
    air: AirProperties,
) -> anyhow::Result<Vec<CurvePoint>> {
    let mut points = Vec::with_capacity(datasets.len() * CURVE_POINTS);
    for dataset in datasets {
        let reach = dataset.distances().into_iter().fold(0.0_f64, f64::max);
        for step in 0..CURVE_POINTS {
            let distance = reach * step as f64 / (CURVE_POINTS - 1) as f64;
            let predicted_velocity = predicted_velocity(dataset, drag_coefficient, air, distance)
                .with_context(|| format!("model curve for '{}'", dataset.name()))?;
            points.push(CurvePoint {
                dataset: dataset.name().to_string(),
                distance,
                predicted_velocity,
            });
        }
    }
    Ok(points)
}

pub fn curve_csv(points: &[CurvePoint]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for point in points {
        writer.serialize(point).context("writing model curve row")?;
    }
    let bytes = writer.into_inner().context("flushing model curve")?;
    String::from_utf8(bytes).context("model curve is not UTF-8")
}
