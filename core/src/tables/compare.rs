//! Cell-by-cell comparison of two safety tables. Every delta is `b - a`.

use super::energy::{impact_energies, muzzle_energies, EnergyTable};
use super::solver::VelocityTable;
use crate::math::MatrixHelper;
use crate::physics::DragConstant;
use crate::prelude::SafetyResult;
use crate::telemetry::log::LogManager;
use ndarray::Array2;

/// Element-wise `b - a`; exact subtraction, shapes must match.
pub fn diff(a: &Array2<f64>, b: &Array2<f64>) -> SafetyResult<Array2<f64>> {
    MatrixHelper::difference(a.view(), b.view())
}

pub fn compare_muzzle_velocities(a: &VelocityTable, b: &VelocityTable) -> SafetyResult<Array2<f64>> {
    diff(a.velocities(), b.velocities())
}

pub fn compare_muzzle_energies(a: &VelocityTable, b: &VelocityTable) -> SafetyResult<Array2<f64>> {
    diff(&muzzle_energies(a)?, &muzzle_energies(b)?)
}

/// Each side is evaluated at its own distances with its own drag constant.
pub fn compare_impact_energies(
    a: &VelocityTable,
    drag_a: DragConstant,
    b: &VelocityTable,
    drag_b: DragConstant,
) -> SafetyResult<Array2<f64>> {
    diff(&impact_energies(a, drag_a)?, &impact_energies(b, drag_b)?)
}

/// Everything needed to review an old table against a new one.
#[derive(Debug, Clone)]
pub struct TableComparison {
    pub muzzle_energy_old: EnergyTable,
    pub muzzle_energy_new: EnergyTable,
    pub impact_energy_old: EnergyTable,
    pub impact_energy_new: EnergyTable,
    pub velocity_diff: Array2<f64>,
    pub muzzle_energy_diff: Array2<f64>,
    pub impact_energy_diff: Array2<f64>,
}

impl TableComparison {
    /// Impact energies use the drag constant each table was built with.
    pub fn build(old: &VelocityTable, new: &VelocityTable) -> SafetyResult<Self> {
        let logger = LogManager::new("safetycore::compare");

        let muzzle_energy_old = muzzle_energies(old)?;
        let muzzle_energy_new = muzzle_energies(new)?;
        let impact_energy_old = impact_energies(old, old.drag())?;
        let impact_energy_new = impact_energies(new, new.drag())?;

        let velocity_diff = compare_muzzle_velocities(old, new)?;
        let muzzle_energy_diff = diff(&muzzle_energy_old, &muzzle_energy_new)?;
        let impact_energy_diff = diff(&impact_energy_old, &impact_energy_new)?;

        logger.record(&format!(
            "compared {}x{} tables, largest velocity change {:.1} m/s",
            velocity_diff.nrows(),
            velocity_diff.ncols(),
            velocity_diff.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
        ));

        Ok(Self {
            muzzle_energy_old,
            muzzle_energy_new,
            impact_energy_old,
            impact_energy_new,
            velocity_diff,
            muzzle_energy_diff,
            impact_energy_diff,
        })
    }
}
