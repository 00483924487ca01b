use super::solver::VelocityTable;
use crate::physics::{impact_energy_from_muzzle_velocity, DragConstant};
use crate::prelude::{SafetyError, SafetyResult};
use ndarray::Array2;

/// Energies in joules, same shape as the velocity table they came from.
pub type EnergyTable = Array2<f64>;

/// Applies the decay model to every cell; rows take `distances`, columns take `masses`.
pub fn energies_from_velocities(
    velocities: &Array2<f64>,
    masses: &[f64],
    distances: &[f64],
    drag: DragConstant,
) -> SafetyResult<EnergyTable> {
    let expected = (distances.len(), masses.len());
    if velocities.dim() != expected {
        return Err(SafetyError::ShapeMismatch {
            expected,
            found: velocities.dim(),
        });
    }

    let mut energies = Array2::<f64>::zeros(velocities.dim());
    for ((row, col), &velocity) in velocities.indexed_iter() {
        energies[[row, col]] =
            impact_energy_from_muzzle_velocity(masses[col], distances[row], velocity, drag)?;
    }
    Ok(energies)
}

/// Energy at the muzzle: the decay model evaluated at distance zero.
pub fn muzzle_energies(table: &VelocityTable) -> SafetyResult<EnergyTable> {
    let distances = vec![0.0; table.distances().len()];
    // Any constant works here; it is multiplied by a zero distance.
    let drag = DragConstant::new(1.0)?;
    energies_from_velocities(table.velocities(), table.masses(), &distances, drag)
}

/// Energy left at each row's safety distance.
pub fn impact_energies(table: &VelocityTable, drag: DragConstant) -> SafetyResult<EnergyTable> {
    energies_from_velocities(table.velocities(), table.masses(), table.distances(), drag)
}
