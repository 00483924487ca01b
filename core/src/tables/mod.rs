pub mod compare;
pub mod energy;
pub mod solver;

pub use compare::{
    compare_impact_energies, compare_muzzle_energies, compare_muzzle_velocities, diff,
    TableComparison,
};
pub use energy::{energies_from_velocities, impact_energies, muzzle_energies, EnergyTable};
pub use solver::{
    max_muzzle_velocity, solve, solve_columns, BindingConstraint, CellBounds, SafetyClass,
    VelocityTable,
};
