pub mod drag;
pub mod model;

pub use drag::{
    projectile_area, DragConstant, DEFAULT_DRAG_COEFFICIENT, DRAG_COEFFICIENT_SEED,
    FIT_AIR_DENSITY, PROJECTILE_DIAMETER, TABLE_AIR_DENSITY,
};
pub use model::{
    impact_energy_from_muzzle_velocity, muzzle_energy_from_muzzle_velocity,
    velocity_at_distance, velocity_from_energy, velocity_from_energy_with_drag,
};
