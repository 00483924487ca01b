use crate::prelude::{require_non_negative, require_positive, AirProperties, SafetyError, SafetyResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Air density at 15 degC, 1 atm (kg/m^3). Used when building tables.
pub const TABLE_AIR_DENSITY: f64 = 1.225;
/// Air density at 25 degC, 1 atm (kg/m^3). The chronograph series were shot in this.
pub const FIT_AIR_DENSITY: f64 = 1.184;
/// Diameter of every projectile (m), regardless of mass.
pub const PROJECTILE_DIAMETER: f64 = 0.006;
pub const DEFAULT_DRAG_COEFFICIENT: f64 = 0.477;
/// Shared starting point for every drag-coefficient fit.
pub const DRAG_COEFFICIENT_SEED: f64 = 0.5;

/// Cross-sectional area (m^2) of a sphere with the given diameter.
pub fn projectile_area(diameter: f64) -> f64 {
    PI * (diameter / 2.0).powi(2)
}

/// Lumped drag constant `k = 0.5 * Cd * rho * A` (kg/m).
///
/// Derived once per run and passed by value to every conversion that needs it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DragConstant(f64);

impl DragConstant {
    /// A constant of zero disables drag entirely.
    pub const NONE: DragConstant = DragConstant(0.0);

    pub fn new(value: f64) -> SafetyResult<Self> {
        require_non_negative("drag constant", value).map(Self)
    }

    pub fn from_coefficient(drag_coefficient: f64, air: AirProperties) -> SafetyResult<Self> {
        require_non_negative("drag coefficient", drag_coefficient)?;
        require_positive("air density", air.density)?;
        require_positive("projectile diameter", air.projectile_diameter)?;
        Self::new(0.5 * drag_coefficient * air.density * projectile_area(air.projectile_diameter))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for DragConstant {
    type Error = SafetyError;

    fn try_from(value: f64) -> SafetyResult<Self> {
        Self::new(value)
    }
}

impl From<DragConstant> for f64 {
    fn from(drag: DragConstant) -> f64 {
        drag.0
    }
}

impl fmt::Display for DragConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6e} kg/m", self.0)
    }
}
