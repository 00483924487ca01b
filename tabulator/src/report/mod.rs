//! Rendering of tables and fit results to the files in the output directory.

pub mod html;
pub mod latex;
pub mod summary;
pub mod text;
pub mod writer;

use ndarray::ArrayView2;
use safetycore::{SafetyError, SafetyResult};

/// Mass (kg) as hundredths of a gram with a leading dot, e.g. `.20`.
pub(crate) fn hundredths_label(mass: f64) -> String {
    format!(".{:.0}", mass * 100_000.0)
}

pub(crate) fn velocity_cell(velocity: f64) -> String {
    format!("{:.1}", velocity)
}

/// Whole metres print without a fraction (`5`), anything else as-is (`2.5`).
pub(crate) fn distance_cell(distance: f64) -> String {
    if distance.fract() == 0.0 {
        format!("{:.0}", distance)
    } else {
        format!("{}", distance)
    }
}

/// Rejects tables whose axes do not line up with the velocity grid.
pub(crate) fn check_axes(
    masses: &[f64],
    distances: &[f64],
    class_names: &[String],
    velocities: ArrayView2<f64>,
) -> SafetyResult<()> {
    if distances.len() != class_names.len() {
        return Err(SafetyError::ConfigurationMismatch(format!(
            "mismatch between class names ({}) and distances ({})",
            class_names.len(),
            distances.len()
        )));
    }
    let expected = (distances.len(), masses.len());
    if velocities.dim() != expected {
        return Err(SafetyError::ShapeMismatch {
            expected,
            found: velocities.dim(),
        });
    }
    Ok(())
}
