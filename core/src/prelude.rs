use serde::{Deserialize, Serialize};

pub use crate::physics::DragConstant;
pub use crate::tables::{SafetyClass, VelocityTable};

/// Row/column extent of a table, `(classes, masses)`.
pub type TableShape = (usize, usize);

/// Common error type for every computation in the core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SafetyError {
    #[error("configuration mismatch: {0}")]
    ConfigurationMismatch(String),
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: TableShape,
        found: TableShape,
    },
    #[error("drag fit for dataset '{dataset}' did not converge: {reason}")]
    FitNonConvergence { dataset: String, reason: String },
    #[error("domain error: {0}")]
    DomainError(String),
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
}

pub type SafetyResult<T> = Result<T, SafetyError>;

/// Air and projectile properties feeding the drag constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirProperties {
    /// kg/m^3
    pub density: f64,
    /// m
    pub projectile_diameter: f64,
}

impl AirProperties {
    pub fn new(density: f64, projectile_diameter: f64) -> Self {
        Self {
            density,
            projectile_diameter,
        }
    }
}

impl Default for AirProperties {
    fn default() -> Self {
        Self {
            density: crate::physics::TABLE_AIR_DENSITY,
            projectile_diameter: crate::physics::PROJECTILE_DIAMETER,
        }
    }
}

pub(crate) fn require_finite(field: &str, value: f64) -> SafetyResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SafetyError::DomainError(format!(
            "{} must be finite, got {}",
            field, value
        )))
    }
}

pub(crate) fn require_positive(field: &str, value: f64) -> SafetyResult<f64> {
    if require_finite(field, value)? > 0.0 {
        Ok(value)
    } else {
        Err(SafetyError::DomainError(format!(
            "{} must be positive, got {}",
            field, value
        )))
    }
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> SafetyResult<f64> {
    if require_finite(field, value)? >= 0.0 {
        Ok(value)
    } else {
        Err(SafetyError::DomainError(format!(
            "{} must not be negative, got {}",
            field, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_guards_reject_bad_values() {
        assert!(require_positive("mass", 0.0).is_err());
        assert!(require_positive("mass", f64::NAN).is_err());
        assert!(require_non_negative("energy", -1e-9).is_err());
        assert_eq!(require_non_negative("energy", 0.0), Ok(0.0));
    }

    #[test]
    fn shape_mismatch_message_names_both_shapes() {
        let err = SafetyError::ShapeMismatch {
            expected: (7, 11),
            found: (7, 14),
        };
        assert_eq!(
            err.to_string(),
            "shape mismatch: expected (7, 11), found (7, 14)"
        );
    }
}
