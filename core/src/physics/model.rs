//! Energy/velocity conversions for a sphere decelerating under quadratic drag.
//!
//! Impact energy after travelling `x` metres follows
//! `E(v, x) = m v^2 / 2 * exp(-2 k x / m)`; the functions here evaluate that
//! relation forwards and invert it for the muzzle velocity.

use super::drag::DragConstant;
use crate::prelude::{require_finite, require_non_negative, require_positive, SafetyResult};

/// Muzzle velocity (m/s) that carries `energy` joules in a projectile of `mass` kg.
pub fn velocity_from_energy(mass: f64, energy: f64) -> SafetyResult<f64> {
    require_positive("mass", mass)?;
    require_non_negative("energy", energy)?;
    require_finite("muzzle velocity", (2.0 * energy / mass).sqrt())
}

/// Muzzle velocity (m/s) that leaves exactly `energy` joules after `distance` metres.
pub fn velocity_from_energy_with_drag(
    mass: f64,
    distance: f64,
    energy: f64,
    drag: DragConstant,
) -> SafetyResult<f64> {
    require_non_negative("distance", distance)?;
    let undamped = velocity_from_energy(mass, energy)?;
    require_finite("muzzle velocity", undamped * (drag.value() * distance / mass).exp())
}

/// Kinetic energy (J) remaining after `distance` metres for a given muzzle velocity.
pub fn impact_energy_from_muzzle_velocity(
    mass: f64,
    distance: f64,
    muzzle_velocity: f64,
    drag: DragConstant,
) -> SafetyResult<f64> {
    require_positive("mass", mass)?;
    require_non_negative("distance", distance)?;
    require_non_negative("muzzle velocity", muzzle_velocity)?;
    let decay = (-2.0 * drag.value() * distance / mass).exp();
    require_finite("impact energy", mass * muzzle_velocity * muzzle_velocity * 0.5 * decay)
}

/// Kinetic energy (J) at the muzzle.
pub fn muzzle_energy_from_muzzle_velocity(mass: f64, muzzle_velocity: f64) -> SafetyResult<f64> {
    impact_energy_from_muzzle_velocity(mass, 0.0, muzzle_velocity, DragConstant::NONE)
}

/// Velocity (m/s) remaining after `distance` metres.
pub fn velocity_at_distance(
    mass: f64,
    distance: f64,
    muzzle_velocity: f64,
    drag: DragConstant,
) -> SafetyResult<f64> {
    require_positive("mass", mass)?;
    require_non_negative("distance", distance)?;
    require_non_negative("muzzle velocity", muzzle_velocity)?;
    require_finite("velocity", muzzle_velocity * (-drag.value() * distance / mass).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::SafetyError;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    fn drag(value: f64) -> DragConstant {
        DragConstant::new(value).unwrap()
    }

    #[test]
    fn cqb_ball_at_one_joule_is_one_hundred_metres_per_second() {
        let v = velocity_from_energy_with_drag(0.000_20, 0.0, 1.0, DragConstant::NONE).unwrap();
        assert!(close(v, 100.0));
        assert!(close(velocity_from_energy(0.000_20, 1.0).unwrap(), 100.0));
    }

    #[test]
    fn distance_zero_round_trip_ignores_drag() {
        for &mass in &[0.000_20, 0.000_28, 0.000_45, 0.001] {
            for &energy in &[0.0, 0.5, 1.0, 1.16, 4.55] {
                for &k in &[0.0, 1.6e-5, 1.0] {
                    let v = velocity_from_energy(mass, energy).unwrap();
                    let e = impact_energy_from_muzzle_velocity(mass, 0.0, v, drag(k)).unwrap();
                    assert!(close(e, energy), "mass {} energy {} -> {}", mass, energy, e);
                }
            }
        }
    }

    #[test]
    fn drag_inversion_round_trip() {
        let k = drag(0.5 * 0.477 * 1.225 * 2.827_433_388e-5);
        for &mass in &[0.000_20, 0.000_36, 0.000_58] {
            for &distance in &[0.0, 5.0, 20.0, 40.0] {
                for &energy in &[0.0, 1.0, 1.16] {
                    let v = velocity_from_energy_with_drag(mass, distance, energy, k).unwrap();
                    let e = impact_energy_from_muzzle_velocity(mass, distance, v, k).unwrap();
                    assert!(close(e, energy));
                }
            }
        }
    }

    #[test]
    fn required_velocity_grows_with_distance() {
        let k = drag(1.65e-5);
        let mut previous = 0.0;
        for distance in [0.0, 1.0, 5.0, 10.0, 20.0, 40.0, 80.0] {
            let v = velocity_from_energy_with_drag(0.000_25, distance, 1.0, k).unwrap();
            assert!(v > previous);
            previous = v;
        }
    }

    #[test]
    fn muzzle_energy_is_classic_kinetic_energy() {
        let e = muzzle_energy_from_muzzle_velocity(0.000_20, 100.0).unwrap();
        assert!(close(e, 1.0));
    }

    #[test]
    fn velocity_decays_with_distance() {
        let k = drag(1.65e-5);
        let v0 = 120.0;
        let v = velocity_at_distance(0.000_30, 10.0, v0, k).unwrap();
        assert!(v < v0);
        let e0 = muzzle_energy_from_muzzle_velocity(0.000_30, v0).unwrap();
        let e = impact_energy_from_muzzle_velocity(0.000_30, 10.0, v0, k).unwrap();
        assert!(close(e, e0 * (v / v0).powi(2)));
    }

    #[test]
    fn out_of_domain_inputs_fail() {
        assert!(matches!(
            velocity_from_energy(0.0, 1.0),
            Err(SafetyError::DomainError(_))
        ));
        assert!(matches!(
            velocity_from_energy(0.000_20, -1.0),
            Err(SafetyError::DomainError(_))
        ));
        assert!(velocity_from_energy_with_drag(0.000_20, -5.0, 1.0, DragConstant::NONE).is_err());
        assert!(impact_energy_from_muzzle_velocity(-0.000_20, 0.0, 100.0, DragConstant::NONE).is_err());
        assert!(muzzle_energy_from_muzzle_velocity(0.000_20, f64::NAN).is_err());
    }

    #[test]
    fn overflowing_results_are_domain_errors() {
        let k = drag(1e-5);
        assert!(matches!(
            velocity_from_energy_with_drag(0.000_20, 1e5, 1.0, k),
            Err(SafetyError::DomainError(_))
        ));
        assert!(matches!(
            impact_energy_from_muzzle_velocity(0.000_20, 1e5, 1e200, k),
            Err(SafetyError::DomainError(_))
        ));
        assert!(matches!(
            velocity_at_distance(0.000_20, 10.0, f64::MAX, DragConstant::NONE),
            Ok(v) if v == f64::MAX
        ));
        assert!(impact_energy_from_muzzle_velocity(0.000_20, 0.0, 1e200, k).is_err());
    }
}
