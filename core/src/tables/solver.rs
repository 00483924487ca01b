use crate::physics::{velocity_from_energy, velocity_from_energy_with_drag, DragConstant};
use crate::prelude::{require_non_negative, require_positive, SafetyError, SafetyResult};
use crate::telemetry::log::LogManager;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One row of a safety table: a class with its distance and energy ceilings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyClass {
    pub name: String,
    /// m
    pub distance: f64,
    /// J allowed at the muzzle
    pub muzzle_energy_cap: f64,
    /// J allowed at `distance`
    pub impact_energy_cap: f64,
}

impl SafetyClass {
    pub fn new(
        name: impl Into<String>,
        distance: f64,
        muzzle_energy_cap: f64,
        impact_energy_cap: f64,
    ) -> Self {
        Self {
            name: name.into(),
            distance,
            muzzle_energy_cap,
            impact_energy_cap,
        }
    }

    fn validate(&self) -> SafetyResult<()> {
        require_non_negative(&format!("distance of class '{}'", self.name), self.distance)?;
        require_positive(
            &format!("muzzle energy cap of class '{}'", self.name),
            self.muzzle_energy_cap,
        )?;
        require_positive(
            &format!("impact energy cap of class '{}'", self.name),
            self.impact_energy_cap,
        )?;
        Ok(())
    }
}

/// Which ceiling limits a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingConstraint {
    MuzzleEnergy,
    ImpactEnergy,
}

/// Muzzle velocities indexed `[class][mass]`, together with the axes that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityTable {
    masses: Vec<f64>,
    distances: Vec<f64>,
    class_names: Vec<String>,
    velocities: Array2<f64>,
    classes: Option<Vec<SafetyClass>>,
    binding: Option<Array2<BindingConstraint>>,
    drag: DragConstant,
}

impl VelocityTable {
    /// Wraps an already published table. The caps that produced it are unknown.
    pub fn from_parts(
        masses: Vec<f64>,
        distances: Vec<f64>,
        class_names: Vec<String>,
        velocities: Array2<f64>,
        drag: DragConstant,
    ) -> SafetyResult<Self> {
        if distances.len() != class_names.len() {
            return Err(SafetyError::ConfigurationMismatch(format!(
                "{} distances but {} class names",
                distances.len(),
                class_names.len()
            )));
        }
        let expected = (distances.len(), masses.len());
        if velocities.dim() != expected {
            return Err(SafetyError::ShapeMismatch {
                expected,
                found: velocities.dim(),
            });
        }
        Ok(Self {
            masses,
            distances,
            class_names,
            velocities,
            classes: None,
            binding: None,
            drag,
        })
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn velocities(&self) -> &Array2<f64> {
        &self.velocities
    }

    /// Caps per row, when the table was solved rather than published.
    pub fn classes(&self) -> Option<&[SafetyClass]> {
        self.classes.as_deref()
    }

    pub fn drag(&self) -> DragConstant {
        self.drag
    }

    pub fn shape(&self) -> (usize, usize) {
        self.velocities.dim()
    }

    /// Which ceiling produced each cell. `None` for published tables.
    ///
    /// A tie is reported as `MuzzleEnergy`.
    pub fn binding_constraints(&self) -> Option<&Array2<BindingConstraint>> {
        self.binding.as_ref()
    }
}

/// The two independent upper limits on a cell's muzzle velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub muzzle_limit: f64,
    pub impact_limit: f64,
}

impl CellBounds {
    pub fn compute(mass: f64, class: &SafetyClass, drag: DragConstant) -> SafetyResult<Self> {
        Ok(Self {
            muzzle_limit: velocity_from_energy(mass, class.muzzle_energy_cap)?,
            impact_limit: velocity_from_energy_with_drag(
                mass,
                class.distance,
                class.impact_energy_cap,
                drag,
            )?,
        })
    }

    pub fn velocity(&self) -> f64 {
        self.impact_limit.min(self.muzzle_limit)
    }

    pub fn binding(&self) -> BindingConstraint {
        if self.muzzle_limit <= self.impact_limit {
            BindingConstraint::MuzzleEnergy
        } else {
            BindingConstraint::ImpactEnergy
        }
    }
}

/// Highest muzzle velocity (m/s) that respects both ceilings of `class`.
pub fn max_muzzle_velocity(mass: f64, class: &SafetyClass, drag: DragConstant) -> SafetyResult<f64> {
    CellBounds::compute(mass, class, drag).map(|bounds| bounds.velocity())
}

/// Solves the full `[class][mass]` table.
pub fn solve(masses: &[f64], classes: &[SafetyClass], drag: DragConstant) -> SafetyResult<VelocityTable> {
    let logger = LogManager::new("safetycore::solver");

    if masses.is_empty() || classes.is_empty() {
        return Err(SafetyError::ConfigurationMismatch(format!(
            "table needs at least one mass and one class, got {} masses and {} classes",
            masses.len(),
            classes.len()
        )));
    }
    for (idx, &mass) in masses.iter().enumerate() {
        require_positive(&format!("mass #{}", idx), mass)?;
    }
    for class in classes {
        class.validate()?;
    }

    let shape = (classes.len(), masses.len());
    let mut velocities = Array2::<f64>::zeros(shape);
    let mut binding = Array2::from_elem(shape, BindingConstraint::MuzzleEnergy);
    for (row, class) in classes.iter().enumerate() {
        for (col, &mass) in masses.iter().enumerate() {
            let bounds = CellBounds::compute(mass, class, drag)?;
            velocities[[row, col]] = bounds.velocity();
            binding[[row, col]] = bounds.binding();
        }
    }

    logger.record(&format!(
        "solved {}x{} safety table with drag constant {}",
        classes.len(),
        masses.len(),
        drag
    ));
    logger.detail(&format!("velocities {:.1}", velocities));

    Ok(VelocityTable {
        masses: masses.to_vec(),
        distances: classes.iter().map(|c| c.distance).collect(),
        class_names: classes.iter().map(|c| c.name.clone()).collect(),
        velocities,
        classes: Some(classes.to_vec()),
        binding: Some(binding),
        drag,
    })
}

/// Column-oriented entry point; every per-class list must have the same length.
pub fn solve_columns(
    masses: &[f64],
    distances: &[f64],
    muzzle_energy_caps: &[f64],
    impact_energy_caps: &[f64],
    class_names: &[String],
    drag: DragConstant,
) -> SafetyResult<VelocityTable> {
    let count = distances.len();
    if muzzle_energy_caps.len() != count
        || impact_energy_caps.len() != count
        || class_names.len() != count
    {
        return Err(SafetyError::ConfigurationMismatch(format!(
            "number of distances ({}), muzzle energies ({}), impact energies ({}) and class names ({}) does not match",
            count,
            muzzle_energy_caps.len(),
            impact_energy_caps.len(),
            class_names.len()
        )));
    }

    let classes: Vec<SafetyClass> = class_names
        .iter()
        .zip(distances)
        .zip(muzzle_energy_caps.iter().zip(impact_energy_caps))
        .map(|((name, &distance), (&muzzle, &impact))| {
            SafetyClass::new(name.clone(), distance, muzzle, impact)
        })
        .collect();

    solve(masses, &classes, drag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn drag() -> DragConstant {
        DragConstant::new(0.5 * 0.477 * 1.225 * 2.827_433_388e-5).unwrap()
    }

    fn classes() -> Vec<SafetyClass> {
        vec![
            SafetyClass::new("CQB", 0.0, 1.0, 1.0),
            SafetyClass::new("AutoB", 10.0, 1.76, 1.0),
            SafetyClass::new("BoltB", 40.0, 4.55, 1.16),
        ]
    }

    #[test]
    fn single_cell_without_drag_is_one_hundred() {
        let table = solve(
            &[0.000_20],
            &[SafetyClass::new("CQB", 0.0, 1.0, 1.0)],
            DragConstant::NONE,
        )
        .unwrap();
        assert!((table.velocities()[[0, 0]] - 100.0).abs() < 1e-12);
    }

    #[test]
    fn cells_respect_both_bounds_and_meet_one() {
        let masses = [0.000_20, 0.000_28, 0.000_40, 0.000_58];
        let k = drag();
        let table = solve(&masses, &classes(), k).unwrap();
        assert_eq!(table.shape(), (3, 4));

        for (row, class) in classes().iter().enumerate() {
            for (col, &mass) in masses.iter().enumerate() {
                let cell = table.velocities()[[row, col]];
                let muzzle = velocity_from_energy(mass, class.muzzle_energy_cap).unwrap();
                let impact =
                    velocity_from_energy_with_drag(mass, class.distance, class.impact_energy_cap, k)
                        .unwrap();
                assert!(cell <= muzzle);
                assert!(cell <= impact);
                assert!(cell == muzzle || cell == impact);
            }
        }
    }

    #[test]
    fn binding_constraint_follows_lower_limit() {
        let table = solve(&[0.000_20, 0.000_45], &classes(), drag()).unwrap();
        let binding = table.binding_constraints().unwrap();
        // Equal caps at zero distance tie, reported as the muzzle cap.
        assert_eq!(binding[[0, 0]], BindingConstraint::MuzzleEnergy);
        // A heavy ball loses little speed over 10 m, so the 1 J impact cap binds.
        assert_eq!(binding[[1, 1]], BindingConstraint::ImpactEnergy);
        assert_eq!(binding[[2, 0]], BindingConstraint::MuzzleEnergy);
    }

    #[test]
    fn mismatched_columns_fail_before_solving() {
        let names: Vec<String> = vec!["CQB".into(), "AutoA".into()];
        let err = solve_columns(
            &[0.000_20],
            &[0.0, 5.0, 10.0],
            &[1.0, 1.34, 1.76],
            &[1.0, 1.0, 1.0],
            &names,
            drag(),
        )
        .unwrap_err();
        match err {
            SafetyError::ConfigurationMismatch(message) => {
                assert!(message.contains("class names (2)"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn column_entry_point_matches_class_entry_point() {
        let names: Vec<String> = classes().iter().map(|c| c.name.clone()).collect();
        let by_columns = solve_columns(
            &[0.000_25],
            &[0.0, 10.0, 40.0],
            &[1.0, 1.76, 4.55],
            &[1.0, 1.0, 1.16],
            &names,
            drag(),
        )
        .unwrap();
        let by_classes = solve(&[0.000_25], &classes(), drag()).unwrap();
        assert_eq!(by_columns, by_classes);
    }

    #[test]
    fn empty_axes_and_bad_values_are_rejected() {
        assert!(matches!(
            solve(&[], &classes(), drag()),
            Err(SafetyError::ConfigurationMismatch(_))
        ));
        assert!(matches!(
            solve(&[0.0], &classes(), drag()),
            Err(SafetyError::DomainError(_))
        ));
        let bad = [SafetyClass::new("Broken", -1.0, 1.0, 1.0)];
        assert!(matches!(
            solve(&[0.000_20], &bad, drag()),
            Err(SafetyError::DomainError(_))
        ));
    }

    #[test]
    fn published_table_shape_is_checked() {
        let err = VelocityTable::from_parts(
            vec![0.000_20, 0.000_25],
            vec![0.0],
            vec!["CQB".into()],
            array![[100.0]],
            DragConstant::NONE,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SafetyError::ShapeMismatch {
                expected: (1, 2),
                found: (1, 1)
            }
        );
        let table = VelocityTable::from_parts(
            vec![0.000_20],
            vec![0.0],
            vec!["CQB".into()],
            array![[100.0]],
            DragConstant::NONE,
        )
        .unwrap();
        assert!(table.binding_constraints().is_none());
    }
}
