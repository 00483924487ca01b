//! Table definitions that have been published or proposed.
//!
//! Everything is built on demand; nothing here is shared mutable state.

use crate::physics::{DragConstant, DEFAULT_DRAG_COEFFICIENT};
use crate::prelude::{AirProperties, SafetyError, SafetyResult};
use crate::tables::{solve, SafetyClass, VelocityTable};
use ndarray::array;
use serde::{Deserialize, Serialize};

/// Inputs for one safety table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub title: String,
    /// kg
    pub masses: Vec<f64>,
    pub classes: Vec<SafetyClass>,
    pub drag_coefficient: f64,
}

impl TableDefinition {
    pub fn drag_constant(&self, air: AirProperties) -> SafetyResult<DragConstant> {
        DragConstant::from_coefficient(self.drag_coefficient, air)
    }

    pub fn solve(&self, drag: DragConstant) -> SafetyResult<VelocityTable> {
        solve(&self.masses, &self.classes, drag)
    }
}

fn hundredths_of_gram(hundredths: &[f64]) -> Vec<f64> {
    hundredths.iter().map(|m| m / 100_000.0).collect()
}

fn classes(names: &[&str], distances: &[f64], muzzle: &[f64], impact: &[f64]) -> Vec<SafetyClass> {
    names
        .iter()
        .zip(distances)
        .zip(muzzle.iter().zip(impact))
        .map(|((name, &d), (&m, &i))| SafetyClass::new(*name, d, m, i))
        .collect()
}

const VSAF_CLASSES: [&str; 7] = ["CQB", "AutoA", "AutoB", "HMG", "Semi", "BoltA", "BoltB"];
const CLASSIC_CLASSES: [&str; 7] = [
    "CQB 2",
    "Assault 1",
    "Assault 2",
    "Support 3",
    "DMR",
    "Sniper 1",
    "Sniper 2",
];
const CLASS_DISTANCES: [f64; 7] = [0.0, 5.0, 10.0, 20.0, 20.0, 30.0, 40.0];

pub fn vsaf_2020() -> TableDefinition {
    TableDefinition {
        title: "VSAF 2020".into(),
        masses: hundredths_of_gram(&[
            20.0, 25.0, 28.0, 30.0, 32.0, 34.0, 36.0, 40.0, 43.0, 45.0, 46.0, 48.0, 50.0, 58.0,
        ]),
        classes: classes(
            &VSAF_CLASSES,
            &CLASS_DISTANCES,
            &[1.0, 1.34, 1.76, 2.11, 2.51, 3.34, 4.55],
            &[1.0, 1.0, 1.0, 1.08, 1.16, 1.16, 1.16],
        ),
        drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
    }
}

pub fn classic_2020() -> TableDefinition {
    TableDefinition {
        title: "2020".into(),
        masses: hundredths_of_gram(&[20.0, 25.0, 28.0, 30.0, 34.0, 36.0, 40.0, 43.0, 45.0, 48.0, 50.0]),
        classes: classes(
            &CLASSIC_CLASSES,
            &CLASS_DISTANCES,
            &[1.2, 1.45, 1.7, 2.2, 2.2, 3.0, 4.0],
            &[1.2; 7],
        ),
        drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
    }
}

/// `classic_2020` recomputed with a lower drag coefficient.
pub fn classic_2020_low_drag() -> TableDefinition {
    TableDefinition {
        title: "2020 (Cd 0.4)".into(),
        drag_coefficient: 0.4,
        ..classic_2020()
    }
}

/// The VSAF 2019 table as published; it was not derived from energy caps.
pub fn vsaf_2019_published() -> SafetyResult<VelocityTable> {
    let velocities = array![
        [100.0, 89.4, 84.5, 81.6, 76.7, 74.2, 70.4, 68.0, 66.6],
        [115.8, 103.6, 97.9, 94.6, 88.8, 86.3, 81.9, 79.0, 77.2],
        [132.6, 118.6, 112.1, 108.3, 101.7, 98.6, 93.5, 90.4, 88.4],
        [145.0, 129.6, 122.5, 118.3, 111.1, 108.0, 102.5, 98.8, 96.6],
        [158.5, 141.8, 134.0, 129.4, 121.6, 118.1, 112.0, 108.1, 105.7],
        [182.9, 163.6, 154.6, 149.3, 140.3, 136.2, 129.2, 124.7, 121.9],
        [213.4, 190.8, 180.3, 174.2, 163.6, 159.0, 150.8, 145.5, 142.2],
    ];
    VelocityTable::from_parts(
        hundredths_of_gram(&[20.0, 25.0, 28.0, 30.0, 34.0, 36.0, 40.0, 43.0, 45.0]),
        CLASS_DISTANCES.to_vec(),
        VSAF_CLASSES.iter().map(|s| s.to_string()).collect(),
        velocities,
        DragConstant::NONE,
    )
}

pub const PRESET_NAMES: [&str; 3] = ["vsaf-2020", "classic-2020", "classic-2020-cd04"];
pub const PUBLISHED_NAMES: [&str; 1] = ["vsaf-2019"];

pub fn preset_by_name(name: &str) -> SafetyResult<TableDefinition> {
    match name {
        "vsaf-2020" => Ok(vsaf_2020()),
        "classic-2020" => Ok(classic_2020()),
        "classic-2020-cd04" => Ok(classic_2020_low_drag()),
        other => Err(SafetyError::ConfigurationMismatch(format!(
            "unknown preset '{}', expected one of {}",
            other,
            PRESET_NAMES.join(", ")
        ))),
    }
}

/// A table another one can be compared against.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceTable {
    /// Solved from energy caps with the caller's air.
    Defined(TableDefinition),
    /// Taken as printed; carries no drag constant.
    Published { title: String, table: VelocityTable },
}

impl ReferenceTable {
    pub fn title(&self) -> &str {
        match self {
            ReferenceTable::Defined(definition) => &definition.title,
            ReferenceTable::Published { title, .. } => title,
        }
    }

    pub fn build(&self, air: AirProperties) -> SafetyResult<VelocityTable> {
        match self {
            ReferenceTable::Defined(definition) => definition.solve(definition.drag_constant(air)?),
            ReferenceTable::Published { table, .. } => Ok(table.clone()),
        }
    }
}

/// Resolves solved presets and published tables alike.
pub fn reference_by_name(name: &str) -> SafetyResult<ReferenceTable> {
    match name {
        "vsaf-2019" => Ok(ReferenceTable::Published {
            title: "VSAF 2019".into(),
            table: vsaf_2019_published()?,
        }),
        other if PRESET_NAMES.contains(&other) => preset_by_name(other).map(ReferenceTable::Defined),
        other => Err(SafetyError::ConfigurationMismatch(format!(
            "unknown table '{}', expected one of {}, {}",
            other,
            PRESET_NAMES.join(", "),
            PUBLISHED_NAMES.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{compare_muzzle_velocities, muzzle_energies};

    #[test]
    fn vsaf_2020_cqb_light_ball_is_one_hundred() {
        let definition = vsaf_2020();
        let drag = definition.drag_constant(AirProperties::default()).unwrap();
        let table = definition.solve(drag).unwrap();
        assert_eq!(table.shape(), (7, 14));
        assert!((table.velocities()[[0, 0]] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn every_preset_resolves_and_solves() {
        for name in PRESET_NAMES {
            let definition = preset_by_name(name).unwrap();
            let drag = definition.drag_constant(AirProperties::default()).unwrap();
            let table = definition.solve(drag).unwrap();
            assert_eq!(table.shape(), (7, definition.masses.len()));
        }
        assert!(preset_by_name("vsaf-1999").is_err());
    }

    #[test]
    fn lower_drag_never_raises_velocities() {
        let air = AirProperties::default();
        let base = classic_2020();
        let low = classic_2020_low_drag();
        let base_table = base.solve(base.drag_constant(air).unwrap()).unwrap();
        let low_table = low.solve(low.drag_constant(air).unwrap()).unwrap();
        let delta = compare_muzzle_velocities(&base_table, &low_table).unwrap();
        assert!(delta.iter().all(|&v| v <= 1e-12));
    }

    #[test]
    fn published_2019_matches_one_joule_cqb_row() {
        let table = vsaf_2019_published().unwrap();
        let energies = muzzle_energies(&table).unwrap();
        // The CQB row sits at roughly 1 J for every mass.
        assert!(energies.row(0).iter().all(|&e| (e - 1.0).abs() < 0.02));
    }

    #[test]
    fn references_resolve_published_and_solved_tables() {
        let air = AirProperties::default();
        let published = reference_by_name("vsaf-2019").unwrap();
        assert_eq!(published.title(), "VSAF 2019");
        let table = published.build(air).unwrap();
        assert_eq!(table.shape(), (7, 9));
        assert_eq!(table.drag(), DragConstant::NONE);
        assert!(table.binding_constraints().is_none());

        let defined = reference_by_name("classic-2020").unwrap();
        assert_eq!(defined.title(), "2020");
        assert_eq!(defined.build(air).unwrap().shape(), (7, 11));
        assert!(matches!(
            reference_by_name("vsaf-1999"),
            Err(SafetyError::ConfigurationMismatch(_))
        ));
    }
}
