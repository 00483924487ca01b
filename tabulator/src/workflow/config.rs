use anyhow::{bail, Context};
use safetycore::physics::{FIT_AIR_DENSITY, PROJECTILE_DIAMETER, TABLE_AIR_DENSITY};
use safetycore::presets::{preset_by_name, reference_by_name, ReferenceTable, TableDefinition};
use safetycore::tables::SafetyClass;
use safetycore::AirProperties;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A table written out in the workflow file rather than taken from a preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InlineTable {
    pub title: String,
    /// Projectile masses in grams.
    pub masses_g: Vec<f64>,
    pub classes: Vec<SafetyClass>,
}

/// Exactly one of `preset` or `inline` names the table to build.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSource {
    pub preset: Option<String>,
    pub inline: Option<InlineTable>,
}

impl TableSource {
    pub fn preset(name: &str) -> Self {
        Self {
            preset: Some(name.to_string()),
            inline: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub name: String,
    pub mass_g: f64,
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub datasets: Vec<DatasetSource>,
    /// Fit against generated series instead of measurement files.
    pub synthetic: bool,
    pub air_density: f64,
    /// Build the table with the fitted coefficient instead of the configured one.
    pub use_fitted_coefficient: bool,
    pub exclude_failed: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            datasets: Vec::new(),
            synthetic: false,
            air_density: FIT_AIR_DENSITY,
            use_fitted_coefficient: false,
            exclude_failed: false,
        }
    }
}

impl FitConfig {
    pub fn is_enabled(&self) -> bool {
        self.synthetic || !self.datasets.is_empty()
    }

    pub fn air(&self) -> AirProperties {
        AirProperties::new(self.air_density, PROJECTILE_DIAMETER)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub table: TableSource,
    pub drag_coefficient: Option<f64>,
    pub air_density: f64,
    pub fit: FitConfig,
    pub compare_with: Option<String>,
    pub output_dir: PathBuf,
    pub fps: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            table: TableSource::preset("vsaf-2020"),
            drag_coefficient: None,
            air_density: TABLE_AIR_DENSITY,
            fit: FitConfig::default(),
            compare_with: None,
            output_dir: PathBuf::from("output"),
            fps: false,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        preset: &str,
        drag_coefficient: Option<f64>,
        compare_with: Option<String>,
        output_dir: PathBuf,
        fps: bool,
        synthetic_fit: bool,
    ) -> Self {
        Self {
            table: TableSource::preset(preset),
            drag_coefficient,
            compare_with,
            output_dir,
            fps,
            fit: FitConfig {
                synthetic: synthetic_fit,
                use_fitted_coefficient: synthetic_fit && drag_coefficient.is_none(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn air(&self) -> AirProperties {
        AirProperties::new(self.air_density, PROJECTILE_DIAMETER)
    }

    /// Resolves the table source, applying the drag coefficient override.
    pub fn table_definition(&self) -> anyhow::Result<TableDefinition> {
        let mut definition = match (&self.table.preset, &self.table.inline) {
            (Some(name), None) => preset_by_name(name)?,
            (None, Some(inline)) => {
                if inline.masses_g.iter().any(|m| !(*m > 0.0)) {
                    bail!("inline table '{}' has a non-positive mass", inline.title);
                }
                TableDefinition {
                    title: inline.title.clone(),
                    masses: inline.masses_g.iter().map(|g| g / 1000.0).collect(),
                    classes: inline.classes.clone(),
                    drag_coefficient: safetycore::physics::DEFAULT_DRAG_COEFFICIENT,
                }
            }
            (Some(_), Some(_)) => bail!("table names both a preset and an inline table"),
            (None, None) => bail!("table names neither a preset nor an inline table"),
        };
        if let Some(cd) = self.drag_coefficient {
            definition.drag_coefficient = cd;
        }
        Ok(definition)
    }

    /// The table named by `compare_with`: a preset or a published table.
    pub fn comparison_table(&self) -> anyhow::Result<Option<ReferenceTable>> {
        self.compare_with
            .as_deref()
            .map(|name| reference_by_name(name).with_context(|| format!("resolving compare_with '{}'", name)))
            .transpose()
    }
}
