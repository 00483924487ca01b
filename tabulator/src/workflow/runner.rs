use crate::generator::synthetic::build_default_datasets;
use crate::measurements::load_dataset;
use crate::report::html::html_table;
use crate::report::latex::latex_table;
use crate::report::summary::{curve_csv, model_curve, ComparisonSummary, RunSummary, TableSummary};
use crate::report::text::{analyzer_report, drag_fit_report};
use crate::report::writer::ReportWriter;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use safetycore::estimation::{
    CombinedEstimate, DragCoefficientEstimator, EmpiricalDataset, FailurePolicy, FitSettings,
};
use safetycore::physics::DragConstant;
use safetycore::presets::TableDefinition;
use safetycore::tables::{
    impact_energies, muzzle_energies, EnergyTable, TableComparison, VelocityTable,
};
use safetycore::telemetry::LogManager;
use std::path::PathBuf;

pub struct ComparisonResult {
    pub against: String,
    pub old_table: VelocityTable,
    pub comparison: TableComparison,
}

pub struct WorkflowResult {
    pub definition: TableDefinition,
    pub drag: DragConstant,
    pub table: VelocityTable,
    pub muzzle_energies: EnergyTable,
    pub impact_energies: EnergyTable,
    pub datasets: Vec<EmpiricalDataset>,
    pub fit: Option<CombinedEstimate>,
    pub comparison: Option<ComparisonResult>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    fn load_datasets(&self) -> anyhow::Result<Vec<EmpiricalDataset>> {
        let mut datasets = if self.config.fit.synthetic {
            build_default_datasets().context("generating synthetic measurement series")?
        } else {
            Vec::new()
        };
        for source in &self.config.fit.datasets {
            let dataset = load_dataset(&source.name, source.mass_g, &source.path)
                .with_context(|| format!("loading dataset '{}'", source.name))?;
            datasets.push(dataset);
        }
        Ok(datasets)
    }

    fn fit(&self, datasets: &[EmpiricalDataset]) -> anyhow::Result<CombinedEstimate> {
        let estimator = DragCoefficientEstimator::new(FitSettings {
            air: self.config.fit.air(),
            ..Default::default()
        });
        let policy = if self.config.fit.exclude_failed {
            FailurePolicy::ExcludeFailed
        } else {
            FailurePolicy::Strict
        };
        estimator
            .estimate(datasets, policy)
            .context("estimating drag coefficient")
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let logger = LogManager::new("tabulator::runner");

        let mut definition = self
            .config
            .table_definition()
            .context("resolving table definition")?;
        let reference = self.config.comparison_table()?;

        let datasets = self.load_datasets()?;
        let fit = if self.config.fit.is_enabled() {
            Some(self.fit(&datasets)?)
        } else {
            None
        };
        if self.config.fit.use_fitted_coefficient {
            let estimate = fit
                .as_ref()
                .context("use_fitted_coefficient is set but no datasets are configured")?;
            logger.record(&format!(
                "building '{}' with fitted drag coefficient {:.5}",
                definition.title, estimate.drag_coefficient
            ));
            definition.drag_coefficient = estimate.drag_coefficient;
        }

        let air = self.config.air();
        let drag = definition
            .drag_constant(air)
            .context("deriving drag constant")?;
        let table = definition.solve(drag).context("solving velocity table")?;
        let muzzle = muzzle_energies(&table).context("recovering muzzle energies")?;
        let impact = impact_energies(&table, drag).context("recovering impact energies")?;

        let comparison = match reference {
            Some(old) => {
                let old_table = old
                    .build(air)
                    .with_context(|| format!("building comparison table '{}'", old.title()))?;
                let comparison = TableComparison::build(&old_table, &table)
                    .with_context(|| format!("comparing against '{}'", old.title()))?;
                Some(ComparisonResult {
                    against: old.title().to_string(),
                    old_table,
                    comparison,
                })
            }
            None => None,
        };

        logger.record(&format!(
            "'{}' done: {}x{} table, drag constant {}",
            definition.title,
            table.shape().0,
            table.shape().1,
            drag
        ));

        Ok(WorkflowResult {
            definition,
            drag,
            table,
            muzzle_energies: muzzle,
            impact_energies: impact,
            datasets,
            fit,
            comparison,
        })
    }

    pub fn write_reports(&self, result: &WorkflowResult) -> anyhow::Result<Vec<PathBuf>> {
        let writer = ReportWriter::new(&self.config.output_dir);
        let mut written = vec![
            writer.write("latexTable.txt", &latex_table(&result.table)?)?,
            writer.write("htmlTable.html", &html_table(&result.table, self.config.fps)?)?,
        ];

        if let Some(comparison) = &result.comparison {
            let report = analyzer_report(&comparison.old_table, &result.table, &comparison.comparison)
                .context("formatting table comparison")?;
            written.push(writer.write("tableAnalyzerOutput.txt", &report)?);
        }
        if let Some(estimate) = &result.fit {
            written.push(writer.write("dragFitOutput.txt", &drag_fit_report(estimate))?);
            let points = model_curve(&result.datasets, estimate.drag_coefficient, self.config.fit.air())?;
            written.push(writer.write("modelCurve.csv", &curve_csv(&points)?)?);
        }

        let summary = RunSummary {
            table: TableSummary::new(
                &result.definition.title,
                result.definition.drag_coefficient,
                &result.table,
                &result.muzzle_energies,
                &result.impact_energies,
            ),
            fit: result.fit.clone(),
            comparison: result
                .comparison
                .as_ref()
                .map(|c| ComparisonSummary::new(&c.against, &c.comparison)),
        };
        written.push(writer.write("summary.json", &summary.to_json()?)?);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::{DatasetSource, InlineTable, TableSource};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn runner_solves_preset_table() {
        let cfg = WorkflowConfig::from_args("vsaf-2020", None, None, "out".into(), false, false);
        let result = Runner::new(cfg).execute().unwrap();
        assert_eq!(result.table.shape(), (7, 14));
        assert!((result.table.velocities()[[0, 0]] - 100.0).abs() < 1e-9);
        assert!((result.muzzle_energies[[0, 0]] - 1.0).abs() < 1e-9);
        assert!(result.fit.is_none());
        assert!(result.comparison.is_none());
    }

    #[test]
    fn comparison_uses_each_tables_own_constant() {
        let cfg = WorkflowConfig::from_args(
            "classic-2020-cd04",
            None,
            Some("classic-2020".into()),
            "out".into(),
            false,
            false,
        );
        let result = Runner::new(cfg).execute().unwrap();
        let comparison = result.comparison.unwrap();
        assert_eq!(comparison.against, "2020");
        assert_ne!(comparison.old_table.drag(), result.drag);
        assert!(comparison.comparison.velocity_diff.iter().all(|&v| v <= 1e-12));
    }

    #[test]
    fn synthetic_fit_feeds_the_table() {
        let cfg = WorkflowConfig::from_args("vsaf-2020", None, None, "out".into(), false, true);
        let result = Runner::new(cfg).execute().unwrap();
        let estimate = result.fit.as_ref().unwrap();
        assert_eq!(estimate.fits.len(), 5);
        assert_eq!(result.definition.drag_coefficient, estimate.drag_coefficient);
        let expected = estimate.drag_constant(WorkflowConfig::default().air()).unwrap();
        assert_eq!(result.drag, expected);
        assert_eq!(result.table.drag(), expected);
    }

    #[test]
    fn nine_mass_table_compares_against_published_2019() {
        let vsaf = safetycore::presets::vsaf_2020();
        let mut cfg = WorkflowConfig::default();
        cfg.table = TableSource {
            preset: None,
            inline: Some(InlineTable {
                title: "VSAF 2020 (2019 masses)".into(),
                masses_g: vec![0.20, 0.25, 0.28, 0.30, 0.34, 0.36, 0.40, 0.43, 0.45],
                classes: vsaf.classes,
            }),
        };
        cfg.compare_with = Some("vsaf-2019".into());

        let result = Runner::new(cfg).execute().unwrap();
        let comparison = result.comparison.unwrap();
        assert_eq!(comparison.against, "VSAF 2019");
        assert_eq!(comparison.old_table.drag(), DragConstant::NONE);
        assert_eq!(comparison.comparison.velocity_diff.dim(), (7, 9));
        // Both tables put the 0.20 g CQB limit at 100 m/s.
        assert!(comparison.comparison.velocity_diff[[0, 0]].abs() < 1e-9);
    }

    #[test]
    fn tables_of_different_shape_cannot_be_compared() {
        let cfg = WorkflowConfig::from_args(
            "vsaf-2020",
            None,
            Some("classic-2020".into()),
            "out".into(),
            false,
            false,
        );
        assert!(Runner::new(cfg).execute().is_err());
    }

    #[test]
    fn fitted_coefficient_needs_datasets() {
        let mut cfg = WorkflowConfig::default();
        cfg.fit.use_fitted_coefficient = true;
        assert!(Runner::new(cfg).execute().is_err());
    }

    #[test]
    fn missing_measurement_file_aborts_the_run() {
        let dir = tempdir().unwrap();
        let mut cfg = WorkflowConfig::default();
        cfg.fit.datasets.push(DatasetSource {
            name: "ghost".into(),
            mass_g: 0.30,
            path: dir.path().join("ghost.csv"),
        });
        assert!(Runner::new(cfg).execute().is_err());
    }

    #[test]
    fn reports_land_in_output_dir() {
        let dir = tempdir().unwrap();
        let cfg = WorkflowConfig::from_args(
            "classic-2020-cd04",
            None,
            Some("classic-2020".into()),
            dir.path().join("output"),
            true,
            true,
        );
        let runner = Runner::new(cfg);
        let result = runner.execute().unwrap();
        let written = runner.write_reports(&result).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "latexTable.txt",
                "htmlTable.html",
                "tableAnalyzerOutput.txt",
                "dragFitOutput.txt",
                "modelCurve.csv",
                "summary.json",
            ]
        );
        let html = fs::read_to_string(dir.path().join("output").join("htmlTable.html")).unwrap();
        assert!(html.contains("(fps)"));
        let fit = fs::read_to_string(dir.path().join("output").join("dragFitOutput.txt")).unwrap();
        assert!(fit.contains("Final result, drag coefficient:"));
    }
}
