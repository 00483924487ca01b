//! Plain-text reports in the layout of the analysis scripts they replace.

use ndarray::ArrayView2;
use safetycore::estimation::CombinedEstimate;
use safetycore::tables::{TableComparison, VelocityTable};
use safetycore::SafetyResult;

fn format_vector(values: &[f64], precision: usize) -> String {
    let cells: Vec<String> = values.iter().map(|v| format!("{:.*}", precision, v)).collect();
    format!("[{}]", cells.join(", "))
}

/// Labelled matrix; continuation rows are indented under the first one.
fn format_matrix(label: &str, matrix: ArrayView2<f64>, precision: usize) -> String {
    let indent = " ".repeat(label.len() + 2);
    let rows: Vec<String> = matrix
        .outer_iter()
        .map(|row| format_vector(&row.to_vec(), precision))
        .collect();
    format!("{} [{}]", label, rows.join(&format!(",\n{}", indent)))
}

/// Side-by-side review of two tables built over the same axes.
pub fn analyzer_report(
    old: &VelocityTable,
    new: &VelocityTable,
    comparison: &TableComparison,
) -> SafetyResult<String> {
    if old.shape() != new.shape() {
        return Err(safetycore::SafetyError::ShapeMismatch {
            expected: old.shape(),
            found: new.shape(),
        });
    }
    let masses_g: Vec<f64> = old.masses().iter().map(|m| m * 1000.0).collect();
    let lines = [
        format!("Masses {}", format_vector(&masses_g, 2)),
        format!("Distances {}", format_vector(old.distances(), 1)),
        format_matrix("MuzzleVelocitiesOld", old.velocities().view(), 1),
        format_matrix("MuzzleVelocitiesNew", new.velocities().view(), 1),
        format_matrix("MuzzleVelocityDiff", comparison.velocity_diff.view(), 1),
        format_matrix("MuzzleEnergyOld", comparison.muzzle_energy_old.view(), 3),
        format_matrix("MuzzleEnergyNew", comparison.muzzle_energy_new.view(), 3),
        format_matrix("MuzzleEnergyDiff", comparison.muzzle_energy_diff.view(), 3),
        format_matrix("ImpactEnergyOld", comparison.impact_energy_old.view(), 3),
        format_matrix("ImpactEnergyNew", comparison.impact_energy_new.view(), 3),
        format_matrix("ImpactEnergyDiff", comparison.impact_energy_diff.view(), 3),
    ];
    Ok(lines.join("\n") + "\n")
}

pub fn drag_fit_report(estimate: &CombinedEstimate) -> String {
    let coefficients: Vec<f64> = estimate.fits.iter().map(|f| f.drag_coefficient).collect();
    let std_devs: Vec<f64> = estimate.fits.iter().map(|f| f.std_dev()).collect();
    let names: Vec<&str> = estimate.fits.iter().map(|f| f.dataset.as_str()).collect();

    let mut lines = vec![
        format!("Datasets: {}", names.join(", ")),
        format!("Drag coefficients: {}", format_vector(&coefficients, 5)),
        format!("Mean drag coefficient: {}", estimate.unweighted_mean),
        format!("Weighted mean drag coefficient: {}", estimate.drag_coefficient),
        format!("Standard deviations: {}", format_vector(&std_devs, 6)),
        format!("Combined standard deviation: {}", estimate.std_dev),
        format!(
            "Final result, drag coefficient: {:.5} +- {:.6}",
            estimate.drag_coefficient, estimate.std_dev
        ),
        format!(
            "Model prediction mean square error: {:.3} m/s",
            estimate.model_rms_error
        ),
    ];
    if !estimate.excluded.is_empty() {
        lines.push(format!("Excluded datasets: {}", estimate.excluded.join(", ")));
    }
    lines.join("\n") + "\n"
}
