use super::{check_axes, distance_cell, hundredths_label, velocity_cell};
use ndarray::ArrayView2;
use safetycore::tables::VelocityTable;
use safetycore::SafetyResult;

const SEPARATOR: &str = "\t&\t";
const LINE_ENDING: &str = "\t\\\\";
const HLINE: &str = "\\hline\n";

fn bold(text: &str) -> String {
    format!("{{\\bf {}}}", text)
}

/// Table body for a LaTeX `tabular`, one row per class.
pub fn format_latex(
    masses: &[f64],
    distances: &[f64],
    class_names: &[String],
    velocities: ArrayView2<f64>,
) -> SafetyResult<String> {
    check_axes(masses, distances, class_names, velocities)?;

    let mut header = [bold("Class"), bold("Safety distance")].join(SEPARATOR);
    for &mass in masses {
        header.push_str(SEPARATOR);
        header.push_str(&bold(&hundredths_label(mass)));
    }
    header.push_str(LINE_ENDING);

    let mut out = format!("{}{}\n{}{}", HLINE, header, HLINE, HLINE);
    for ((name, &distance), row) in class_names.iter().zip(distances).zip(velocities.outer_iter()) {
        out.push_str(name);
        out.push_str(SEPARATOR);
        out.push_str(&distance_cell(distance));
        for &velocity in row.iter() {
            out.push_str(SEPARATOR);
            out.push_str(&velocity_cell(velocity));
        }
        out.push_str(LINE_ENDING);
        out.push('\n');
        out.push_str(HLINE);
    }
    Ok(out)
}

pub fn latex_table(table: &VelocityTable) -> SafetyResult<String> {
    format_latex(
        table.masses(),
        table.distances(),
        table.class_names(),
        table.velocities().view(),
    )
}
