use super::{check_axes, distance_cell, hundredths_label, velocity_cell};
use ndarray::ArrayView2;
use safetycore::tables::VelocityTable;
use safetycore::SafetyResult;

pub const MPS_TO_FPS: f64 = 3.28084;
const ROW_COLOURS: [&str; 2] = ["#EEEEEE", "#CCCCCC"];

/// Bordered HTML table with a title row; velocities in fps when `fps` is set.
pub fn format_html(
    masses: &[f64],
    distances: &[f64],
    class_names: &[String],
    velocities: ArrayView2<f64>,
    fps: bool,
) -> SafetyResult<String> {
    check_axes(masses, distances, class_names, velocities)?;
    let shown = if fps {
        velocities.mapv(|v| v * MPS_TO_FPS)
    } else {
        velocities.to_owned()
    };

    let mut out = String::from(
        "<table style=\"border: 1px solid black; border-collapse: collapse; width: 100%; font-size: 100%;\" border=\"1\">\n\t<tbody>\n",
    );
    out.push_str(&format!("\t\t<tr bgcolor=\"{}\">\n", ROW_COLOURS[1]));
    out.push_str(&format!(
        "\t\t\t<th style=\"font-size: 120%\" align=\"left\" colspan=\"{}\">VSAF säkerhetstabell för airsoft ({})</th>\n",
        masses.len() + 2,
        if fps { "fps" } else { "m/s" }
    ));
    out.push_str("\t\t</tr>\n");

    out.push_str(&format!("\t\t<tr bgcolor=\"{}\">\n", ROW_COLOURS[1]));
    for word in ["Klass", "S-avstånd"] {
        out.push_str(&format!("\t\t\t<th>{}</th>\n", word));
    }
    for &mass in masses {
        out.push_str(&format!("\t\t\t<th>{}g</th>\n", hundredths_label(mass)));
    }
    out.push_str("\t\t</tr>\n");

    for (idx, ((name, &distance), row)) in class_names
        .iter()
        .zip(distances)
        .zip(shown.outer_iter())
        .enumerate()
    {
        out.push_str(&format!("\t\t<tr bgcolor=\"{}\">\n", ROW_COLOURS[idx % 2]));
        out.push_str(&format!("\t\t\t<td>{}</td>\n", name));
        out.push_str(&format!("\t\t\t<td>{}m</td>\n", distance_cell(distance)));
        for &velocity in row.iter() {
            out.push_str(&format!("\t\t\t<td>{}</td>\n", velocity_cell(velocity)));
        }
        out.push_str("\t\t</tr>\n");
    }

    out.push_str("\t</tbody>\n</table>\n<p> </p>");
    Ok(out)
}

pub fn html_table(table: &VelocityTable, fps: bool) -> SafetyResult<String> {
    format_html(
        table.masses(),
        table.distances(),
        table.class_names(),
        table.velocities().view(),
        fps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names() -> Vec<String> {
        vec!["CQB".into(), "AutoA".into(), "AutoB".into()]
    }

    #[test]
    fn html_has_title_header_and_alternating_rows() {
        let velocities = array![[100.0], [115.8], [132.6]];
        let out = format_html(&[0.000_20], &[0.0, 5.0, 10.0], &names(), velocities.view(), false).unwrap();
        assert!(out.contains("colspan=\"3\">VSAF säkerhetstabell för airsoft (m/s)</th>"));
        assert!(out.contains("<th>Klass</th>"));
        assert!(out.contains("<th>S-avstånd</th>"));
        assert!(out.contains("<th>.20g</th>"));
        assert!(out.contains("<td>5m</td>"));
        assert_eq!(out.matches("bgcolor=\"#EEEEEE\"").count(), 2);
        assert_eq!(out.matches("bgcolor=\"#CCCCCC\"").count(), 3);
    }

    #[test]
    fn fps_converts_a_copy() {
        let velocities = array![[100.0], [115.8], [132.6]];
        let out = format_html(&[0.000_20], &[0.0, 5.0, 10.0], &names(), velocities.view(), true).unwrap();
        assert!(out.contains("(fps)"));
        assert!(out.contains("<td>328.1</td>"));
        assert_eq!(velocities[[0, 0]], 100.0);
    }

    #[test]
    fn mismatched_axes_are_rejected() {
        let velocities = array![[100.0], [115.8]];
        assert!(format_html(&[0.000_20], &[0.0, 5.0, 10.0], &names(), velocities.view(), false).is_err());
    }
}
