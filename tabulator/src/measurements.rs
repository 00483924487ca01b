//! Chronograph CSV files.
//!
//! Layout: two free-text preamble lines, then a header with a `Distance` column
//! and one `Value_*` column per shot. Blank cells are allowed.

use safetycore::estimation::{EmpiricalDataset, Observation};
use std::fs;
use std::path::Path;
use thiserror::Error;

const PREAMBLE_LINES: usize = 2;
const DISTANCE_COLUMN: &str = "Distance";
const SAMPLE_PREFIX: &str = "Value";

#[derive(Debug, Error)]
pub enum MeasurementLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("'{path}' has no '{column}' column")]
    MissingColumn { path: String, column: String },
    #[error("'{path}' line {line}: {reason}")]
    BadRow {
        path: String,
        line: usize,
        reason: String,
    },
    #[error("'{path}' is not a usable dataset: {source}")]
    Dataset {
        path: String,
        source: safetycore::SafetyError,
    },
}

fn parse_cell(path: &str, line: usize, cell: &str) -> Result<f64, MeasurementLoadError> {
    cell.trim()
        .parse::<f64>()
        .map_err(|e| MeasurementLoadError::BadRow {
            path: path.to_string(),
            line,
            reason: format!("'{}' is not a number ({})", cell, e),
        })
}

/// Parses CSV text that has already had its preamble removed.
pub fn parse_observations(path: &str, body: &str) -> Result<Vec<Observation>, MeasurementLoadError> {
    let csv_err = |source| MeasurementLoadError::Csv {
        path: path.to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader.headers().map_err(csv_err)?.clone();
    let distance_idx = headers
        .iter()
        .position(|h| h == DISTANCE_COLUMN)
        .ok_or_else(|| MeasurementLoadError::MissingColumn {
            path: path.to_string(),
            column: DISTANCE_COLUMN.to_string(),
        })?;
    let sample_idx: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with(SAMPLE_PREFIX))
        .map(|(idx, _)| idx)
        .collect();
    if sample_idx.is_empty() {
        return Err(MeasurementLoadError::MissingColumn {
            path: path.to_string(),
            column: format!("{}_*", SAMPLE_PREFIX),
        });
    }

    let mut observations = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        // Header plus preamble precede the first data row.
        let line = row + PREAMBLE_LINES + 2;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let distance_cell = record.get(distance_idx).unwrap_or("");
        let distance = parse_cell(path, line, distance_cell)?;
        let samples = sample_idx
            .iter()
            .filter_map(|&idx| record.get(idx))
            .filter(|cell| !cell.is_empty())
            .map(|cell| parse_cell(path, line, cell))
            .collect::<Result<Vec<_>, _>>()?;
        if samples.is_empty() {
            return Err(MeasurementLoadError::BadRow {
                path: path.to_string(),
                line,
                reason: format!("no samples at {} m", distance),
            });
        }
        observations.push(Observation::new(distance, samples));
    }
    Ok(observations)
}

pub fn load_dataset(name: &str, mass_g: f64, path: &Path) -> Result<EmpiricalDataset, MeasurementLoadError> {
    let display = path.to_string_lossy().to_string();
    let content = fs::read_to_string(path).map_err(|e| MeasurementLoadError::Io {
        path: display.clone(),
        source: e,
    })?;
    let body: String = content
        .lines()
        .skip(PREAMBLE_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let observations = parse_observations(&display, &body)?;
    EmpiricalDataset::new(name, mass_g / 1000.0, observations).map_err(|e| {
        MeasurementLoadError::Dataset {
            path: display,
            source: e,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const SAMPLE: &str = "Krytac 0.30 g\nchronograph session 2\nDistance,Value_1,Value_2,Value_3\n0,120.1,119.9,120.0\n5,112.0,111.0,\n10,104.5,104.5,104.5\n";

    #[test]
    fn load_dataset_skips_preamble_and_blank_cells() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("krytac_30.csv");
        let mut file = File::create(&file_path).unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let dataset = load_dataset("krytac_30", 0.30, &file_path).unwrap();
        assert_eq!(dataset.name(), "krytac_30");
        assert!((dataset.mass() - 0.000_30).abs() < 1e-15);
        assert_eq!(dataset.distances(), vec![0.0, 5.0, 10.0]);
        assert_eq!(dataset.observations()[1].samples, vec![112.0, 111.0]);
        assert!((dataset.muzzle_velocity() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn missing_distance_column_is_reported() {
        let err = parse_observations("inline", "Range,Value_1\n0,120\n").unwrap_err();
        assert!(matches!(err, MeasurementLoadError::MissingColumn { .. }));
    }

    #[test]
    fn unparsable_cell_names_its_line() {
        let err = parse_observations("inline", "Distance,Value_1\n0,120\n5,fast\n").unwrap_err();
        match err {
            MeasurementLoadError::BadRow { line, .. } => assert_eq!(line, 5),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = load_dataset("ghost", 0.25, &dir.path().join("ghost.csv")).unwrap_err();
        assert!(matches!(err, MeasurementLoadError::Io { .. }));
    }
}
