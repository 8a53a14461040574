// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use dropoff_core::{DetectorConfig, DropoffError, RawPoint, RawValue};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reported by the `dropoff` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Dropoff(#[from] DropoffError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },
    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    NotSupported(String),
}

impl CliError {
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Dropoff(err) => err.code(),
            Self::Io { .. } => "io_error",
            Self::Csv { .. } => "csv_error",
            Self::Json { .. } => "json_error",
            Self::NotSupported(_) => "not_supported",
        }
    }
}

/// Rows read from disk, still uncoerced.
#[derive(Clone, Debug)]
pub struct LoadedRows {
    pub path: PathBuf,
    pub format: &'static str,
    pub rows: Vec<RawPoint>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InputSummary {
    pub path: String,
    pub format: &'static str,
    pub rows: usize,
}

impl LoadedRows {
    pub fn summary(&self) -> InputSummary {
        InputSummary {
            path: self.path.display().to_string(),
            format: self.format,
            rows: self.rows.len(),
        }
    }
}

fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))
}

/// Loads `.csv` or `.json` rows, choosing the format by extension.
pub fn load_rows(path: &Path) -> Result<LoadedRows, CliError> {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| {
            CliError::not_supported(format!(
                "unable to infer input format for '{}'; expected .csv or .json",
                path.display()
            ))
        })?;

    let (format, rows) = match extension.as_str() {
        "csv" => ("csv", parse_csv_rows(&read_text(path)?)?),
        "json" => ("json", parse_json_rows(&read_text(path)?)?),
        _ => {
            return Err(CliError::not_supported(format!(
                "unsupported input format '{extension}'; expected .csv or .json"
            )));
        }
    };

    Ok(LoadedRows {
        path: path.to_path_buf(),
        format,
        rows,
    })
}

fn is_numeric(cell: &str) -> bool {
    cell.parse::<f64>().is_ok()
}

fn column_index(header: &csv::StringRecord, name: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.eq_ignore_ascii_case(name))
}

/// Column positions when `first` is a header row, `None` when it is data.
///
/// A header is a row of non-empty, non-numeric cells that either names the
/// `depth` and `rate` columns or is followed by an all-numeric row of the
/// same width.
fn header_columns(
    first: &csv::StringRecord,
    second: Option<&csv::StringRecord>,
) -> Option<(usize, usize)> {
    if first.is_empty() || first.iter().any(|cell| cell.is_empty() || is_numeric(cell)) {
        return None;
    }

    if let (Some(depth), Some(rate)) = (column_index(first, "depth"), column_index(first, "rate")) {
        return Some((depth, rate));
    }

    let second = second?;
    let second_all_numeric = second.len() == first.len()
        && second
            .iter()
            .all(|cell| !cell.is_empty() && is_numeric(cell));
    second_all_numeric.then_some((0, 1))
}

fn cell_value(record: &csv::StringRecord, idx: usize) -> RawValue {
    match record.get(idx) {
        Some(cell) if !cell.is_empty() => RawValue::from(cell),
        _ => RawValue::Missing,
    }
}

/// Parses `depth,rate` CSV text into raw rows.
///
/// Quoted cells are unquoted and rows may vary in width. A leading header
/// row selects the `depth` and `rate` columns by name, otherwise the first
/// two columns are used. Cells are kept as text so malformed values reach
/// the normalizer and are counted there rather than rejected here.
pub fn parse_csv_rows(raw: &str) -> Result<Vec<RawPoint>, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| CliError::csv("invalid series CSV", source))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        records.push(record);
    }

    let Some(first) = records.first() else {
        return Ok(vec![]);
    };

    let (skip, (depth_col, rate_col)) = match header_columns(first, records.get(1)) {
        Some(columns) => (1, columns),
        None => (0, (0, 1)),
    };

    Ok(records
        .iter()
        .skip(skip)
        .map(|record| RawPoint {
            depth: cell_value(record, depth_col),
            rate: cell_value(record, rate_col),
        })
        .collect())
}

/// Parses a JSON array of `{"depth", "rate"}` objects or `[depth, rate]` pairs.
pub fn parse_json_rows(raw: &str) -> Result<Vec<RawPoint>, CliError> {
    serde_json::from_str(raw).map_err(|source| CliError::json("invalid series JSON", source))
}

/// Reads a (possibly partial) [`DetectorConfig`] JSON document.
pub fn load_config(path: &Path) -> Result<DetectorConfig, CliError> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).map_err(|source| {
        CliError::json(format!("invalid config JSON in '{}'", path.display()), source)
    })
}

#[cfg(test)]
mod tests {
    use super::{CliError, load_config, load_rows, parse_csv_rows, parse_json_rows};
    use dropoff_core::{
        DetectorConfig, DropoffError, DuplicatePolicy, RawPoint, RawValue, Series,
    };
    use std::fs;

    #[test]
    fn csv_without_header_reads_first_two_columns() {
        let rows = parse_csv_rows("0,1.5\n10, 2.5\n\n20,3.5,extra\n").expect("csv");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], RawPoint::from(("0", "1.5")));
        assert_eq!(rows[1], RawPoint::from(("10", "2.5")));
        assert_eq!(rows[2], RawPoint::from(("20", "3.5")));
    }

    #[test]
    fn csv_header_can_reorder_columns() {
        let rows = parse_csv_rows("segment,Rate,Depth\na,1.5,0\nb,2.5,10\n").expect("csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawPoint::from(("0", "1.5")));
        assert_eq!(rows[1], RawPoint::from(("10", "2.5")));
    }

    #[test]
    fn csv_keeps_malformed_cells_for_the_normalizer() {
        let rows = parse_csv_rows("depth,rate\n10,\n20,abc\n30").expect("csv");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].rate, RawValue::Missing);
        assert_eq!(rows[1].rate, RawValue::from("abc"));
        assert_eq!(rows[2].rate, RawValue::Missing);
    }

    #[test]
    fn empty_csv_yields_no_rows() {
        assert!(parse_csv_rows("").expect("csv").is_empty());
        assert!(parse_csv_rows("depth,rate\n").expect("csv").is_empty());
        assert!(parse_csv_rows("\n  \n").expect("csv").is_empty());
    }

    #[test]
    fn csv_quoted_cells_are_unquoted() {
        let rows = parse_csv_rows("\"depth\",\"rate\"\n\"0\",\"1.5\"\n\"10\",\"2.5\"\n\"20\",\"9.0\"\n")
            .expect("csv");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], RawPoint::from(("0", "1.5")));
        assert_eq!(rows[2], RawPoint::from(("20", "9.0")));

        let (series, report) = Series::normalize(rows, DuplicatePolicy::Last);
        assert_eq!(series.len(), 3);
        assert_eq!(report.rows_kept, 3);
        assert_eq!(report.dropped_unparsable, 0);
    }

    #[test]
    fn csv_quoted_cell_may_contain_a_comma() {
        let rows = parse_csv_rows("depth,rate,label\n0,1.5,\"top, fold\"\n10,2.5,x\n").expect("csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawPoint::from(("0", "1.5")));
    }

    #[test]
    fn non_numeric_first_row_is_data_unless_a_header() {
        let rows = parse_csv_rows("n/a,n/a\n").expect("csv");
        assert_eq!(rows, vec![RawPoint::from(("n/a", "n/a"))]);

        let rows = parse_csv_rows("n/a,n/a\n10,\n20,2.5\n").expect("csv");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], RawPoint::from(("n/a", "n/a")));

        let (series, report) = Series::normalize(rows, DuplicatePolicy::Last);
        assert_eq!(series.len(), 1);
        assert_eq!(report.rows_seen, 3);
        assert_eq!(report.dropped_unparsable, 2);

        // Unnamed header columns are recognised by the numeric row beneath.
        let rows = parse_csv_rows("x,y\n0,1.5\n10,2.5\n").expect("csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawPoint::from(("0", "1.5")));
    }

    #[test]
    fn json_rows_accept_objects_pairs_and_nulls() {
        let rows = parse_json_rows(r#"[{"depth": 0, "rate": 1}, [10, "2"], [20, null]]"#)
            .expect("json rows should parse");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], RawPoint::from((0.0, 1.0)));
        assert_eq!(rows[1], RawPoint::from((10.0, "2")));
        assert_eq!(rows[2].rate, RawValue::Missing);
    }

    #[test]
    fn json_that_is_not_an_array_is_an_error() {
        let err = parse_json_rows(r#"{"depth": 0}"#).expect_err("object input must fail");
        assert_eq!(err.code(), "json_error");
        assert!(err.to_string().contains("invalid series JSON"));
    }

    #[test]
    fn load_rows_dispatches_on_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let csv_path = dir.path().join("curve.CSV");
        fs::write(&csv_path, "depth,rate\n0,1\n10,2\n").expect("write csv");
        let loaded = load_rows(&csv_path).expect("csv should load");
        assert_eq!(loaded.format, "csv");
        assert_eq!(loaded.summary().rows, 2);

        let json_path = dir.path().join("curve.json");
        fs::write(&json_path, "[[0, 1], [10, 2], [20, 3]]").expect("write json");
        let loaded = load_rows(&json_path).expect("json should load");
        assert_eq!(loaded.format, "json");
        assert_eq!(loaded.rows.len(), 3);

        let err = load_rows(&dir.path().join("curve.npy")).expect_err("npy is unsupported");
        assert_eq!(err.code(), "not_supported");

        let err = load_rows(&dir.path().join("missing.csv")).expect_err("missing file");
        assert_eq!(err.code(), "io_error");
    }

    #[test]
    fn load_config_applies_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"min_gap": 20, "duplicate_policy": "first"}"#).expect("write");
        let config = load_config(&path).expect("config should load");
        assert_eq!(
            config,
            DetectorConfig {
                min_gap: 20,
                duplicate_policy: DuplicatePolicy::First,
                ..DetectorConfig::default()
            }
        );
    }

    #[test]
    fn dropoff_errors_keep_their_code() {
        let err = CliError::from(DropoffError::invalid_config("bad"));
        assert_eq!(err.code(), "invalid_config");
        assert_eq!(err.to_string(), "invalid config: bad");
    }
}
