//! Dataset Loader Module
//! Locates the source CSV, reads it with Polars, and normalizes rows into
//! registration records.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use thiserror::Error;

use super::{Dataset, GroupingMode, RegistrationRecord};

/// Exact header text of the recognized columns.
pub const DATE_COL: &str = "Date (date)";
pub const CATEGORY_COL: &str = "Vehicle Category (vehicle_type)";
pub const REGISTRATIONS_COL: &str = "Registrations (registrations)";
pub const STATE_COL: &str = "State Name (state_name)";
pub const RTO_COL: &str = "RTO Name (office_name)";
pub const MANUFACTURER_COL: &str = "Manufacturer";

/// Candidate file names, manufacturer-inclusive file first.
const MANUFACTURER_FILE: &str = "VAHAN_Vehicle_Registrations_with_Manufacturer.csv";
const SAMPLE_FILE: &str = "VAHAN Vehicle Registrations by Vehicle Category_Sample_Data.csv";

/// Directories probed for each candidate file, in resolution order.
const SEARCH_DIRS: [&str; 3] = ["..", "data", "."];

/// Date formats tried in order; the portal exports have shipped with all of
/// these over time.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(
        "sample data CSV not found; place the VAHAN registrations file in the \
         parent directory, a data/ folder, or the working directory"
    )]
    DataNotFound,
    #[error("required column missing: {0}")]
    MissingColumn(&'static str),
    #[error("failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Return the first existing candidate path under `base_dir`.
///
/// The manufacturer-inclusive file wins over the manufacturer-less sample
/// file; within each, the parent directory wins over `data/` and `data/`
/// over the working directory.
pub fn find_dataset(base_dir: &Path) -> Option<PathBuf> {
    for file in [MANUFACTURER_FILE, SAMPLE_FILE] {
        for dir in SEARCH_DIRS {
            let path = base_dir.join(dir).join(file);
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

/// Resolve and load the default dataset relative to the working directory.
pub fn load_default() -> Result<Dataset, LoaderError> {
    let path = find_dataset(Path::new(".")).ok_or(LoaderError::DataNotFound)?;
    load_path(&path)
}

/// Load and normalize an explicit CSV file.
pub fn load_path(path: &Path) -> Result<Dataset, LoaderError> {
    let df = read_csv(path)?;
    normalize(&df, path)
}

/// Read a CSV with Polars, tolerating malformed cells.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame, PolarsError> {
    LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()
}

/// Turn a raw frame into normalized registration records.
///
/// Unparseable dates and non-numeric registration cells become missing
/// values; the rows are kept. Whether the manufacturer column exists is
/// decided here, once, and fixes the grouping keys for the whole session.
fn normalize(df: &DataFrame, source: &Path) -> Result<Dataset, LoaderError> {
    for required in [DATE_COL, CATEGORY_COL, REGISTRATIONS_COL] {
        if df.column(required).is_err() {
            return Err(LoaderError::MissingColumn(required));
        }
    }

    let grouping = if df.column(MANUFACTURER_COL).is_ok() {
        GroupingMode::CategoryManufacturer
    } else {
        GroupingMode::Category
    };

    let dates = string_values(df, DATE_COL)?;
    let categories = string_values(df, CATEGORY_COL)?;
    let registrations = numeric_values(df, REGISTRATIONS_COL)?;
    let states = optional_string_values(df, STATE_COL);
    let offices = optional_string_values(df, RTO_COL);
    let manufacturers = match grouping {
        GroupingMode::CategoryManufacturer => Some(string_values(df, MANUFACTURER_COL)?),
        GroupingMode::Category => None,
    };

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        // A row without a category can never appear in any view.
        let Some(category) = categories[i].clone() else {
            continue;
        };

        let (year, quarter) = match dates[i].as_deref().and_then(parse_date) {
            Some(date) => (Some(date.year()), Some((date.month0() / 3 + 1) as u8)),
            None => (None, None),
        };

        records.push(RegistrationRecord {
            year,
            quarter,
            state: cell(&states, i),
            rto_office: cell(&offices, i),
            category,
            manufacturer: manufacturers
                .as_ref()
                .map(|m| m[i].clone().unwrap_or_default()),
            registrations: registrations[i],
        });
    }

    Ok(Dataset::new(records, grouping, source.to_path_buf()))
}

/// Parse a date cell; `None` when no known format matches.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Column values as owned strings; nulls become `None`.
fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, PolarsError> {
    let series = df.column(name)?;
    let mut out = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let val = series.get(i)?;
        if val.is_null() {
            out.push(None);
        } else {
            out.push(Some(val.to_string().trim_matches('"').to_string()));
        }
    }
    Ok(out)
}

/// Column values as integers; non-numeric cells become `None`.
fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, PolarsError> {
    let casted = df.column(name)?.cast(&DataType::Int64)?;
    let ca = casted.i64()?;
    Ok(ca.into_iter().collect())
}

/// Values of a display-only column that may be absent entirely.
fn optional_string_values(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    df.column(name).ok()?;
    string_values(df, name).ok()
}

fn cell(values: &Option<Vec<Option<String>>>, i: usize) -> String {
    values
        .as_ref()
        .and_then(|v| v[i].clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str =
        "Date (date),Vehicle Category (vehicle_type),Registrations (registrations),State Name (state_name),RTO Name (office_name)";

    fn write_csv(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn resolution_prefers_manufacturer_file() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app");
        fs::create_dir_all(&base).unwrap();

        write_csv(&base.join(SAMPLE_FILE), HEADER);
        assert_eq!(
            find_dataset(&base).unwrap(),
            base.join(".").join(SAMPLE_FILE)
        );

        write_csv(&base.join("data").join(MANUFACTURER_FILE), HEADER);
        assert_eq!(
            find_dataset(&base).unwrap(),
            base.join("data").join(MANUFACTURER_FILE)
        );

        write_csv(&dir.path().join(MANUFACTURER_FILE), HEADER);
        assert_eq!(
            find_dataset(&base).unwrap(),
            base.join("..").join(MANUFACTURER_FILE)
        );
    }

    #[test]
    fn resolution_fails_without_candidates() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("empty");
        fs::create_dir_all(&base).unwrap();
        assert!(find_dataset(&base).is_none());
    }

    #[test]
    fn bad_cells_become_missing_not_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let body = format!(
            "{HEADER}\n\
             2023-01-15,Two Wheeler,100,Karnataka,RTO Bengaluru\n\
             not-a-date,Two Wheeler,50,Karnataka,RTO Bengaluru\n\
             2023-07-01,Two Wheeler,not-a-number,Karnataka,RTO Bengaluru\n"
        );
        write_csv(&path, &body);

        let ds = load_path(&path).unwrap();
        assert_eq!(ds.grouping(), GroupingMode::Category);
        assert_eq!(ds.len(), 3);

        let records = ds.records();
        assert_eq!(records[0].year, Some(2023));
        assert_eq!(records[0].quarter, Some(1));
        assert_eq!(records[1].year, None);
        assert_eq!(records[1].quarter, None);
        assert_eq!(records[1].registrations, Some(50));
        assert_eq!(records[2].year, Some(2023));
        assert_eq!(records[2].quarter, Some(3));
        assert_eq!(records[2].registrations, None);

        // Missing counts contribute zero to totals.
        assert_eq!(ds.total_registrations(), 150);
    }

    #[test]
    fn manufacturer_column_switches_grouping_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manu.csv");
        let body = format!(
            "{HEADER},Manufacturer\n\
             2023-01-15,Two Wheeler,100,Karnataka,RTO Bengaluru,Hero\n\
             2023-04-20,Two Wheeler,70,Karnataka,RTO Bengaluru,Honda\n"
        );
        write_csv(&path, &body);

        let ds = load_path(&path).unwrap();
        assert_eq!(ds.grouping(), GroupingMode::CategoryManufacturer);
        assert_eq!(ds.manufacturers(), vec!["Hero", "Honda"]);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.csv");
        write_csv(
            &path,
            "Date (date),State Name (state_name)\n2023-01-01,Karnataka\n",
        );

        match load_path(&path) {
            Err(LoaderError::MissingColumn(col)) => assert_eq!(col, CATEGORY_COL),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn csv_feeds_the_aggregation_pipeline() {
        use crate::analysis::{aggregate, compute_growth, TimeKey};

        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.csv");
        let body = format!(
            "{HEADER}\n\
             2022-03-10,Car,100,Karnataka,RTO Bengaluru\n\
             2023-03-10,Car,150,Karnataka,RTO Bengaluru\n\
             2024-03-10,Car,0,Karnataka,RTO Bengaluru\n"
        );
        write_csv(&path, &body);

        let ds = load_path(&path).unwrap();
        let rows = aggregate(ds.records(), TimeKey::Year, ds.grouping());
        let total: i64 = rows.iter().map(|r| r.registrations).sum();
        assert_eq!(total, ds.total_registrations());

        let growth = compute_growth(&rows, ds.grouping());
        assert_eq!(growth[0].growth_percent, None);
        assert_eq!(growth[1].growth_percent, Some(50.0));
        assert_eq!(growth[2].growth_percent, Some(-100.0));
    }

    #[test]
    fn several_date_formats_parse() {
        for raw in ["2023-04-15", "2023/04/15", "15-04-2023", "15/04/2023"] {
            let date = parse_date(raw).unwrap();
            assert_eq!(date.year(), 2023);
            assert_eq!(date.month(), 4);
        }
        assert!(parse_date("").is_none());
        assert!(parse_date("Q2 2023").is_none());
    }
}
