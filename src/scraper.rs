//! Scraper Stub Module
//! Placeholder for fetching per-year, per-vehicle-type data from the VAHAN
//! portal. The portal serves its tables through dynamic JS and POST
//! requests, so no scraping happens here: the fetch only picks up a
//! manually downloaded CSV from a deterministic drop path.

use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, PolarsError};
use thiserror::Error;

use crate::data::loader;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("no downloaded data for {year} - {vehicle_type}; save it as {path} and retry")]
    DataNotFound {
        year: i32,
        vehicle_type: String,
        path: String,
    },
    #[error("failed to read downloaded data: {0}")]
    Csv(#[from] PolarsError),
}

/// Drop path for a year/vehicle-type download, spaces replaced by
/// underscores: `data/vehicle_data_{year}_{vehicle_type}.csv`.
pub fn download_path(base_dir: &Path, year: i32, vehicle_type: &str) -> PathBuf {
    base_dir.join("data").join(format!(
        "vehicle_data_{}_{}.csv",
        year,
        vehicle_type.replace(' ', "_")
    ))
}

/// Return the parsed contents of a pre-downloaded per-year/type CSV, or a
/// `DataNotFound` instructing the operator where to place the file.
/// Performs no network I/O.
pub fn fetch(year: i32, vehicle_type: &str) -> Result<DataFrame, ScrapeError> {
    fetch_from(Path::new("."), year, vehicle_type)
}

/// Like [`fetch`], relative to an explicit base directory.
pub fn fetch_from(base_dir: &Path, year: i32, vehicle_type: &str) -> Result<DataFrame, ScrapeError> {
    let path = download_path(base_dir, year, vehicle_type);
    if !path.exists() {
        return Err(ScrapeError::DataNotFound {
            year,
            vehicle_type: vehicle_type.to_string(),
            path: path.display().to_string(),
        });
    }
    Ok(loader::read_csv(&path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reports_drop_path() {
        let dir = tempdir().unwrap();
        let err = fetch_from(dir.path(), 2025, "FOUR WHEELER").unwrap_err();
        match err {
            ScrapeError::DataNotFound {
                year,
                vehicle_type,
                path,
            } => {
                assert_eq!(year, 2025);
                assert_eq!(vehicle_type, "FOUR WHEELER");
                assert!(path.ends_with("vehicle_data_2025_FOUR_WHEELER.csv"));
            }
            other => panic!("expected DataNotFound, got {other:?}"),
        }
    }

    #[test]
    fn present_file_is_parsed() {
        let dir = tempdir().unwrap();
        let path = download_path(dir.path(), 2024, "TWO WHEELER");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "Vehicle Class,Registrations\nMotor Cycle,120\n").unwrap();

        let df = fetch_from(dir.path(), 2024, "TWO WHEELER").unwrap();
        assert_eq!(df.height(), 1);
        assert!(df.column("Vehicle Class").is_ok());
    }
}
