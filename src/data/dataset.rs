//! Dataset Module
//! Normalized registration dataset: record access, filtering and unique values.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Grouping configuration, resolved once when the dataset is loaded.
///
/// Whether the source file carries a manufacturer column decides which keys
/// every downstream aggregation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMode {
    /// No manufacturer column: group by vehicle category only.
    Category,
    /// Manufacturer column present: group by category and manufacturer.
    CategoryManufacturer,
}

impl Default for GroupingMode {
    fn default() -> Self {
        GroupingMode::Category
    }
}

impl GroupingMode {
    pub fn has_manufacturer(&self) -> bool {
        matches!(self, GroupingMode::CategoryManufacturer)
    }
}

/// One normalized row of the source dataset.
///
/// Cells that failed to parse stay in the record as `None`; they are never a
/// reason to drop the row at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRecord {
    /// Calendar year of the registration date; `None` if the date was unparseable.
    pub year: Option<i32>,
    /// Calendar quarter 1..=4, missing together with the year.
    pub quarter: Option<u8>,
    pub state: String,
    pub rto_office: String,
    pub category: String,
    /// Present only when the dataset has a manufacturer column.
    pub manufacturer: Option<String>,
    /// Registration count; `None` when the cell was not numeric.
    pub registrations: Option<i64>,
}

/// Filter selections coming from the control panel.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub years: Vec<i32>,
    pub categories: Vec<String>,
    pub manufacturers: Vec<String>,
}

/// A loaded, normalized dataset.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<RegistrationRecord>,
    grouping: GroupingMode,
    source: PathBuf,
}

impl Dataset {
    pub fn new(records: Vec<RegistrationRecord>, grouping: GroupingMode, source: PathBuf) -> Self {
        Self {
            records,
            grouping,
            source,
        }
    }

    pub fn records(&self) -> &[RegistrationRecord] {
        &self.records
    }

    pub fn grouping(&self) -> GroupingMode {
        self.grouping
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted unique years, excluding rows with unparseable dates.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .records
            .iter()
            .filter_map(|r| r.year)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        years.sort_unstable();
        years
    }

    /// Sorted unique vehicle categories.
    pub fn categories(&self) -> Vec<String> {
        Self::unique_strings(self.records.iter().map(|r| r.category.as_str()))
    }

    /// Sorted unique manufacturers; empty when the column is absent.
    pub fn manufacturers(&self) -> Vec<String> {
        Self::unique_strings(
            self.records
                .iter()
                .filter_map(|r| r.manufacturer.as_deref()),
        )
    }

    /// Sum of all registration counts, missing cells counting as zero.
    pub fn total_registrations(&self) -> i64 {
        self.records
            .iter()
            .map(|r| r.registrations.unwrap_or(0))
            .sum()
    }

    /// Records matching the selected years, categories, and manufacturers.
    ///
    /// Rows with an unparseable date never match a year selection. The
    /// manufacturer filter only applies when the dataset has that column.
    pub fn filter(&self, selection: &FilterSelection) -> Vec<RegistrationRecord> {
        let years: HashSet<i32> = selection.years.iter().copied().collect();
        let categories: HashSet<&str> = selection.categories.iter().map(String::as_str).collect();
        let manufacturers: HashSet<&str> = selection
            .manufacturers
            .iter()
            .map(String::as_str)
            .collect();

        self.records
            .iter()
            .filter(|r| r.year.is_some_and(|y| years.contains(&y)))
            .filter(|r| categories.contains(r.category.as_str()))
            .filter(|r| match (self.grouping, r.manufacturer.as_deref()) {
                (GroupingMode::Category, _) => true,
                (GroupingMode::CategoryManufacturer, Some(m)) => manufacturers.contains(m),
                (GroupingMode::CategoryManufacturer, None) => false,
            })
            .cloned()
            .collect()
    }

    fn unique_strings<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut out: Vec<String> = values
            .collect::<HashSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        out.sort();
        out
    }
}
