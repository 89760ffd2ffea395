//! Aggregation Module
//! Groups filtered records by time bucket and category keys and sums
//! registrations per group.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::data::{GroupingMode, RegistrationRecord};

/// Time dimension used for bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeKey {
    Year,
    Quarter,
}

/// One bucket on the time axis.
///
/// Ordering is derived from the year and quarter integers, never from the
/// label string, so chronological order holds for any date range. The label
/// is zero-padded `YYYY Qn`, which happens to sort the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    Year(i32),
    Quarter { year: i32, quarter: u8 },
}

impl TimeBucket {
    fn sort_key(&self) -> (i32, u8) {
        match *self {
            TimeBucket::Year(year) => (year, 0),
            TimeBucket::Quarter { year, quarter } => (year, quarter),
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl Ord for TimeBucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for TimeBucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TimeBucket::Year(year) => write!(f, "{}", year),
            TimeBucket::Quarter { year, quarter } => write!(f, "{} Q{}", year, quarter),
        }
    }
}

impl Serialize for TimeBucket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Summed registrations for one `(bucket, category[, manufacturer])` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub bucket: TimeBucket,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    pub registrations: i64,
}

/// Partition records by `(bucket, category[, manufacturer])` and sum the
/// registration counts within each partition.
///
/// Missing counts contribute zero; rows whose time bucket cannot be derived
/// (unparseable date) are excluded from bucketing. One row per distinct key
/// combination comes back, in deterministic key order. Empty input yields
/// empty output.
pub fn aggregate(
    records: &[RegistrationRecord],
    time_key: TimeKey,
    grouping: GroupingMode,
) -> Vec<AggregateRow> {
    let mut sums: BTreeMap<(String, Option<String>, TimeBucket), i64> = BTreeMap::new();

    for record in records {
        let Some(bucket) = bucket_for(record, time_key) else {
            continue;
        };
        let manufacturer = match grouping {
            GroupingMode::Category => None,
            GroupingMode::CategoryManufacturer => match &record.manufacturer {
                Some(m) => Some(m.clone()),
                None => continue,
            },
        };

        let key = (record.category.clone(), manufacturer, bucket);
        *sums.entry(key).or_insert(0) += record.registrations.unwrap_or(0);
    }

    sums.into_iter()
        .map(|((category, manufacturer, bucket), registrations)| AggregateRow {
            bucket,
            category,
            manufacturer,
            registrations,
        })
        .collect()
}

fn bucket_for(record: &RegistrationRecord, time_key: TimeKey) -> Option<TimeBucket> {
    match time_key {
        TimeKey::Year => record.year.map(TimeBucket::Year),
        TimeKey::Quarter => match (record.year, record.quarter) {
            (Some(year), Some(quarter)) => Some(TimeBucket::Quarter { year, quarter }),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn record(
        year: Option<i32>,
        quarter: Option<u8>,
        category: &str,
        manufacturer: Option<&str>,
        registrations: Option<i64>,
    ) -> RegistrationRecord {
        RegistrationRecord {
            year,
            quarter,
            state: String::new(),
            rto_office: String::new(),
            category: category.to_string(),
            manufacturer: manufacturer.map(str::to_string),
            registrations,
        }
    }

    #[test]
    fn bucket_order_is_chronological() {
        let q4 = TimeBucket::Quarter {
            year: 2023,
            quarter: 4,
        };
        let q1 = TimeBucket::Quarter {
            year: 2024,
            quarter: 1,
        };
        assert!(q4 < q1);
        assert!(TimeBucket::Year(2023) < TimeBucket::Year(2024));

        // The label sorts the same way as the integers.
        assert!(q4.label() < q1.label());
        assert_eq!(q4.label(), "2023 Q4");
    }

    #[test]
    fn sums_match_matching_input_records() {
        let records = vec![
            record(Some(2023), Some(1), "Car", None, Some(100)),
            record(Some(2023), Some(2), "Car", None, Some(40)),
            record(Some(2023), Some(1), "Bus", None, Some(7)),
            record(Some(2024), Some(1), "Car", None, Some(9)),
        ];

        let rows = aggregate(&records, TimeKey::Year, GroupingMode::Category);
        assert_eq!(rows.len(), 3);

        let car_2023 = rows
            .iter()
            .find(|r| r.category == "Car" && r.bucket == TimeBucket::Year(2023))
            .unwrap();
        assert_eq!(car_2023.registrations, 140);

        // Conservation of the unfiltered total.
        let total: i64 = rows.iter().map(|r| r.registrations).sum();
        assert_eq!(total, 156);
    }

    #[test]
    fn buckets_are_unique_per_partition() {
        let records = vec![
            record(Some(2023), Some(1), "Car", Some("Tata"), Some(1)),
            record(Some(2023), Some(1), "Car", Some("Tata"), Some(2)),
            record(Some(2023), Some(1), "Car", Some("Hero"), Some(4)),
        ];
        let rows = aggregate(&records, TimeKey::Quarter, GroupingMode::CategoryManufacturer);

        let mut seen = HashSet::new();
        for row in &rows {
            assert!(seen.insert((
                row.bucket,
                row.category.clone(),
                row.manufacturer.clone()
            )));
        }
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn missing_measures_count_as_zero() {
        let records = vec![
            record(Some(2023), Some(1), "Car", None, Some(10)),
            record(Some(2023), Some(3), "Car", None, None),
        ];
        let rows = aggregate(&records, TimeKey::Year, GroupingMode::Category);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].registrations, 10);
    }

    #[test]
    fn rows_without_buckets_are_skipped() {
        let records = vec![
            record(None, None, "Car", None, Some(10)),
            record(Some(2023), None, "Car", None, Some(5)),
        ];
        // No quarter can be derived for either row.
        assert!(aggregate(&records, TimeKey::Quarter, GroupingMode::Category).is_empty());
        // The second row still has a year.
        let yearly = aggregate(&records, TimeKey::Year, GroupingMode::Category);
        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly[0].registrations, 5);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[], TimeKey::Year, GroupingMode::Category).is_empty());
    }
}
