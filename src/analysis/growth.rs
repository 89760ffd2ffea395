//! Growth Module
//! Period-over-period percentage change over aggregated registration totals.

use serde::Serialize;

use super::aggregate::{AggregateRow, TimeBucket};
use crate::data::GroupingMode;

/// An aggregate row augmented with the prior bucket's total and the
/// percentage change against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRow {
    pub bucket: TimeBucket,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    pub registrations: i64,
    /// Total of the immediately preceding bucket in the same partition;
    /// absent for the first bucket of a partition.
    pub previous: Option<i64>,
    /// `round((cur - prev) / prev * 100, 2)`; absent when `previous` is
    /// absent or zero, so the division never happens on zero.
    pub growth_percent: Option<f64>,
}

/// Compute period-over-period growth for aggregated rows.
///
/// Rows are sorted by `(partition keys, bucket)` with buckets in
/// chronological order; within each maximal run sharing the partition keys
/// the previous bucket's total feeds the percentage change. The returned
/// rows keep that sort order. Pure: identical input yields identical output.
pub fn compute_growth(rows: &[AggregateRow], grouping: GroupingMode) -> Vec<GrowthRow> {
    let mut sorted: Vec<AggregateRow> = rows.to_vec();
    sorted.sort_by(|a, b| {
        partition_key(a, grouping)
            .cmp(&partition_key(b, grouping))
            .then_with(|| a.bucket.cmp(&b.bucket))
    });

    let mut out = Vec::with_capacity(sorted.len());
    let mut run_key: Option<(Option<String>, String)> = None;
    let mut prev_total: Option<i64> = None;

    for row in sorted {
        let key = partition_key(&row, grouping);
        if run_key.as_ref() != Some(&key) {
            run_key = Some(key);
            prev_total = None;
        }

        let previous = prev_total;
        let growth_percent = match previous {
            Some(prev) if prev != 0 => {
                Some(round2((row.registrations - prev) as f64 / prev as f64 * 100.0))
            }
            _ => None,
        };
        prev_total = Some(row.registrations);

        out.push(GrowthRow {
            bucket: row.bucket,
            category: row.category,
            manufacturer: row.manufacturer,
            registrations: row.registrations,
            previous,
            growth_percent,
        });
    }

    out
}

/// Keys a partition shares across buckets; manufacturer leads when present,
/// matching how the tables are read.
fn partition_key(row: &AggregateRow, grouping: GroupingMode) -> (Option<String>, String) {
    match grouping {
        GroupingMode::Category => (None, row.category.clone()),
        GroupingMode::CategoryManufacturer => (row.manufacturer.clone(), row.category.clone()),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate::{aggregate, TimeKey};
    use crate::data::RegistrationRecord;

    fn agg_row(bucket: TimeBucket, category: &str, registrations: i64) -> AggregateRow {
        AggregateRow {
            bucket,
            category: category.to_string(),
            manufacturer: None,
            registrations,
        }
    }

    fn record(year: i32, category: &str, registrations: i64) -> RegistrationRecord {
        RegistrationRecord {
            year: Some(year),
            quarter: Some(1),
            state: String::new(),
            rto_office: String::new(),
            category: category.to_string(),
            manufacturer: None,
            registrations: Some(registrations),
        }
    }

    #[test]
    fn yearly_growth_scenario() {
        let records = vec![
            record(2022, "Car", 100),
            record(2023, "Car", 150),
            record(2024, "Car", 0),
        ];
        let rows = aggregate(&records, TimeKey::Year, GroupingMode::Category);
        let growth = compute_growth(&rows, GroupingMode::Category);

        assert_eq!(growth.len(), 3);
        assert_eq!(growth[0].previous, None);
        assert_eq!(growth[0].growth_percent, None);
        assert_eq!(growth[1].previous, Some(100));
        assert_eq!(growth[1].growth_percent, Some(50.0));
        assert_eq!(growth[2].previous, Some(150));
        assert_eq!(growth[2].growth_percent, Some(-100.0));
    }

    #[test]
    fn zero_previous_yields_no_growth_figure() {
        let rows = vec![
            agg_row(TimeBucket::Year(2023), "Car", 0),
            agg_row(TimeBucket::Year(2024), "Car", 80),
        ];
        let growth = compute_growth(&rows, GroupingMode::Category);
        assert_eq!(growth[1].previous, Some(0));
        assert_eq!(growth[1].growth_percent, None);
    }

    #[test]
    fn growth_rounds_to_two_decimals() {
        let rows = vec![
            agg_row(TimeBucket::Year(2022), "Car", 300),
            agg_row(TimeBucket::Year(2023), "Car", 400),
        ];
        let growth = compute_growth(&rows, GroupingMode::Category);
        assert_eq!(growth[1].growth_percent, Some(33.33));
    }

    #[test]
    fn partitions_restart_independently() {
        let rows = vec![
            agg_row(TimeBucket::Year(2022), "Car", 10),
            agg_row(TimeBucket::Year(2023), "Car", 20),
            agg_row(TimeBucket::Year(2022), "Bus", 5),
            agg_row(TimeBucket::Year(2023), "Bus", 10),
        ];
        let growth = compute_growth(&rows, GroupingMode::Category);

        // Sorted by category, then chronologically.
        assert_eq!(growth[0].category, "Bus");
        assert_eq!(growth[0].growth_percent, None);
        assert_eq!(growth[1].growth_percent, Some(100.0));
        assert_eq!(growth[2].category, "Car");
        assert_eq!(growth[2].growth_percent, None);
        assert_eq!(growth[3].growth_percent, Some(100.0));
    }

    #[test]
    fn quarterly_buckets_carry_across_year_boundaries() {
        let rows = vec![
            agg_row(
                TimeBucket::Quarter {
                    year: 2023,
                    quarter: 4,
                },
                "Car",
                200,
            ),
            agg_row(
                TimeBucket::Quarter {
                    year: 2024,
                    quarter: 1,
                },
                "Car",
                100,
            ),
        ];
        let growth = compute_growth(&rows, GroupingMode::Category);
        assert_eq!(growth[1].previous, Some(200));
        assert_eq!(growth[1].growth_percent, Some(-50.0));
    }

    #[test]
    fn manufacturer_partitions_do_not_bleed() {
        let mut tata_22 = agg_row(TimeBucket::Year(2022), "Car", 100);
        tata_22.manufacturer = Some("Tata".to_string());
        let mut hero_23 = agg_row(TimeBucket::Year(2023), "Car", 300);
        hero_23.manufacturer = Some("Hero".to_string());
        let mut tata_23 = agg_row(TimeBucket::Year(2023), "Car", 110);
        tata_23.manufacturer = Some("Tata".to_string());

        let growth = compute_growth(
            &[tata_22, hero_23, tata_23],
            GroupingMode::CategoryManufacturer,
        );

        assert_eq!(growth[0].manufacturer.as_deref(), Some("Hero"));
        assert_eq!(growth[0].growth_percent, None);
        assert_eq!(growth[1].manufacturer.as_deref(), Some("Tata"));
        assert_eq!(growth[1].growth_percent, None);
        assert_eq!(growth[2].manufacturer.as_deref(), Some("Tata"));
        assert_eq!(growth[2].growth_percent, Some(10.0));
    }

    #[test]
    fn growth_is_idempotent() {
        let records = vec![
            record(2022, "Car", 100),
            record(2023, "Car", 150),
            record(2022, "Bus", 30),
        ];
        let first = compute_growth(
            &aggregate(&records, TimeKey::Year, GroupingMode::Category),
            GroupingMode::Category,
        );
        let second = compute_growth(
            &aggregate(&records, TimeKey::Year, GroupingMode::Category),
            GroupingMode::Category,
        );
        assert_eq!(first, second);
    }
}
