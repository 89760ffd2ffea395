//! Report Export Module
//! Writes the computed aggregate and growth tables as a single JSON report.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::{AggregateRow, GrowthRow};

/// Full report payload: yearly totals plus both growth views.
///
/// Buckets serialize as their display labels; missing previous totals and
/// growth figures serialize as `null`.
#[derive(Serialize)]
pub struct Report<'a> {
    pub yearly: &'a [AggregateRow],
    pub yoy_growth: &'a [GrowthRow],
    pub qoq_growth: &'a [GrowthRow],
}

/// Serialize the report as pretty-printed JSON at `path`.
pub fn write_report_json(report: &Report<'_>, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .context("failed to serialize report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TimeBucket;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn report_round_trips_with_null_growth() {
        let yearly = vec![AggregateRow {
            bucket: TimeBucket::Year(2023),
            category: "Car".to_string(),
            manufacturer: None,
            registrations: 150,
        }];
        let yoy = vec![GrowthRow {
            bucket: TimeBucket::Year(2023),
            category: "Car".to_string(),
            manufacturer: None,
            registrations: 150,
            previous: None,
            growth_percent: None,
        }];
        let qoq = vec![GrowthRow {
            bucket: TimeBucket::Quarter {
                year: 2023,
                quarter: 2,
            },
            category: "Car".to_string(),
            manufacturer: None,
            registrations: 90,
            previous: Some(60),
            growth_percent: Some(50.0),
        }];

        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(
            &Report {
                yearly: &yearly,
                yoy_growth: &yoy,
                qoq_growth: &qoq,
            },
            &path,
        )
        .unwrap();

        let parsed: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["yearly"][0]["bucket"], "2023");
        assert_eq!(parsed["yearly"][0]["registrations"], 150);
        assert!(parsed["yoy_growth"][0]["growth_percent"].is_null());
        assert_eq!(parsed["qoq_growth"][0]["bucket"], "2023 Q2");
        assert_eq!(parsed["qoq_growth"][0]["growth_percent"], 50.0);
    }
}
