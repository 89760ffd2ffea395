//! Static Chart Renderer
//! Renders the dashboard charts to a PNG with plotters so results can be
//! shared outside the app.
//!
//! Layout, top to bottom:
//! 1. Total registrations per year, grouped bars
//! 2. Year-over-year growth lines
//! 3. Quarter-over-quarter growth lines

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;

use super::plotter::{ChartPlotter, DashboardData, PALETTE};
use crate::analysis::{GrowthRow, TimeBucket};
use crate::data::GroupingMode;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the dashboard into an RGB buffer and encode it as PNG.
    pub fn render_png(data: &DashboardData, path: &Path, width: u32, height: u32) -> Result<()> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| anyhow!("failed to clear canvas: {e}"))?;

            let areas = root.split_evenly((3, 1));
            Self::draw_totals(&areas[0], data)?;
            Self::draw_growth(
                &areas[1],
                "Year-over-Year Growth",
                &data.yoy,
                data.grouping,
            )?;
            Self::draw_growth(
                &areas[2],
                "Quarter-over-Quarter Growth",
                &data.qoq,
                data.grouping,
            )?;

            root.present()
                .map_err(|e| anyhow!("failed to finalize chart: {e}"))?;
        }

        image::save_buffer(path, &buffer, width, height, image::ExtendedColorType::Rgb8)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn series_color(index: usize) -> RGBColor {
        let c = PALETTE[index % PALETTE.len()];
        RGBColor(c.r(), c.g(), c.b())
    }

    fn draw_totals(area: &DrawingArea<BitMapBackend, Shift>, data: &DashboardData) -> Result<()> {
        let buckets = ChartPlotter::buckets(&data.yearly);
        if buckets.is_empty() {
            return Ok(());
        }
        let series = ChartPlotter::bar_series(&data.yearly, false);

        let max_y = series
            .values()
            .flat_map(|per_bucket| per_bucket.values())
            .copied()
            .max()
            .unwrap_or(0)
            .max(1) as f64
            * 1.1;

        let mut chart = ChartBuilder::on(area)
            .caption("Total Registrations by Year", ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(buckets.len() as f64 - 0.5), 0f64..max_y)
            .map_err(|e| anyhow!("failed to build totals chart: {e}"))?;

        let labels: Vec<String> = buckets.iter().map(TimeBucket::label).collect();
        let formatter = |x: &f64| -> String {
            let idx = x.round();
            if (idx - *x).abs() < 0.3 && idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(buckets.len())
            .x_label_formatter(&formatter)
            .y_desc("Registrations")
            .draw()
            .map_err(|e| anyhow!("failed to draw totals mesh: {e}"))?;

        let n_series = series.len().max(1);
        let group_width = 0.8;
        let bar_width = group_width / n_series as f64;

        for (s_idx, (label, per_bucket)) in series.iter().enumerate() {
            let color = Self::series_color(s_idx);
            let mut bars = Vec::new();
            for (b_idx, bucket) in buckets.iter().enumerate() {
                if let Some(&value) = per_bucket.get(bucket) {
                    let x0 = b_idx as f64 - group_width / 2.0 + bar_width * s_idx as f64;
                    bars.push(Rectangle::new(
                        [(x0, 0.0), (x0 + bar_width * 0.9, value as f64)],
                        color.filled(),
                    ));
                }
            }
            chart
                .draw_series(bars)
                .map_err(|e| anyhow!("failed to draw bars: {e}"))?
                .label(label.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 4), (x + 8, y + 4)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(|e| anyhow!("failed to draw legend: {e}"))?;
        Ok(())
    }

    fn draw_growth(
        area: &DrawingArea<BitMapBackend, Shift>,
        title: &str,
        rows: &[GrowthRow],
        grouping: GroupingMode,
    ) -> Result<()> {
        let mut buckets: Vec<TimeBucket> = rows.iter().map(|r| r.bucket).collect();
        buckets.sort();
        buckets.dedup();
        if buckets.is_empty() {
            return Ok(());
        }

        let values: Vec<f64> = rows.iter().filter_map(|r| r.growth_percent).collect();
        let (mut y_min, mut y_max) = values.iter().fold((0.0f64, 0.0f64), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
        let pad = ((y_max - y_min) * 0.1).max(5.0);
        y_min -= pad;
        y_max += pad;

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(buckets.len() as f64 - 0.5), y_min..y_max)
            .map_err(|e| anyhow!("failed to build growth chart: {e}"))?;

        let labels: Vec<String> = buckets.iter().map(TimeBucket::label).collect();
        let formatter = |x: &f64| -> String {
            let idx = x.round();
            if (idx - *x).abs() < 0.3 && idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(buckets.len())
            .x_label_formatter(&formatter)
            .y_desc("Growth %")
            .draw()
            .map_err(|e| anyhow!("failed to draw growth mesh: {e}"))?;

        // Partition rows the same way the interactive chart does.
        let mut partitions: std::collections::BTreeMap<String, Vec<(f64, f64)>> =
            std::collections::BTreeMap::new();
        let index_of = |bucket: TimeBucket| {
            buckets.iter().position(|b| *b == bucket).unwrap_or(0) as f64
        };
        for row in rows {
            if let Some(pct) = row.growth_percent {
                let label = match grouping {
                    GroupingMode::Category => row.category.clone(),
                    GroupingMode::CategoryManufacturer => format!(
                        "{} / {}",
                        row.manufacturer.clone().unwrap_or_default(),
                        row.category
                    ),
                };
                partitions
                    .entry(label)
                    .or_default()
                    .push((index_of(row.bucket), pct));
            }
        }

        for (p_idx, (label, points)) in partitions.iter().enumerate() {
            let color = Self::series_color(p_idx);
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color))
                .map_err(|e| anyhow!("failed to draw growth line: {e}"))?
                .label(label.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 12, y)], color)
                });
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                )
                .map_err(|e| anyhow!("failed to draw growth markers: {e}"))?;
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(|e| anyhow!("failed to draw legend: {e}"))?;
        Ok(())
    }
}
