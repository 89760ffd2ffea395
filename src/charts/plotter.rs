//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use std::collections::BTreeMap;

use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::analysis::{AggregateRow, GrowthRow, TimeBucket};
use crate::data::GroupingMode;

/// Color palette for chart series
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const POSITIVE_COLOR: Color32 = Color32::from_rgb(40, 167, 69);
const NEGATIVE_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

/// Everything the dashboard shows for one filter selection.
#[derive(Clone)]
pub struct DashboardData {
    pub grouping: GroupingMode,
    pub yearly: Vec<AggregateRow>,
    pub yoy: Vec<GrowthRow>,
    pub qoq: Vec<GrowthRow>,
    pub total_registrations: i64,
    pub record_count: usize,
}

/// Creates the dashboard charts and tables using egui_plot and egui grids.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Sorted unique buckets of an aggregate view.
    pub(crate) fn buckets(rows: &[AggregateRow]) -> Vec<TimeBucket> {
        let mut buckets: Vec<TimeBucket> = rows.iter().map(|r| r.bucket).collect();
        buckets.sort();
        buckets.dedup();
        buckets
    }

    /// Sum per (series label, bucket); the label dimension is the category
    /// or, for the manufacturer trend chart, the manufacturer.
    pub(crate) fn bar_series(
        rows: &[AggregateRow],
        by_manufacturer: bool,
    ) -> BTreeMap<String, BTreeMap<TimeBucket, i64>> {
        let mut series: BTreeMap<String, BTreeMap<TimeBucket, i64>> = BTreeMap::new();
        for row in rows {
            let label = if by_manufacturer {
                row.manufacturer.clone().unwrap_or_default()
            } else {
                row.category.clone()
            };
            *series
                .entry(label)
                .or_default()
                .entry(row.bucket)
                .or_insert(0) += row.registrations;
        }
        series
    }

    /// Grouped bar chart of totals per time bucket, one bar group per series.
    pub fn draw_totals_chart(
        ui: &mut egui::Ui,
        id: &str,
        rows: &[AggregateRow],
        by_manufacturer: bool,
    ) {
        let buckets = Self::buckets(rows);
        if buckets.is_empty() {
            ui.label(RichText::new("No data for this selection").color(Color32::GRAY));
            return;
        }
        let series = Self::bar_series(rows, by_manufacturer);

        let n_series = series.len().max(1);
        let group_width = 0.8;
        let bar_width = group_width / n_series as f64;

        let mut charts = Vec::with_capacity(series.len());
        for (s_idx, (label, per_bucket)) in series.iter().enumerate() {
            let mut bars = Vec::new();
            for (b_idx, bucket) in buckets.iter().enumerate() {
                if let Some(&value) = per_bucket.get(bucket) {
                    let x = b_idx as f64 - group_width / 2.0 + bar_width * (s_idx as f64 + 0.5);
                    bars.push(Bar::new(x, value as f64).width(bar_width * 0.9));
                }
            }
            charts.push(
                BarChart::new(bars)
                    .name(label)
                    .color(Self::series_color(s_idx)),
            );
        }

        let labels: Vec<String> = buckets.iter().map(TimeBucket::label).collect();
        Plot::new(id.to_string())
            .height(260.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .y_axis_label("Registrations")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 && (idx as usize) < labels.len() {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    /// Growth lines per partition with markers; buckets with no growth
    /// figure break the line instead of plotting zero.
    pub fn draw_growth_chart(
        ui: &mut egui::Ui,
        id: &str,
        rows: &[GrowthRow],
        grouping: GroupingMode,
    ) {
        let mut buckets: Vec<TimeBucket> = rows.iter().map(|r| r.bucket).collect();
        buckets.sort();
        buckets.dedup();
        if buckets.is_empty() {
            ui.label(RichText::new("No data for this selection").color(Color32::GRAY));
            return;
        }
        let index_of = |bucket: TimeBucket| {
            buckets.iter().position(|b| *b == bucket).unwrap_or(0) as f64
        };

        // Partition rows by their display label; the input order is already
        // (partition, chronological).
        let mut partitions: BTreeMap<String, Vec<(f64, Option<f64>)>> = BTreeMap::new();
        for row in rows {
            let label = Self::partition_label(row, grouping);
            partitions
                .entry(label)
                .or_default()
                .push((index_of(row.bucket), row.growth_percent));
        }

        let labels: Vec<String> = buckets.iter().map(TimeBucket::label).collect();
        Plot::new(id.to_string())
            .height(260.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .y_axis_label("Growth %")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 && (idx as usize) < labels.len() {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (p_idx, (label, points)) in partitions.iter().enumerate() {
                    let color = Self::series_color(p_idx);

                    // Contiguous runs of defined growth values.
                    let mut segment: Vec<[f64; 2]> = Vec::new();
                    let mut markers: Vec<[f64; 2]> = Vec::new();
                    for &(x, growth) in points {
                        match growth {
                            Some(pct) => {
                                segment.push([x, pct]);
                                markers.push([x, pct]);
                            }
                            None => {
                                Self::flush_segment(plot_ui, &mut segment, label, color);
                            }
                        }
                    }
                    Self::flush_segment(plot_ui, &mut segment, label, color);

                    if !markers.is_empty() {
                        plot_ui.points(
                            Points::new(PlotPoints::from_iter(markers.into_iter()))
                                .radius(3.0)
                                .color(color)
                                .name(label),
                        );
                    }
                }
            });
    }

    fn flush_segment(
        plot_ui: &mut egui_plot::PlotUi,
        segment: &mut Vec<[f64; 2]>,
        label: &str,
        color: Color32,
    ) {
        if segment.len() > 1 {
            plot_ui.line(
                Line::new(PlotPoints::from_iter(segment.iter().copied()))
                    .color(color)
                    .width(1.5)
                    .name(label),
            );
        }
        segment.clear();
    }

    fn partition_label(row: &GrowthRow, grouping: GroupingMode) -> String {
        match grouping {
            GroupingMode::Category => row.category.clone(),
            GroupingMode::CategoryManufacturer => format!(
                "{} / {}",
                row.manufacturer.clone().unwrap_or_default(),
                row.category
            ),
        }
    }

    /// Aggregate table: one row per (bucket, category[, manufacturer]).
    pub fn draw_aggregate_table(ui: &mut egui::Ui, id: &str, rows: &[AggregateRow], grouping: GroupingMode) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(id.to_string()))
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        Self::header(ui, "Period");
                        Self::header(ui, "Vehicle Category");
                        if grouping.has_manufacturer() {
                            Self::header(ui, "Manufacturer");
                        }
                        Self::header(ui, "Registrations");
                        ui.end_row();

                        for row in rows {
                            ui.label(RichText::new(row.bucket.label()).size(11.0));
                            ui.label(RichText::new(&row.category).size(11.0));
                            if grouping.has_manufacturer() {
                                ui.label(
                                    RichText::new(row.manufacturer.as_deref().unwrap_or("-"))
                                        .size(11.0),
                                );
                            }
                            ui.label(RichText::new(row.registrations.to_string()).size(11.0));
                            ui.end_row();
                        }
                    });
            });
    }

    /// Growth table with the previous-period total and the percentage
    /// change; missing figures render as "-".
    pub fn draw_growth_table(
        ui: &mut egui::Ui,
        id: &str,
        rows: &[GrowthRow],
        grouping: GroupingMode,
        growth_title: &str,
    ) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(id.to_string()))
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        Self::header(ui, "Period");
                        Self::header(ui, "Vehicle Category");
                        if grouping.has_manufacturer() {
                            Self::header(ui, "Manufacturer");
                        }
                        Self::header(ui, "Registrations");
                        Self::header(ui, "Previous");
                        Self::header(ui, growth_title);
                        ui.end_row();

                        for row in rows {
                            ui.label(RichText::new(row.bucket.label()).size(11.0));
                            ui.label(RichText::new(&row.category).size(11.0));
                            if grouping.has_manufacturer() {
                                ui.label(
                                    RichText::new(row.manufacturer.as_deref().unwrap_or("-"))
                                        .size(11.0),
                                );
                            }
                            ui.label(RichText::new(row.registrations.to_string()).size(11.0));
                            match row.previous {
                                Some(prev) => {
                                    ui.label(RichText::new(prev.to_string()).size(11.0))
                                }
                                None => ui.label(RichText::new("-").size(11.0)),
                            };
                            match row.growth_percent {
                                Some(pct) => {
                                    let color = if pct < 0.0 {
                                        NEGATIVE_COLOR
                                    } else {
                                        POSITIVE_COLOR
                                    };
                                    ui.label(
                                        RichText::new(format!("{:+.2}%", pct))
                                            .size(11.0)
                                            .color(color),
                                    )
                                }
                                None => ui.label(RichText::new("-").size(11.0)),
                            };
                            ui.end_row();
                        }
                    });
            });
    }

    fn header(ui: &mut egui::Ui, text: &str) {
        ui.label(RichText::new(text).strong().size(11.0));
    }
}
