//! Chart Viewer Widget
//! Central scrollable panel with the dashboard cards: totals, YoY growth
//! and QoQ growth, each as a chart plus its table.

use egui::{Color32, RichText, ScrollArea};

use crate::charts::{ChartPlotter, DashboardData};

const CARD_SPACING: f32 = 15.0;
const ACCENT_COLOR: Color32 = Color32::from_rgb(100, 149, 237);
const TABLE_HEIGHT: f32 = 220.0;

/// Scrollable dashboard display area.
pub struct ChartViewer {
    pub data: Option<DashboardData>,
    placeholder: String,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            data: None,
            placeholder: "No Data".to_string(),
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }

    pub fn set_data(&mut self, data: DashboardData) {
        self.data = Some(data);
    }

    /// Message shown while no data is available, e.g. the loader's
    /// instructions when no candidate file exists.
    pub fn set_placeholder(&mut self, message: &str) {
        self.placeholder = message.to_string();
    }

    /// Draw the dashboard cards
    pub fn show(&mut self, _ctx: &egui::Context, ui: &mut egui::Ui) {
        let Some(data) = self.data.clone() else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new(&self.placeholder)
                        .size(16.0)
                        .color(Color32::GRAY),
                );
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_summary(ui, &data);
                ui.add_space(CARD_SPACING);

                Self::draw_card(ui, "Total Registrations by Year", |ui| {
                    ChartPlotter::draw_totals_chart(ui, "totals_by_category", &data.yearly, false);
                    if data.grouping.has_manufacturer() {
                        ui.add_space(8.0);
                        ui.label(
                            RichText::new("Trend by Manufacturer")
                                .size(13.0)
                                .strong(),
                        );
                        ChartPlotter::draw_totals_chart(
                            ui,
                            "totals_by_manufacturer",
                            &data.yearly,
                            true,
                        );
                    }
                    ui.add_space(8.0);
                    ScrollArea::vertical()
                        .id_salt("yearly_table")
                        .max_height(TABLE_HEIGHT)
                        .show(ui, |ui| {
                            ChartPlotter::draw_aggregate_table(
                                ui,
                                "yearly_agg",
                                &data.yearly,
                                data.grouping,
                            );
                        });
                });
                ui.add_space(CARD_SPACING);

                Self::draw_card(ui, "Year-over-Year (YoY) Growth", |ui| {
                    ChartPlotter::draw_growth_chart(ui, "yoy_growth", &data.yoy, data.grouping);
                    ui.add_space(8.0);
                    ScrollArea::vertical()
                        .id_salt("yoy_table")
                        .max_height(TABLE_HEIGHT)
                        .show(ui, |ui| {
                            ChartPlotter::draw_growth_table(
                                ui,
                                "yoy_rows",
                                &data.yoy,
                                data.grouping,
                                "YoY Growth %",
                            );
                        });
                });
                ui.add_space(CARD_SPACING);

                Self::draw_card(ui, "Quarter-over-Quarter (QoQ) Growth", |ui| {
                    ChartPlotter::draw_growth_chart(ui, "qoq_growth", &data.qoq, data.grouping);
                    ui.add_space(8.0);
                    ScrollArea::vertical()
                        .id_salt("qoq_table")
                        .max_height(TABLE_HEIGHT)
                        .show(ui, |ui| {
                            ChartPlotter::draw_growth_table(
                                ui,
                                "qoq_rows",
                                &data.qoq,
                                data.grouping,
                                "QoQ Growth %",
                            );
                        });
                });
                ui.add_space(CARD_SPACING);
            });
    }

    fn draw_summary(ui: &mut egui::Ui, data: &DashboardData) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ACCENT_COLOR))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!(
                            "Total Registrations: {}",
                            data.total_registrations
                        ))
                        .size(15.0)
                        .strong()
                        .color(ACCENT_COLOR),
                    );
                    ui.add_space(20.0);
                    ui.label(
                        RichText::new(format!("Matching records: {}", data.record_count))
                            .size(13.0),
                    );
                    ui.add_space(20.0);
                    let mode = if data.grouping.has_manufacturer() {
                        "category + manufacturer"
                    } else {
                        "category"
                    };
                    ui.label(RichText::new(format!("Grouped by {}", mode)).size(13.0));
                });
            });
    }

    fn draw_card(ui: &mut egui::Ui, title: &str, body: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, ACCENT_COLOR))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(
                        RichText::new(title)
                            .size(18.0)
                            .strong()
                            .color(ACCENT_COLOR),
                    );
                    ui.add_space(10.0);
                    body(ui);
                });
            });
    }
}
