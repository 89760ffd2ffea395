//! Control Panel Widget
//! Left side panel with data source, filters, portal fetch and export controls.

use std::path::PathBuf;

use egui::{Color32, RichText, ScrollArea};

use crate::data::{Dataset, FilterSelection};

/// User inputs kept across frames.
#[derive(Clone)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub fetch_year: String,
    pub fetch_vehicle_type: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            csv_path: None,
            fetch_year: "2025".to_string(),
            fetch_vehicle_type: "FOUR WHEELER".to_string(),
        }
    }
}

/// Left side control panel with filters and processing controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub years: Vec<(i32, bool)>,
    pub categories: Vec<(String, bool)>,
    pub manufacturers: Vec<(String, bool)>,
    pub progress: f32,
    pub status: String,
    pub data_loaded: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            years: Vec::new(),
            categories: Vec::new(),
            manufacturers: Vec::new(),
            progress: 0.0,
            status: "Ready".to_string(),
            data_loaded: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate filter widgets from a freshly loaded dataset; everything
    /// starts selected.
    pub fn set_dataset(&mut self, dataset: &Dataset) {
        self.years = dataset.years().into_iter().map(|y| (y, true)).collect();
        self.categories = dataset
            .categories()
            .into_iter()
            .map(|c| (c, true))
            .collect();
        self.manufacturers = dataset
            .manufacturers()
            .into_iter()
            .map(|m| (m, true))
            .collect();
        self.data_loaded = true;
    }

    /// Currently checked filter values.
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            years: self
                .years
                .iter()
                .filter(|(_, on)| *on)
                .map(|(y, _)| *y)
                .collect(),
            categories: self
                .categories
                .iter()
                .filter(|(_, on)| *on)
                .map(|(c, _)| c.clone())
                .collect(),
            manufacturers: self
                .manufacturers
                .iter()
                .filter(|(_, on)| *on)
                .map(|(m, _)| m.clone())
                .collect(),
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚗 Vehicle Registrations")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("VAHAN statistics dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file loaded".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        if !self.data_loaded {
            ui.label(
                RichText::new("Load a dataset to enable filters")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        } else {
            let mut changed = false;
            changed |= Self::year_filter(ui, "Years", &mut self.years);
            ui.add_space(8.0);
            changed |= Self::string_filter(ui, "Vehicle Categories", &mut self.categories);
            if !self.manufacturers.is_empty() {
                ui.add_space(8.0);
                changed |= Self::string_filter(ui, "Manufacturers", &mut self.manufacturers);
            }
            if changed {
                action = ControlPanelAction::FiltersChanged;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Portal Fetch Section =====
        ui.label(RichText::new("🌐 Portal Fetch").size(14.0).strong());
        ui.add_space(5.0);
        ui.label(
            RichText::new("Picks up manually downloaded per-year CSVs from data/")
                .size(10.0)
                .color(Color32::GRAY),
        );
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new("Year:"));
            ui.add(
                egui::TextEdit::singleline(&mut self.settings.fetch_year).desired_width(80.0),
            );
        });
        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new("Vehicle Type:"));
            ui.add(
                egui::TextEdit::singleline(&mut self.settings.fetch_vehicle_type)
                    .desired_width(140.0),
            );
        });
        ui.add_space(5.0);
        if ui.button("⬇ Fetch").clicked() {
            action = ControlPanelAction::Fetch;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.data_loaded, |ui| {
                let png_button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(160.0, 30.0));
                if ui.add(png_button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }

                ui.add_space(8.0);

                let json_button = egui::Button::new(RichText::new("📄 Export JSON").size(14.0))
                    .min_size(egui::vec2(160.0, 30.0));
                if ui.add(json_button).clicked() {
                    action = ControlPanelAction::ExportJson;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    fn year_filter(ui: &mut egui::Ui, title: &str, values: &mut Vec<(i32, bool)>) -> bool {
        let mut labeled: Vec<(String, bool)> = values
            .iter()
            .map(|(y, on)| (y.to_string(), *on))
            .collect();
        let changed = Self::string_filter(ui, title, &mut labeled);
        if changed {
            for ((_, on), (_, new_on)) in values.iter_mut().zip(labeled.iter()) {
                *on = *new_on;
            }
        }
        changed
    }

    fn string_filter(ui: &mut egui::Ui, title: &str, values: &mut Vec<(String, bool)>) -> bool {
        let mut changed = false;
        ui.label(RichText::new(title).size(12.0).strong());
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt(title.to_string())
                    .max_height(110.0)
                    .show(ui, |ui| {
                        for (label, on) in values.iter_mut() {
                            if ui.checkbox(on, label.as_str()).changed() {
                                changed = true;
                            }
                        }
                    });
            });
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                values.iter_mut().for_each(|(_, on)| *on = true);
                changed = true;
            }
            if ui.small_button("Clear All").clicked() {
                values.iter_mut().for_each(|(_, on)| *on = false);
                changed = true;
            }
        });
        changed
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    FiltersChanged,
    Fetch,
    ExportPng,
    ExportJson,
}
