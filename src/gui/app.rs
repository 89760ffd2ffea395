//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use egui::SidePanel;

use crate::analysis::{aggregate, compute_growth, TimeKey};
use crate::charts::{DashboardData, StaticChartRenderer};
use crate::data::{loader, Dataset, GroupingMode, RegistrationRecord};
use crate::export::{self, Report};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::scraper;

const EXPORT_WIDTH: u32 = 1400;
const EXPORT_HEIGHT: u32 = 1500;

/// Recomputation result from background thread
enum CalcResult {
    Progress(f32, String),
    Complete(Box<DashboardData>),
}

/// Dataset loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(Box<Dataset>),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    dataset: Option<Dataset>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async recomputation
    calc_rx: Option<Receiver<CalcResult>>,
    is_calculating: bool,
    needs_recompute: bool,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self {
            dataset: None,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            calc_rx: None,
            is_calculating: false,
            needs_recompute: false,
            load_rx: None,
            is_loading: false,
        };
        app.start_default_load();
        app
    }

    /// Resolve and load the default dataset in the background.
    fn start_default_load(&mut self) {
        self.control_panel.set_progress(0.0, "Locating dataset...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading dataset...".to_string()));
            match loader::load_default() {
                Ok(dataset) => {
                    let _ = tx.send(LoadResult::Complete(Box::new(dataset)));
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Handle CSV file selection via the file dialog.
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.chart_viewer.clear();
            self.control_panel.settings.csv_path = Some(path.clone());
            self.control_panel.set_progress(0.0, "Loading CSV file...");
            self.is_loading = true;

            let (tx, rx) = channel();
            self.load_rx = Some(rx);

            thread::spawn(move || {
                let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));
                match loader::load_path(&path) {
                    Ok(dataset) => {
                        let _ = tx.send(LoadResult::Complete(Box::new(dataset)));
                    }
                    Err(e) => {
                        let _ = tx.send(LoadResult::Error(e.to_string()));
                    }
                }
            });
        }
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_progress(0.0, &status);
                    }
                    LoadResult::Complete(dataset) => {
                        self.control_panel.settings.csv_path =
                            Some(dataset.source().to_path_buf());
                        self.control_panel.set_dataset(&dataset);
                        self.control_panel.set_progress(
                            0.0,
                            &format!(
                                "Loaded {} records, {} registrations",
                                dataset.len(),
                                dataset.total_registrations()
                            ),
                        );
                        self.dataset = Some(*dataset);
                        self.needs_recompute = true;
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.chart_viewer.set_placeholder(&error);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Start recomputation in a background thread
    fn start_calculation(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };

        let selection = self.control_panel.selection();
        let records = dataset.filter(&selection);
        let grouping = dataset.grouping();

        let (tx, rx) = channel();
        self.calc_rx = Some(rx);
        self.is_calculating = true;
        self.control_panel.set_progress(5.0, "Filtering records...");

        thread::spawn(move || {
            Self::run_calculation(tx, records, grouping);
        });
    }

    /// Run the aggregation pipeline (called from background thread)
    fn run_calculation(
        tx: Sender<CalcResult>,
        records: Vec<RegistrationRecord>,
        grouping: GroupingMode,
    ) {
        let _ = tx.send(CalcResult::Progress(
            20.0,
            "Aggregating by year and quarter...".to_string(),
        ));

        // Yearly and quarterly views are independent
        let (yearly, quarterly) = rayon::join(
            || aggregate(&records, TimeKey::Year, grouping),
            || aggregate(&records, TimeKey::Quarter, grouping),
        );

        let _ = tx.send(CalcResult::Progress(60.0, "Computing growth...".to_string()));

        let (yoy, qoq) = rayon::join(
            || compute_growth(&yearly, grouping),
            || compute_growth(&quarterly, grouping),
        );

        let total_registrations = records
            .iter()
            .map(|r| r.registrations.unwrap_or(0))
            .sum();

        let data = DashboardData {
            grouping,
            yearly,
            yoy,
            qoq,
            total_registrations,
            record_count: records.len(),
        };
        let _ = tx.send(CalcResult::Complete(Box::new(data)));
    }

    /// Check for recomputation results
    fn check_calculation_results(&mut self) {
        let rx = self.calc_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    CalcResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    CalcResult::Complete(data) => {
                        self.control_panel.set_progress(
                            100.0,
                            &format!("Complete! {} records aggregated", data.record_count),
                        );
                        self.chart_viewer.set_data(*data);
                        self.is_calculating = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.calc_rx = Some(rx);
            }
        }
    }

    /// Run the portal fetch stub for the entered year and vehicle type.
    fn handle_fetch(&mut self) {
        let year = match self.control_panel.settings.fetch_year.trim().parse::<i32>() {
            Ok(year) => year,
            Err(_) => {
                self.control_panel
                    .set_progress(0.0, "Error: fetch year must be a number");
                return;
            }
        };
        let vehicle_type = self
            .control_panel
            .settings
            .fetch_vehicle_type
            .trim()
            .to_string();

        match scraper::fetch(year, &vehicle_type) {
            Ok(df) => {
                self.control_panel.set_progress(
                    100.0,
                    &format!(
                        "Complete! {} rows available for {} {}",
                        df.height(),
                        year,
                        vehicle_type
                    ),
                );
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    /// Handle PNG export - render the dashboard charts to a file
    fn handle_export_png(&mut self) {
        let Some(data) = self.chart_viewer.data.clone() else {
            self.control_panel.set_progress(0.0, "No charts to export");
            return;
        };

        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("registration_dashboard.png")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        self.control_panel.set_progress(10.0, "Rendering charts...");

        match StaticChartRenderer::render_png(&data, &output_path, EXPORT_WIDTH, EXPORT_HEIGHT) {
            Ok(()) => {
                self.control_panel.set_progress(
                    100.0,
                    &format!("Complete! Exported {}", output_path.display()),
                );
                let _ = open::that(&output_path);
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Export error: {}", e));
            }
        }
    }

    /// Handle JSON export of the computed tables
    fn handle_export_json(&mut self) {
        let Some(data) = &self.chart_viewer.data else {
            self.control_panel.set_progress(0.0, "No tables to export");
            return;
        };

        let output_path = match rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("registration_report.json")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        let report = Report {
            yearly: &data.yearly,
            yoy_growth: &data.yoy,
            qoq_growth: &data.qoq,
        };
        match export::write_report_json(&report, &output_path) {
            Ok(()) => {
                self.control_panel.set_progress(
                    100.0,
                    &format!("Complete! Exported {}", output_path.display()),
                );
                let _ = open::that(&output_path);
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Export error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();
        self.check_calculation_results();

        // Request repaint while loading or calculating
        if self.is_loading || self.is_calculating {
            ctx.request_repaint();
        }

        // Filter changes trigger a full recomputation from the loaded dataset
        if self.needs_recompute && !self.is_calculating && self.dataset.is_some() {
            self.needs_recompute = false;
            self.start_calculation();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::FiltersChanged => {
                            self.needs_recompute = true;
                        }
                        ControlPanelAction::Fetch => self.handle_fetch(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::ExportJson => self.handle_export_json(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ctx, ui);
        });
    }
}
