//! Vehicle Registration Dashboard
//!
//! A Rust application for exploring vehicle registration statistics:
//! filtering by year, category and manufacturer, with aggregated totals
//! and YoY/QoQ growth charts.

mod analysis;
mod charts;
mod data;
mod export;
mod gui;
mod scraper;

use eframe::egui;
use gui::DashboardApp;

fn main() -> eframe::Result<()> {
    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Vehicle Registration Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Vehicle Registration Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc)))),
    )
}
