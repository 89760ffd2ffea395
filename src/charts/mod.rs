//! Charts module - chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, DashboardData};
pub use renderer::StaticChartRenderer;
