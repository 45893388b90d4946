mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::VehicleDashboardApp;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Vehicle Listings Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(VehicleDashboardApp::new(config)))),
    )
}
